use bevy::prelude::*;

use crate::shared::*;
use crate::world::Inventory;

/// Running totals of money flow.
#[derive(Resource, Debug, Clone, Default)]
pub struct EconomyStats {
    pub total_gold_earned: u64,
    pub total_gold_spent: u64,
    pub total_transactions: u64,
}

/// Applies GoldChangeEvents to the player's money.
/// Spending more than the balance clamps the balance at 0.
pub fn apply_gold_changes(
    mut gold_events: EventReader<GoldChangeEvent>,
    mut inventory: ResMut<Inventory>,
    mut stats: ResMut<EconomyStats>,
) {
    for ev in gold_events.read() {
        if ev.amount >= 0 {
            inventory.apply_gold_change(ev.amount);
            stats.total_gold_earned = stats.total_gold_earned.saturating_add(ev.amount as u64);
            info!(
                "[Market] Gold +{}: {}. New balance: {}g",
                ev.amount, ev.reason, inventory.money
            );
        } else {
            let cost = ev.amount.unsigned_abs();
            let before = inventory.money;
            if before < ev.amount.saturating_neg() {
                warn!(
                    "[Market] Tried to take {}g but only {}g left ({}). Clamping to 0.",
                    cost, before, ev.reason
                );
            }
            inventory.apply_gold_change(ev.amount);
            let spent = (before - inventory.money) as u64;
            stats.total_gold_spent = stats.total_gold_spent.saturating_add(spent);
            info!(
                "[Market] Gold -{}: {}. New balance: {}g",
                spent, ev.reason, inventory.money
            );
        }
        stats.total_transactions += 1;
    }
}

/// Money as shown in the HUD and logs, with thousands separators: "1,234g".
pub fn format_gold(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let groups: Vec<&str> = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .collect();
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{}g", groups.join(","))
}
