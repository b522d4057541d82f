use bevy::prelude::*;
use thiserror::Error;

use super::gold::EconomyStats;
use super::market::MarketState;
use crate::shared::*;
use crate::world::Inventory;

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("{0} is not traded here")]
    NotTradeable(&'static str),
    #[error("need {need}g, have {have}g")]
    InsufficientFunds { need: i64, have: i64 },
    #[error("not enough {0} to sell")]
    InsufficientItems(&'static str),
    #[error("inventory full")]
    InventoryFull,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Buys `quantity` of `kind` at today's price. Returns the total paid.
/// Nothing changes unless both the money and the bag space are there.
pub fn buy(
    market: &MarketState,
    inventory: &mut Inventory,
    kind: ItemKind,
    quantity: u32,
) -> Result<i64, TradeError> {
    if quantity == 0 {
        return Err(TradeError::ZeroQuantity);
    }
    let unit = market
        .buy_price(kind)
        .ok_or(TradeError::NotTradeable(kind.name()))?;
    let total = i64::from(unit) * i64::from(quantity);
    if inventory.money < total {
        return Err(TradeError::InsufficientFunds {
            need: total,
            have: inventory.money,
        });
    }
    if inventory.slots.room_for(kind) < quantity {
        return Err(TradeError::InventoryFull);
    }

    inventory.remove_money(total);
    inventory.add_item(kind, quantity);
    Ok(total)
}

/// Sells `quantity` of `kind` from the bag at today's price. Returns the total earned.
pub fn sell(
    market: &MarketState,
    inventory: &mut Inventory,
    kind: ItemKind,
    quantity: u32,
) -> Result<i64, TradeError> {
    if quantity == 0 {
        return Err(TradeError::ZeroQuantity);
    }
    let unit = market
        .sell_price(kind)
        .ok_or(TradeError::NotTradeable(kind.name()))?;
    if !inventory.remove_item(kind, quantity) {
        return Err(TradeError::InsufficientItems(kind.name()));
    }
    let total = i64::from(unit) * i64::from(quantity);
    inventory.add_money(total);
    Ok(total)
}

// ─────────────────────────────────────────────────────────────────────────────
// Events (driven by UI input)
// ─────────────────────────────────────────────────────────────────────────────

/// Fired by the UI when the player confirms a purchase.
#[derive(Event, Debug, Clone)]
pub struct BuyRequestEvent {
    pub kind: ItemKind,
    pub quantity: u32,
}

/// Fired by the UI when the player confirms selling an item from inventory.
#[derive(Event, Debug, Clone)]
pub struct SellRequestEvent {
    pub kind: ItemKind,
    pub quantity: u32,
}

/// Outcome of a buy or sell request, for the UI.
#[derive(Event, Debug, Clone)]
pub struct TradeOutcomeEvent {
    pub kind: ItemKind,
    pub quantity: u32,
    pub result: Result<i64, TradeError>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_buy(
    mut buy_events: EventReader<BuyRequestEvent>,
    market: Res<MarketState>,
    mut inventory: ResMut<Inventory>,
    mut stats: ResMut<EconomyStats>,
    mut pickup_writer: EventWriter<ItemPickupEvent>,
    mut outcome_writer: EventWriter<TradeOutcomeEvent>,
) {
    for ev in buy_events.read() {
        let result = buy(&market, &mut inventory, ev.kind, ev.quantity);
        match &result {
            Ok(total) => {
                stats.total_gold_spent = stats.total_gold_spent.saturating_add(*total as u64);
                stats.total_transactions += 1;
                pickup_writer.send(ItemPickupEvent {
                    kind: ev.kind,
                    count: ev.quantity,
                });
                info!(
                    "[Market] Bought {} × {} for {}g",
                    ev.quantity,
                    ev.kind.name(),
                    total
                );
            }
            Err(e) => info!("[Market] Cannot buy {} × {}: {e}", ev.quantity, ev.kind.name()),
        }
        outcome_writer.send(TradeOutcomeEvent {
            kind: ev.kind,
            quantity: ev.quantity,
            result,
        });
    }
}

pub fn handle_sell(
    mut sell_events: EventReader<SellRequestEvent>,
    market: Res<MarketState>,
    mut inventory: ResMut<Inventory>,
    mut stats: ResMut<EconomyStats>,
    mut outcome_writer: EventWriter<TradeOutcomeEvent>,
) {
    for ev in sell_events.read() {
        let result = sell(&market, &mut inventory, ev.kind, ev.quantity);
        match &result {
            Ok(total) => {
                stats.total_gold_earned = stats.total_gold_earned.saturating_add(*total as u64);
                stats.total_transactions += 1;
                info!(
                    "[Market] Sold {} × {} for {}g",
                    ev.quantity,
                    ev.kind.name(),
                    total
                );
            }
            Err(e) => info!("[Market] Cannot sell {} × {}: {e}", ev.quantity, ev.kind.name()),
        }
        outcome_writer.send(TradeOutcomeEvent {
            kind: ev.kind,
            quantity: ev.quantity,
            result,
        });
    }
}
