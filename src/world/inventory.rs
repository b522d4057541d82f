//! Slot containers: the player's bag and anything else that stores items.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub count: u32,
}

/// Fixed-size list of optional stacks. All mutations are all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    pub slots: Vec<Option<ItemStack>>,
}

impl SlotGrid {
    pub fn new(len: usize) -> Self {
        Self { slots: vec![None; len] }
    }

    /// How many more of `kind` fit across existing stacks and empty slots.
    pub fn room_for(&self, kind: ItemKind) -> u32 {
        let max = kind.max_stack();
        self.slots
            .iter()
            .map(|slot| match slot {
                None => max,
                Some(s) if s.kind == kind => max.saturating_sub(s.count),
                Some(_) => 0,
            })
            .sum()
    }

    /// Adds `count` of `kind`. Returns false, and changes nothing, when it cannot all fit.
    pub fn try_add(&mut self, kind: ItemKind, count: u32) -> bool {
        if count == 0 || self.room_for(kind) < count {
            return false;
        }
        let max = kind.max_stack();
        let mut remaining = count;

        // First pass: stack onto existing slots with the same item
        for s in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if s.kind == kind && s.count < max {
                let add = remaining.min(max - s.count);
                s.count += add;
                remaining -= add;
            }
        }

        // Second pass: fill empty slots
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add = remaining.min(max);
                *slot = Some(ItemStack { kind, count: add });
                remaining -= add;
            }
        }

        true
    }

    /// Removes `count` of `kind`. Returns false, and changes nothing, when short.
    pub fn try_remove(&mut self, kind: ItemKind, count: u32) -> bool {
        if count == 0 || self.count(kind) < count {
            return false;
        }
        let mut remaining = count;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(s) = slot {
                if s.kind == kind {
                    let take = remaining.min(s.count);
                    s.count -= take;
                    remaining -= take;
                    if s.count == 0 {
                        *slot = None;
                    }
                }
            }
        }
        true
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.kind == kind)
            .map(|s| s.count)
            .sum()
    }

    pub fn has(&self, kind: ItemKind, count: u32) -> bool {
        self.count(kind) >= count
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER INVENTORY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: SlotGrid,
    pub money: i64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_money(STARTING_MONEY)
    }
}

impl Inventory {
    pub fn with_money(money: i64) -> Self {
        Self {
            slots: SlotGrid::new(INVENTORY_SLOTS),
            money: money.max(0),
        }
    }

    pub fn add_item(&mut self, kind: ItemKind, count: u32) -> bool {
        self.slots.try_add(kind, count)
    }

    pub fn remove_item(&mut self, kind: ItemKind, count: u32) -> bool {
        self.slots.try_remove(kind, count)
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.slots.count(kind)
    }

    pub fn has(&self, kind: ItemKind, count: u32) -> bool {
        self.slots.has(kind, count)
    }

    pub fn add_money(&mut self, amount: i64) {
        self.money = self.money.saturating_add(amount.max(0));
    }

    /// Spends `amount`. Returns false, and spends nothing, when short.
    pub fn remove_money(&mut self, amount: i64) -> bool {
        if amount < 0 || self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }

    /// Applies a signed change, clamping the balance at zero.
    pub fn apply_gold_change(&mut self, amount: i64) {
        self.money = self.money.saturating_add(amount).max(0);
    }
}

impl ItemSink for Inventory {
    fn add_item(&mut self, kind: ItemKind, count: u32) -> bool {
        Inventory::add_item(self, kind, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_inventory_has_thirty_slots_and_starting_money() {
        let inv = Inventory::default();
        assert_eq!(inv.slots.slots.len(), 30);
        assert_eq!(inv.money, 500);
        assert!(inv.slots.is_empty());
    }

    #[test]
    fn test_add_stacks_then_spills_into_new_slot() {
        let mut inv = Inventory::default();
        assert!(inv.add_item(ItemKind::Turnip, 60));
        assert!(inv.add_item(ItemKind::Turnip, 10));
        assert_eq!(inv.count(ItemKind::Turnip), 70);
        assert_eq!(inv.slots.stacks().count(), 2);
    }

    #[test]
    fn test_add_is_atomic_when_full() {
        let mut grid = SlotGrid::new(2);
        assert!(grid.try_add(ItemKind::Hoe, 1));
        assert!(grid.try_add(ItemKind::CopperOre, 60));
        let before = grid.clone();
        assert!(!grid.try_add(ItemKind::CopperOre, 5), "only 4 fit");
        assert_eq!(grid, before);
        assert!(grid.try_add(ItemKind::CopperOre, 4));
        assert_eq!(grid.count(ItemKind::CopperOre), 64);
    }

    #[test]
    fn test_tools_take_a_slot_each() {
        let mut grid = SlotGrid::new(3);
        assert!(grid.try_add(ItemKind::Pickaxe, 2));
        assert_eq!(grid.stacks().count(), 2);
        assert_eq!(grid.room_for(ItemKind::Axe), 1);
    }

    #[test]
    fn test_remove_across_stacks_and_short_remove_fails() {
        let mut inv = Inventory::default();
        inv.add_item(ItemKind::Wood, 100);
        assert!(!inv.remove_item(ItemKind::Wood, 101));
        assert_eq!(inv.count(ItemKind::Wood), 100);
        assert!(inv.remove_item(ItemKind::Wood, 70));
        assert_eq!(inv.count(ItemKind::Wood), 30);
        assert!(inv.has(ItemKind::Wood, 30));
        assert!(!inv.has(ItemKind::Wood, 31));
    }

    #[test]
    fn test_money_never_goes_negative() {
        let mut inv = Inventory::default();
        assert!(!inv.remove_money(501));
        assert_eq!(inv.money, 500);
        assert!(inv.remove_money(200));
        inv.apply_gold_change(-1_000);
        assert_eq!(inv.money, 0);
        inv.add_money(25);
        assert_eq!(inv.money, 25);
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let mut inv = Inventory::default();
        assert!(!inv.add_item(ItemKind::Corn, 0));
        assert!(!inv.remove_item(ItemKind::Corn, 0));
    }
}
