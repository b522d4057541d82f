//! Shipping bin: items dropped here are sold at the end of each farm day.

use std::sync::Arc;

use crate::shared::*;
use crate::world::{ItemStack, SlotGrid};

/// Prices one unit of an item, or `None` when nobody buys it.
pub type PriceFn = Arc<dyn Fn(ItemKind) -> Option<i32> + Send + Sync>;

/// Told the total earned by each settlement that earned anything.
pub type EarningsCallback = Box<dyn FnMut(i64) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingBin {
    pub slots: SlotGrid,
}

impl Default for ShippingBin {
    fn default() -> Self {
        Self {
            slots: SlotGrid::new(CHEST_SLOTS),
        }
    }
}

/// What one settlement sold and earned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    pub earnings: i64,
    pub sold: Vec<ItemStack>,
    /// Stacks left in the bin because nothing prices them.
    pub unsold: Vec<ItemStack>,
}

impl ShippingBin {
    pub fn deposit(&mut self, kind: ItemKind, count: u32) -> bool {
        self.slots.try_add(kind, count)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sells every priced stack. Unpriced stacks stay where they are.
    pub fn settle(&mut self, price_of: &dyn Fn(ItemKind) -> Option<i32>) -> Settlement {
        let mut settlement = Settlement::default();
        for slot in self.slots.slots.iter_mut() {
            let Some(stack) = *slot else {
                continue;
            };
            match price_of(stack.kind) {
                Some(price) => {
                    settlement.earnings += i64::from(price.max(0)) * i64::from(stack.count);
                    settlement.sold.push(stack);
                    *slot = None;
                }
                None => settlement.unsold.push(stack),
            }
        }
        settlement
    }
}

/// Builds a price function from a snapshot of `(item, price)` pairs.
pub fn price_fn_from_table(table: Vec<(ItemKind, i32)>) -> PriceFn {
    Arc::new(move |kind| table.iter().find(|(k, _)| *k == kind).map(|(_, p)| *p))
}
