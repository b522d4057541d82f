//! Storage chests placed on the farm.

use bevy::prelude::*;

use super::inventory::SlotGrid;
use crate::farming::FarmField;
use crate::shared::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChest {
    pub coord: TileCoord,
    pub slots: SlotGrid,
}

impl StorageChest {
    pub fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            slots: SlotGrid::new(CHEST_SLOTS),
        }
    }
}

impl ItemSink for StorageChest {
    fn add_item(&mut self, kind: ItemKind, count: u32) -> bool {
        self.slots.try_add(kind, count)
    }
}

/// Every chest on the farm, in placement order.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageChests {
    pub chests: Vec<StorageChest>,
}

impl StorageChests {
    pub fn chest_at(&self, coord: TileCoord) -> Option<&StorageChest> {
        self.chests.iter().find(|c| c.coord == coord)
    }

    pub fn chest_at_mut(&mut self, coord: TileCoord) -> Option<&mut StorageChest> {
        self.chests.iter_mut().find(|c| c.coord == coord)
    }

    pub fn is_occupied(&self, coord: TileCoord) -> bool {
        self.chest_at(coord).is_some()
    }

    /// Places an empty chest if the farm tile is clear. Returns whether it was placed.
    pub fn place_chest(&mut self, coord: TileCoord, farm: &FarmField, map: &dyn TileMap) -> bool {
        if !farm.is_tile_clear_for_placement(coord, map, self) {
            return false;
        }
        self.chests.push(StorageChest::new(coord));
        info!("[World] Placed storage chest at ({}, {})", coord.x, coord.y);
        true
    }

    /// Picks a chest back up. Only empty chests can be removed.
    pub fn remove_chest(&mut self, coord: TileCoord) -> bool {
        let Some(idx) = self
            .chests
            .iter()
            .position(|c| c.coord == coord && c.slots.is_empty())
        else {
            return false;
        };
        self.chests.remove(idx);
        true
    }
}
