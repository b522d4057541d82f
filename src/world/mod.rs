//! World domain plugin for Harvestvale.
//!
//! Responsible for:
//! - The farm map collaborator (dimensions, blocked tiles)
//! - The player's inventory and money
//! - Storage chests placed on the farm

use bevy::prelude::*;

use crate::config::SimConfig;

pub mod chests;
pub mod inventory;
pub mod maps;

pub use chests::{StorageChest, StorageChests};
pub use inventory::{Inventory, ItemStack, SlotGrid};
pub use maps::FarmMap;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimConfig>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<FarmMap>() {
            app.insert_resource(FarmMap::new(config.farm_width, config.farm_height));
        }
        if !app.world().contains_resource::<Inventory>() {
            app.insert_resource(Inventory::with_money(config.starting_money));
        }
        app.init_resource::<StorageChests>()
            .init_resource::<PlayerPosition>();
    }
}

/// Where the player stands, in world units. Persisted by the save file.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerPosition {
    pub x: f32,
    pub y: f32,
}
