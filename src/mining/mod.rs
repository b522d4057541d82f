//! Mining domain: deposit depletion, rewards, floor descent.
//!
//! Pickaxe hits arrive as MineHitEvents and are applied against the
//! current floor's grid and the player's inventory.

use bevy::prelude::*;

use crate::config::SimConfig;
use crate::shared::*;
use crate::skills::{SkillKind, Skills};
use crate::world::Inventory;

pub mod floors;
pub mod grid;
pub mod manager;
pub mod minerals;

pub use floors::{MineFloors, ELEVATOR_INTERVAL};
pub use grid::{MineGrid, MineLayer, MINE_HEIGHT, MINE_WIDTH};
pub use manager::{MineralProgress, MiningManager, MiningResult};
pub use minerals::{mineral_def, DropRange, MineralDef, MineralKind};

/// Result of a MineHitEvent, for the HUD.
#[derive(Event, Debug, Clone)]
pub struct MineHitOutcome {
    pub coord: TileCoord,
    pub result: MiningResult,
}

/// Player uses the stairs at their position.
#[derive(Event, Debug, Clone)]
pub struct DescendRequestEvent {
    pub standing_on: TileCoord,
}

#[derive(Event, Debug, Clone)]
pub struct ElevatorRequestEvent {
    pub floor: u32,
}

pub struct MiningPlugin;

impl Plugin for MiningPlugin {
    fn build(&self, app: &mut App) {
        let seed = app
            .world()
            .get_resource::<SimConfig>()
            .map(|c| c.mining_seed)
            .unwrap_or_else(|| SimConfig::default().mining_seed);

        app.insert_resource(MiningManager::with_seed(seed))
            .insert_resource(MineFloors::new(seed))
            .add_event::<MineHitEvent>()
            .add_event::<MineHitOutcome>()
            .add_event::<DescendRequestEvent>()
            .add_event::<ElevatorRequestEvent>()
            .add_event::<ItemPickupEvent>()
            .add_systems(
                Update,
                (handle_mine_hits, handle_floor_changes)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

pub fn handle_mine_hits(
    mut hit_reader: EventReader<MineHitEvent>,
    mut manager: ResMut<MiningManager>,
    mut floors: ResMut<MineFloors>,
    mut inventory: ResMut<Inventory>,
    mut skills: Option<ResMut<Skills>>,
    mut outcome_writer: EventWriter<MineHitOutcome>,
    mut pickup_writer: EventWriter<ItemPickupEvent>,
) {
    for ev in hit_reader.read() {
        let reduction = skills
            .as_deref()
            .map(Skills::mining_hit_reduction)
            .unwrap_or(0);
        let result = manager.mine_tile(ev.coord, &mut floors.grid, &mut *inventory, reduction);

        if result.depleted.is_some() {
            if let Some(skills) = skills.as_deref_mut() {
                skills.record_action(SkillKind::Mining, 1);
            }
        }
        match result.reward {
            Some((kind, count)) if result.delivered => {
                pickup_writer.send(ItemPickupEvent { kind, count });
            }
            Some((kind, count)) => {
                warn!("[Mining] Inventory full; {count} × {} left behind", kind.name());
            }
            None => {}
        }

        outcome_writer.send(MineHitOutcome {
            coord: ev.coord,
            result,
        });
    }
}

/// Stairs and elevator. Partial progress does not survive a floor change.
pub fn handle_floor_changes(
    mut descend_reader: EventReader<DescendRequestEvent>,
    mut elevator_reader: EventReader<ElevatorRequestEvent>,
    mut floors: ResMut<MineFloors>,
    mut manager: ResMut<MiningManager>,
) {
    for ev in descend_reader.read() {
        if floors.try_descend(ev.standing_on) {
            manager.reset_progress();
        }
    }
    for ev in elevator_reader.read() {
        if floors.take_elevator(ev.floor) {
            manager.reset_progress();
        } else {
            info!("[Mining] Elevator cannot reach floor {}", ev.floor);
        }
    }
}
