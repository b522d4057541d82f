//! One plugin that wires every simulation domain together.

use bevy::prelude::*;

use crate::calendar::CalendarPlugin;
use crate::config::SimConfig;
use crate::economy::EconomyPlugin;
use crate::farming::FarmingPlugin;
use crate::mining::MiningPlugin;
use crate::save::SavePlugin;
use crate::shared::GameState;
use crate::skills::SkillsPlugin;
use crate::world::WorldPlugin;

/// Adds the game state and all domain plugins.
///
/// Needs `StatesPlugin` (or `DefaultPlugins`) already on the app. A
/// A valid `SimConfig` inserted beforehand is honoured; otherwise defaults apply.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let checked = app
            .world()
            .get_resource::<SimConfig>()
            .map(|config| config.validate());
        match checked {
            None => {
                app.insert_resource(SimConfig::default());
            }
            Some(Err(e)) => {
                warn!("[Config] {e}; using defaults");
                app.insert_resource(SimConfig::default());
            }
            Some(Ok(())) => {}
        }

        app.init_state::<GameState>();

        // World first: the farm field is sized from the map it inserts.
        app.add_plugins(WorldPlugin)
            .add_plugins(CalendarPlugin)
            .add_plugins(SkillsPlugin)
            .add_plugins(EconomyPlugin)
            .add_plugins(FarmingPlugin)
            .add_plugins(MiningPlugin)
            .add_plugins(SavePlugin);
    }
}
