//! Hit-point depletion of mineral deposits and their rewards.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::grid::MineLayer;
use super::minerals::{MineralDef, MineralKind};
use crate::shared::*;

/// Outcome of one pickaxe hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningResult {
    pub success: bool,
    pub message: String,
    /// Set when this hit cleared the deposit.
    pub depleted: Option<MineralKind>,
    /// Reward that was rolled, delivered or not.
    pub reward: Option<(ItemKind, u32)>,
    /// False when a reward was rolled but the sink had no room for it.
    pub delivered: bool,
    pub exp_gained: u32,
}

impl MiningResult {
    fn in_progress(message: String) -> Self {
        Self {
            success: true,
            message,
            depleted: None,
            reward: None,
            delivered: true,
            exp_gained: 0,
        }
    }

    fn no_mineral() -> Self {
        Self {
            success: false,
            message: "No mineral here".to_string(),
            ..Self::in_progress(String::new())
        }
    }
}

/// Hits landed on a deposit that has not broken yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MineralProgress {
    pub coord: TileCoord,
    pub hit_count: u32,
    pub required_hits: u32,
}

#[derive(Resource, Debug, Clone)]
pub struct MiningManager {
    active: HashMap<u64, MineralProgress>,
    rng: StdRng,
    mining_exp: u64,
    deposits_cleared: u64,
}

impl Default for MiningManager {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl MiningManager {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            active: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            mining_exp: 0,
            deposits_cleared: 0,
        }
    }

    /// Catalog entry for a tileset GID.
    pub fn mineral_def(&self, gid: u32) -> Option<MineralDef> {
        super::minerals::mineral_def(gid)
    }

    pub fn mining_exp(&self) -> u64 {
        self.mining_exp
    }

    pub fn deposits_cleared(&self) -> u64 {
        self.deposits_cleared
    }

    pub fn progress_at(&self, coord: TileCoord) -> Option<MineralProgress> {
        self.active.get(&coord.tile_key()).copied()
    }

    /// Drops all partial progress, e.g. when leaving a floor.
    pub fn reset_progress(&mut self) {
        self.active.clear();
    }

    /// One pickaxe hit at `coord`.
    ///
    /// `hit_reduction` lowers the catalog hit count (floor 1). The deposit
    /// breaks on the hit that reaches the required count; its reward goes to
    /// `sink`, and a full sink is reported without undoing the break.
    pub fn mine_tile(
        &mut self,
        coord: TileCoord,
        layer: &mut impl MineLayer,
        sink: &mut impl ItemSink,
        hit_reduction: u32,
    ) -> MiningResult {
        let Some(gid) = layer.mineral_gid_at(coord) else {
            return MiningResult::no_mineral();
        };

        let Some(kind) = MineralKind::from_gid(gid) else {
            warn!("[Mining] Unknown mineral GID {gid} at ({}, {}); clearing", coord.x, coord.y);
            layer.clear_mineral_at(coord);
            layer.clear_collision_at(coord);
            self.active.remove(&coord.tile_key());
            return MiningResult::in_progress(String::new());
        };
        let def = kind.def();

        let key = coord.tile_key();
        let progress = self.active.entry(key).or_insert_with(|| MineralProgress {
            coord,
            hit_count: 0,
            required_hits: def.hit_points.saturating_sub(hit_reduction).max(1),
        });
        progress.hit_count += 1;

        if progress.hit_count < progress.required_hits {
            let remaining = progress.required_hits - progress.hit_count;
            return MiningResult::in_progress(format!("Mining... ({remaining} more)"));
        }

        self.active.remove(&key);
        layer.clear_mineral_at(coord);
        layer.clear_collision_at(coord);
        self.mining_exp += u64::from(def.exp_reward);
        self.deposits_cleared += 1;

        let mut result = MiningResult::in_progress(String::new());
        result.depleted = Some(kind);
        result.exp_gained = def.exp_reward;

        if let Some(drop) = def.drop {
            let count = self.rng.gen_range(drop.min..=drop.max);
            result.reward = Some((drop.item, count));
            if sink.add_item(drop.item, count) {
                result.message = format!("Found {count} {}!", drop.item.name());
            } else {
                result.delivered = false;
                result.message = "Inventory full!".to_string();
            }
        }

        info!(
            "[Mining] {} cleared at ({}, {}) (+{} exp, total {})",
            def.name, coord.x, coord.y, def.exp_reward, self.mining_exp
        );
        result
    }
}
