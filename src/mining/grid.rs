//! Mine floor tiles: mineral, collision and stairs layers.
//!
//! Floors are generated from a seed derived from the floor number, so
//! re-entering the same floor yields the same layout.

use std::collections::{HashMap, HashSet};

use rand::prelude::*;
use rand::rngs::StdRng;

use super::minerals::MineralKind;
use crate::shared::*;

/// Width and height of every generated mine floor in tiles.
pub const MINE_WIDTH: i32 = 24;
pub const MINE_HEIGHT: i32 = 24;

/// Mineral-layer collaborator queried by the mining manager.
pub trait MineLayer {
    /// Tileset GID of the mineral at `coord`, if any.
    fn mineral_gid_at(&self, coord: TileCoord) -> Option<u32>;
    fn is_stairs_at(&self, coord: TileCoord) -> bool;
    fn clear_mineral_at(&mut self, coord: TileCoord);
    fn clear_collision_at(&mut self, coord: TileCoord);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MineGrid {
    pub width: i32,
    pub height: i32,
    pub minerals: HashMap<TileCoord, u32>,
    pub collision: HashSet<TileCoord>,
    pub stairs: HashSet<TileCoord>,
    /// Where the player arrives on this floor.
    pub spawn: TileCoord,
}

impl MineGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Puts a solid mineral with the given GID on a tile.
    pub fn place_mineral(&mut self, coord: TileCoord, gid: u32) {
        self.minerals.insert(coord, gid);
        self.collision.insert(coord);
    }

    pub fn place_stairs(&mut self, coord: TileCoord) {
        self.stairs.insert(coord);
    }

    pub fn has_collision_at(&self, coord: TileCoord) -> bool {
        self.collision.contains(&coord)
    }

    pub fn mineral_count(&self) -> usize {
        self.minerals.len()
    }

    /// Generate a floor layout. Deeper floors carry rarer ores.
    pub fn generate(floor: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ (u64::from(floor) * 7919 + 42));
        let mut grid = Self::new(MINE_WIDTH, MINE_HEIGHT);

        // --- Player spawn (bottom-center), kept clear with its neighbours ---
        grid.spawn = TileCoord::new(MINE_WIDTH / 2, 1);
        let mut occupied = HashSet::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                occupied.insert(TileCoord::new(grid.spawn.x + dx, grid.spawn.y + dy));
            }
        }

        // --- Stairs in the upper half ---
        let stairs = loop {
            let c = TileCoord::new(
                rng.gen_range(2..MINE_WIDTH - 2),
                rng.gen_range(MINE_HEIGHT / 2..MINE_HEIGHT - 2),
            );
            if !occupied.contains(&c) {
                break c;
            }
        };
        occupied.insert(stairs);
        grid.place_stairs(stairs);

        // --- Minerals (25-40% coverage) ---
        let coverage: f64 = rng.gen_range(0.25..=0.40);
        let target = ((MINE_WIDTH * MINE_HEIGHT) as f64 * coverage) as usize;
        let mut attempts = 0;
        while grid.mineral_count() < target && attempts < target * 4 {
            attempts += 1;
            let c = TileCoord::new(
                rng.gen_range(1..MINE_WIDTH - 1),
                rng.gen_range(2..MINE_HEIGHT - 1),
            );
            if occupied.insert(c) {
                let kind = roll_mineral(floor, &mut rng);
                grid.place_mineral(c, kind.representative_gid());
            }
        }
        grid
    }
}

/// Weighted mineral pick; the weights shift towards ore with depth.
fn roll_mineral(floor: u32, rng: &mut StdRng) -> MineralKind {
    let depth = floor.min(40) as f64 / 40.0;
    let weights = [
        (MineralKind::Stone, 60.0 - 30.0 * depth),
        (MineralKind::CopperOre, 25.0 - 10.0 * depth),
        (MineralKind::IronOre, 8.0 + 6.0 * depth),
        (MineralKind::SilverOre, 5.0 + 8.0 * depth),
        (MineralKind::GoldOre, 2.0 + 8.0 * depth),
        (MineralKind::DiamondOre, if floor >= 20 { 1.0 + 0.5 * depth } else { 0.0 }),
    ];
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0.0..total);
    for (kind, w) in weights {
        if roll < w {
            return kind;
        }
        roll -= w;
    }
    MineralKind::Stone
}

impl MineLayer for MineGrid {
    fn mineral_gid_at(&self, coord: TileCoord) -> Option<u32> {
        self.minerals.get(&coord).copied()
    }

    fn is_stairs_at(&self, coord: TileCoord) -> bool {
        self.stairs.contains(&coord)
    }

    fn clear_mineral_at(&mut self, coord: TileCoord) {
        self.minerals.remove(&coord);
    }

    fn clear_collision_at(&mut self, coord: TileCoord) {
        self.collision.remove(&coord);
    }
}
