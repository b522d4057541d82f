//! Which mine floor the player is on, how deep they have been, and the elevator.

use bevy::prelude::*;

use super::grid::{MineGrid, MineLayer};
use crate::shared::*;

/// Floors reachable by elevator are multiples of this.
pub const ELEVATOR_INTERVAL: u32 = 5;

#[derive(Resource, Debug, Clone)]
pub struct MineFloors {
    current: u32,
    deepest: u32,
    seed: u64,
    pub grid: MineGrid,
}

impl Default for MineFloors {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MineFloors {
    /// Starts on floor 1.
    pub fn new(seed: u64) -> Self {
        Self {
            current: 1,
            deepest: 1,
            seed,
            grid: MineGrid::generate(1, seed),
        }
    }

    pub fn current_floor(&self) -> u32 {
        self.current
    }

    pub fn deepest_floor(&self) -> u32 {
        self.deepest
    }

    /// Goes one floor down, but only when standing on the stairs.
    pub fn try_descend(&mut self, standing_on: TileCoord) -> bool {
        if !self.grid.is_stairs_at(standing_on) {
            return false;
        }
        self.enter(self.current + 1);
        true
    }

    /// Floor 1 plus every elevator stop already reached.
    pub fn elevator_floors(&self) -> Vec<u32> {
        std::iter::once(1)
            .chain((ELEVATOR_INTERVAL..=self.deepest).step_by(ELEVATOR_INTERVAL as usize))
            .collect()
    }

    pub fn take_elevator(&mut self, floor: u32) -> bool {
        if !self.elevator_floors().contains(&floor) {
            return false;
        }
        self.enter(floor);
        true
    }

    fn enter(&mut self, floor: u32) {
        self.current = floor;
        self.deepest = self.deepest.max(floor);
        self.grid = MineGrid::generate(floor, self.seed);
        info!("[Mining] Entered floor {} (deepest {})", self.current, self.deepest);
    }
}
