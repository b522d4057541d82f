//! In-memory farm map: dimensions plus blocked tiles.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::shared::*;

/// Farm map collaborator. Everything in bounds is walkable unless blocked.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmMap {
    pub width: i32,
    pub height: i32,
    pub blocked: HashSet<TileCoord>,
}

impl FarmMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            blocked: HashSet::new(),
        }
    }

    /// Marks a tile as solid (fence, building, water...).
    pub fn block(&mut self, coord: TileCoord) {
        self.blocked.insert(coord);
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }
}

impl TileMap for FarmMap {
    fn size_in_tiles(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn is_walkable(&self, coord: TileCoord) -> bool {
        self.in_bounds(coord) && !self.blocked.contains(&coord)
    }

    fn has_collision_at(&self, coord: TileCoord) -> bool {
        self.blocked.contains(&coord)
    }
}
