//! Mineral catalog. Tile GIDs are resolved to a `MineralKind` once, at the
//! map boundary; everything past that works with the kind.

use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MineralKind {
    Stone,
    CopperOre,
    IronOre,
    SilverOre,
    GoldOre,
    DiamondOre,
}

impl MineralKind {
    pub const ALL: [MineralKind; 6] = [
        MineralKind::Stone,
        MineralKind::CopperOre,
        MineralKind::IronOre,
        MineralKind::SilverOre,
        MineralKind::GoldOre,
        MineralKind::DiamondOre,
    ];

    /// Maps a tileset GID onto a mineral. Unknown GIDs yield `None`.
    pub fn from_gid(gid: u32) -> Option<Self> {
        match gid {
            1001 => Some(MineralKind::Stone),
            521..=555 => Some(MineralKind::CopperOre),
            574..=608 => Some(MineralKind::SilverOre),
            649..=723 => Some(MineralKind::GoldOre),
            750..=770 => Some(MineralKind::IronOre),
            800..=810 => Some(MineralKind::DiamondOre),
            _ => None,
        }
    }

    /// First GID of the kind's range, used when building grids in code.
    pub fn representative_gid(self) -> u32 {
        match self {
            MineralKind::Stone => 1001,
            MineralKind::CopperOre => 521,
            MineralKind::SilverOre => 574,
            MineralKind::GoldOre => 649,
            MineralKind::IronOre => 750,
            MineralKind::DiamondOre => 800,
        }
    }

    pub fn def(self) -> MineralDef {
        match self {
            MineralKind::Stone => MineralDef {
                kind: self,
                name: "Stone",
                hit_points: 1,
                drop: None,
                exp_reward: 1,
            },
            MineralKind::CopperOre => MineralDef {
                kind: self,
                name: "Copper Ore",
                hit_points: 3,
                drop: Some(DropRange::new(ItemKind::CopperOre, 1, 3)),
                exp_reward: 5,
            },
            MineralKind::IronOre => MineralDef {
                kind: self,
                name: "Iron Ore",
                hit_points: 4,
                drop: Some(DropRange::new(ItemKind::IronOre, 1, 2)),
                exp_reward: 8,
            },
            MineralKind::SilverOre => MineralDef {
                kind: self,
                name: "Silver Ore",
                hit_points: 5,
                drop: Some(DropRange::new(ItemKind::SilverOre, 1, 2)),
                exp_reward: 10,
            },
            MineralKind::GoldOre => MineralDef {
                kind: self,
                name: "Gold Ore",
                hit_points: 8,
                drop: Some(DropRange::new(ItemKind::GoldOre, 1, 1)),
                exp_reward: 20,
            },
            MineralKind::DiamondOre => MineralDef {
                kind: self,
                name: "Diamond Ore",
                hit_points: 10,
                drop: Some(DropRange::new(ItemKind::DiamondOre, 1, 1)),
                exp_reward: 50,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRange {
    pub item: ItemKind,
    pub min: u32,
    pub max: u32,
}

impl DropRange {
    const fn new(item: ItemKind, min: u32, max: u32) -> Self {
        Self { item, min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MineralDef {
    pub kind: MineralKind,
    pub name: &'static str,
    pub hit_points: u32,
    pub drop: Option<DropRange>,
    pub exp_reward: u32,
}

/// Catalog entry for a GID, if the GID is a known mineral.
pub fn mineral_def(gid: u32) -> Option<MineralDef> {
    MineralKind::from_gid(gid).map(MineralKind::def)
}
