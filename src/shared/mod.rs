//! Shared components, resources, events, and states for Harvestvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except through the
//! collaborator traits declared at the bottom of this file.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

/// Integer tile coordinate on a farm or mine map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Packs the coordinate into a single key: `y << 32 | x`.
    /// Coordinates are non-negative in every map we load.
    pub fn tile_key(self) -> u64 {
        ((self.y as u32 as u64) << 32) | (self.x as u32 as u64)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Season for a 1-based day count. Each season lasts `DAYS_PER_SEASON` days.
    pub fn for_day(day: i32) -> Self {
        let day = day.max(1);
        Self::ALL[(((day - 1) / DAYS_PER_SEASON) % 4) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    LightRain,
    HeavyRain,
    Snowy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Sunny,
        Weather::LightRain,
        Weather::HeavyRain,
        Weather::Snowy,
    ];

    /// Weather is derived from the day count alone so every replay is reproducible.
    pub fn for_day(day: i32) -> Self {
        let day = day.max(1);
        Self::ALL[((day.rem_euclid(4) * 3) % 4) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::LightRain => "Light Rain",
            Weather::HeavyRain => "Heavy Rain",
            Weather::Snowy => "Snowy",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// Every item kind in the game. The integer ids are the save-file contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Hoe,
    WateringCan,
    Scythe,
    Axe,
    Pickaxe,
    FishingRod,
    SeedTurnip,
    SeedPotato,
    SeedCorn,
    SeedTomato,
    SeedPumpkin,
    SeedBlueberry,
    Wood,
    Turnip,
    Potato,
    Corn,
    Tomato,
    Pumpkin,
    Blueberry,
    Fish,
    CopperOre,
    IronOre,
    SilverOre,
    GoldOre,
    DiamondOre,
    WoodenSword,
    IronSword,
    GoldSword,
    DiamondSword,
    Anchovy,
    Carp,
    Eel,
    Flounder,
    LargemouthBass,
    Pufferfish,
    RainbowTrout,
    Sturgeon,
    Tilapia,
}

impl ItemKind {
    pub const ALL: [ItemKind; 38] = [
        ItemKind::Hoe,
        ItemKind::WateringCan,
        ItemKind::Scythe,
        ItemKind::Axe,
        ItemKind::Pickaxe,
        ItemKind::FishingRod,
        ItemKind::SeedTurnip,
        ItemKind::SeedPotato,
        ItemKind::SeedCorn,
        ItemKind::SeedTomato,
        ItemKind::SeedPumpkin,
        ItemKind::SeedBlueberry,
        ItemKind::Wood,
        ItemKind::Turnip,
        ItemKind::Potato,
        ItemKind::Corn,
        ItemKind::Tomato,
        ItemKind::Pumpkin,
        ItemKind::Blueberry,
        ItemKind::Fish,
        ItemKind::CopperOre,
        ItemKind::IronOre,
        ItemKind::SilverOre,
        ItemKind::GoldOre,
        ItemKind::DiamondOre,
        ItemKind::WoodenSword,
        ItemKind::IronSword,
        ItemKind::GoldSword,
        ItemKind::DiamondSword,
        ItemKind::Anchovy,
        ItemKind::Carp,
        ItemKind::Eel,
        ItemKind::Flounder,
        ItemKind::LargemouthBass,
        ItemKind::Pufferfish,
        ItemKind::RainbowTrout,
        ItemKind::Sturgeon,
        ItemKind::Tilapia,
    ];

    /// Stable integer id, as written to the save file.
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Hoe => "Hoe",
            ItemKind::WateringCan => "Watering Can",
            ItemKind::Scythe => "Scythe",
            ItemKind::Axe => "Axe",
            ItemKind::Pickaxe => "Pickaxe",
            ItemKind::FishingRod => "Fishing Rod",
            ItemKind::SeedTurnip => "Turnip Seed",
            ItemKind::SeedPotato => "Potato Seed",
            ItemKind::SeedCorn => "Corn Seed",
            ItemKind::SeedTomato => "Tomato Seed",
            ItemKind::SeedPumpkin => "Pumpkin Seed",
            ItemKind::SeedBlueberry => "Blueberry Seed",
            ItemKind::Wood => "Wood",
            ItemKind::Turnip => "Turnip",
            ItemKind::Potato => "Potato",
            ItemKind::Corn => "Corn",
            ItemKind::Tomato => "Tomato",
            ItemKind::Pumpkin => "Pumpkin",
            ItemKind::Blueberry => "Blueberry",
            ItemKind::Fish => "Fish",
            ItemKind::CopperOre => "Copper Ore",
            ItemKind::IronOre => "Iron Ore",
            ItemKind::SilverOre => "Silver Ore",
            ItemKind::GoldOre => "Gold Ore",
            ItemKind::DiamondOre => "Diamond Ore",
            ItemKind::WoodenSword => "Wooden Sword",
            ItemKind::IronSword => "Iron Sword",
            ItemKind::GoldSword => "Gold Sword",
            ItemKind::DiamondSword => "Diamond Sword",
            ItemKind::Anchovy => "Anchovy",
            ItemKind::Carp => "Carp",
            ItemKind::Eel => "Eel",
            ItemKind::Flounder => "Flounder",
            ItemKind::LargemouthBass => "Largemouth Bass",
            ItemKind::Pufferfish => "Pufferfish",
            ItemKind::RainbowTrout => "Rainbow Trout",
            ItemKind::Sturgeon => "Sturgeon",
            ItemKind::Tilapia => "Tilapia",
        }
    }

    /// Tools and weapons occupy a slot each.
    pub fn is_stackable(self) -> bool {
        !matches!(
            self,
            ItemKind::Hoe
                | ItemKind::WateringCan
                | ItemKind::Scythe
                | ItemKind::Axe
                | ItemKind::Pickaxe
                | ItemKind::FishingRod
                | ItemKind::WoodenSword
                | ItemKind::IronSword
                | ItemKind::GoldSword
                | ItemKind::DiamondSword
        )
    }

    pub fn max_stack(self) -> u32 {
        if self.is_stackable() {
            MAX_STACK
        } else {
            1
        }
    }

    /// The crop a seed grows into, if this is a seed.
    pub fn seed_crop(self) -> Option<CropKind> {
        CropKind::ALL.into_iter().find(|c| c.seed_item() == self)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS
// ═══════════════════════════════════════════════════════════════════════

/// Plantable crops. Integer ids are the save-file `cropId` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    Turnip,
    Potato,
    Corn,
    Tomato,
    Pumpkin,
    Blueberry,
}

impl CropKind {
    pub const ALL: [CropKind; 6] = [
        CropKind::Turnip,
        CropKind::Potato,
        CropKind::Corn,
        CropKind::Tomato,
        CropKind::Pumpkin,
        CropKind::Blueberry,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn seed_item(self) -> ItemKind {
        match self {
            CropKind::Turnip => ItemKind::SeedTurnip,
            CropKind::Potato => ItemKind::SeedPotato,
            CropKind::Corn => ItemKind::SeedCorn,
            CropKind::Tomato => ItemKind::SeedTomato,
            CropKind::Pumpkin => ItemKind::SeedPumpkin,
            CropKind::Blueberry => ItemKind::SeedBlueberry,
        }
    }

    pub fn harvest_item(self) -> ItemKind {
        match self {
            CropKind::Turnip => ItemKind::Turnip,
            CropKind::Potato => ItemKind::Potato,
            CropKind::Corn => ItemKind::Corn,
            CropKind::Tomato => ItemKind::Tomato,
            CropKind::Pumpkin => ItemKind::Pumpkin,
            CropKind::Blueberry => ItemKind::Blueberry,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ACTION RESULTS
// ═══════════════════════════════════════════════════════════════════════

/// Outcome of a farm action. Failures are normal results, never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    /// Crop harvested by this action, if any.
    pub crop: Option<CropKind>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), crop: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), crop: None }
    }

    /// Save-format crop id: -1 when no crop is attached.
    pub fn crop_id(&self) -> i32 {
        self.crop.map(CropKind::id).unwrap_or(-1)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS (cross-domain communication)
// ═══════════════════════════════════════════════════════════════════════

/// Sent when a day finishes, before the clock moves to the next day.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: i32,
}

/// Sent right after the clock moved to a new day.
#[derive(Event, Debug, Clone)]
pub struct DayStartEvent {
    pub day: i32,
}

/// Player asks to end the day by sleeping.
#[derive(Event, Debug, Clone)]
pub struct SleepRequestEvent;

/// The player stayed up until midnight and collapsed.
#[derive(Event, Debug, Clone)]
pub struct PassedOutEvent {
    pub day: i32,
    pub penalty: u32,
}

#[derive(Event, Debug, Clone)]
pub struct GoldChangeEvent {
    pub amount: i64, // positive = gain, negative = spend
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct ItemPickupEvent {
    pub kind: ItemKind,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmAction {
    Till,
    Plant(CropKind),
    Water,
    Harvest,
}

/// Input layer asks the farm to act on a tile.
#[derive(Event, Debug, Clone)]
pub struct FarmActionEvent {
    pub coord: TileCoord,
    pub action: FarmAction,
}

/// Reported back to the UI after a farm action was applied.
#[derive(Event, Debug, Clone)]
pub struct FarmActionOutcome {
    pub coord: TileCoord,
    pub action: FarmAction,
    pub result: ActionResult,
}

/// Input layer swings the pickaxe at a mine tile.
#[derive(Event, Debug, Clone)]
pub struct MineHitEvent {
    pub coord: TileCoord,
}

// ═══════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════

/// Anything that can receive reward items (the player's bag, a chest).
pub trait ItemSink {
    /// Adds `count` of `kind`. Returns false, and adds nothing, when it does not fit.
    fn add_item(&mut self, kind: ItemKind, count: u32) -> bool;
}

/// Walkability queries against a tile map.
pub trait TileMap {
    /// (width, height) in tiles.
    fn size_in_tiles(&self) -> (i32, i32);
    fn is_walkable(&self, coord: TileCoord) -> bool;
    fn has_collision_at(&self, coord: TileCoord) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DAYS_PER_SEASON: i32 = 7;
pub const MAX_STACK: u32 = 64;
pub const INVENTORY_SLOTS: usize = 30;
pub const CHEST_SLOTS: usize = 32;
pub const STARTING_MONEY: i64 = 500;
