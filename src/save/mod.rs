//! Save / load for Harvestvale.
//!
//! One save file, `savegame.json`, in the configured save directory. The
//! JSON layout is an external contract shared with existing saves:
//!
//! ```json
//! {
//!   "playerPosition": {"x": 0.0, "y": 0.0},
//!   "inventory": {"slots": [{"type": 13, "count": 4}], "money": 500},
//!   "dayCount": 3,
//!   "farmTiles": [{"x": 1, "y": 2, "tilled": true, "watered": false,
//!                  "hasCrop": true, "cropId": 0, "stage": 1, "progressDays": 0}],
//!   "storageChests": [{"x": 4, "y": 4, "slots": [{"type": -1, "count": 0}]}]
//! }
//! ```
//!
//! Loading is all-or-nothing: the document is parsed and converted in full
//! before any live resource is touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{CalendarSet, GameClock};
use crate::config::SimConfig;
use crate::economy::MarketState;
use crate::farming::{catch_up_with_clock, price_fn_from_table, FarmField, FarmTile, FarmTileRecord};
use crate::shared::*;
use crate::world::{Inventory, ItemStack, PlayerPosition, SlotGrid, StorageChest, StorageChests};

pub const SAVE_FILE_NAME: &str = "savegame.json";

/// Item type id written for an empty slot.
const EMPTY_SLOT_TYPE: i32 = -1;

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save file at {0}")]
    NotFound(PathBuf),
    #[error("save file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid save data: {0}")]
    Invalid(String),
}

// ═══════════════════════════════════════════════════════════════════════
// FILE LAYOUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotData {
    #[serde(rename = "type")]
    pub item_type: i32,
    pub count: i32,
}

impl SlotData {
    pub const EMPTY: SlotData = SlotData {
        item_type: EMPTY_SLOT_TYPE,
        count: 0,
    };
}

/// A missing `money` key keeps the current balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryData {
    #[serde(default)]
    pub slots: Vec<SlotData>,
    #[serde(default)]
    pub money: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmTileData {
    pub x: i32,
    pub y: i32,
    pub tilled: bool,
    pub watered: bool,
    pub has_crop: bool,
    pub crop_id: i32,
    pub stage: i32,
    pub progress_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestData {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub slots: Vec<SlotData>,
}

/// The persisted game snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(default)]
    pub player_position: PositionData,
    /// `None` when the file has no inventory section; the bag is left as is.
    #[serde(default)]
    pub inventory: Option<InventoryData>,
    #[serde(default = "default_day_count")]
    pub day_count: i32,
    #[serde(default)]
    pub farm_tiles: Vec<FarmTileData>,
    #[serde(default)]
    pub storage_chests: Vec<ChestData>,
}

fn default_day_count() -> i32 {
    1
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            player_position: PositionData::default(),
            inventory: None,
            day_count: default_day_count(),
            farm_tiles: Vec::new(),
            storage_chests: Vec::new(),
        }
    }
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CAPTURE / APPLY
// ═══════════════════════════════════════════════════════════════════════

fn slots_to_data(grid: &SlotGrid) -> Vec<SlotData> {
    grid.slots
        .iter()
        .map(|slot| match slot {
            Some(stack) => SlotData {
                item_type: stack.kind.id(),
                count: stack.count as i32,
            },
            None => SlotData::EMPTY,
        })
        .collect()
}

/// Positional slots back into a grid of `len` slots. Entries past the end
/// are dropped; an unknown item id fails the whole load.
fn slots_from_data(slots: &[SlotData], len: usize) -> Result<SlotGrid, SaveError> {
    if slots.len() > len {
        warn!(
            "[Save] {} slots in file, only {} fit; extra slots dropped",
            slots.len(),
            len
        );
    }
    let mut grid = SlotGrid::new(len);
    for (slot, data) in grid.slots.iter_mut().zip(slots) {
        if data.item_type == EMPTY_SLOT_TYPE || data.count <= 0 {
            continue;
        }
        let kind = ItemKind::from_id(data.item_type)
            .ok_or_else(|| SaveError::Invalid(format!("unknown item type {}", data.item_type)))?;
        let count = (data.count as u32).min(kind.max_stack());
        *slot = Some(ItemStack { kind, count });
    }
    Ok(grid)
}

fn tile_to_data(record: &FarmTileRecord) -> FarmTileData {
    let tile = &record.tile;
    FarmTileData {
        x: record.coord.x,
        y: record.coord.y,
        tilled: tile.tilled,
        watered: tile.watered,
        has_crop: tile.has_crop(),
        crop_id: tile.crop_id(),
        stage: tile.growth_stage as i32,
        progress_days: tile.stage_progress_days as i32,
    }
}

fn tile_from_data(data: &FarmTileData) -> FarmTileRecord {
    let crop = if data.has_crop {
        CropKind::from_id(data.crop_id)
    } else {
        None
    };
    FarmTileRecord {
        coord: TileCoord::new(data.x, data.y),
        tile: FarmTile {
            tilled: data.tilled,
            watered: data.watered,
            crop,
            growth_stage: data.stage.max(0) as u32,
            stage_progress_days: data.progress_days.max(0) as u32,
        },
    }
}

/// Builds a snapshot of the live resources. Only tilled or planted tiles
/// are written.
pub fn capture(
    clock: &GameClock,
    field: &FarmField,
    inventory: &Inventory,
    chests: &StorageChests,
    position: &PlayerPosition,
) -> SaveData {
    SaveData {
        player_position: PositionData {
            x: position.x,
            y: position.y,
        },
        inventory: Some(InventoryData {
            slots: slots_to_data(&inventory.slots),
            money: Some(inventory.money),
        }),
        day_count: clock.day(),
        farm_tiles: field.all_tiles().iter().map(tile_to_data).collect(),
        storage_chests: chests
            .chests
            .iter()
            .map(|chest| ChestData {
                x: chest.coord.x,
                y: chest.coord.y,
                slots: slots_to_data(&chest.slots),
            })
            .collect(),
    }
}

/// Restores a snapshot into the live resources.
///
/// Every section is converted first; nothing is written unless all of
/// them succeed. The farm is marked as already simulated for the loaded
/// day so catch-up does not replay it.
pub fn apply(
    data: &SaveData,
    clock: &mut GameClock,
    field: &mut FarmField,
    inventory: &mut Inventory,
    chests: &mut StorageChests,
    position: &mut PlayerPosition,
) -> Result<(), SaveError> {
    let bag = match &data.inventory {
        Some(inv) => Some((
            slots_from_data(&inv.slots, inventory.slots.slots.len().max(INVENTORY_SLOTS))?,
            inv.money,
        )),
        None => None,
    };

    let mut loaded_chests = Vec::with_capacity(data.storage_chests.len());
    for chest in &data.storage_chests {
        let coord = TileCoord::new(chest.x, chest.y);
        if loaded_chests.iter().any(|c: &StorageChest| c.coord == coord) {
            warn!("[Save] Duplicate chest at ({}, {}) skipped", coord.x, coord.y);
            continue;
        }
        loaded_chests.push(StorageChest {
            coord,
            slots: slots_from_data(&chest.slots, CHEST_SLOTS)?,
        });
    }

    let records: Vec<FarmTileRecord> = data.farm_tiles.iter().map(tile_from_data).collect();

    // ── Commit ─────────────────────────────────────────────────────────
    position.x = data.player_position.x;
    position.y = data.player_position.y;

    if let Some((slots, money)) = bag {
        inventory.slots = slots;
        if let Some(money) = money {
            inventory.money = money.max(0);
        }
    }

    clock.set_day_count(data.day_count);
    clock.set_last_farm_update_day(clock.day());

    let applied = field.set_all_tiles(&records);
    if applied < records.len() {
        warn!(
            "[Save] {} farm tiles outside the field were skipped",
            records.len() - applied
        );
    }

    chests.chests = loaded_chests;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// FILE I/O
// ═══════════════════════════════════════════════════════════════════════

fn io_error(path: &Path, source: io::Error) -> SaveError {
    SaveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn save_path(dir: &Path) -> PathBuf {
    dir.join(SAVE_FILE_NAME)
}

pub fn has_save_file(dir: &Path) -> bool {
    save_path(dir).is_file()
}

/// Removes the save file if there is one.
pub fn delete_save_file(dir: &Path) -> Result<(), SaveError> {
    let path = save_path(dir);
    if !path.exists() {
        return Ok(());
    }
    fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
    info!("[Save] Deleted {}", path.display());
    Ok(())
}

/// Writes to a temp file first and renames it over the old save.
pub fn write_save(dir: &Path, data: &SaveData) -> Result<PathBuf, SaveError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }

    let json = data.to_json()?;
    let path = save_path(dir);
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|e| io_error(&tmp_path, e))?;
    fs::rename(&tmp_path, &path).map_err(|e| io_error(&path, e))?;
    Ok(path)
}

pub fn read_save(dir: &Path) -> Result<SaveData, SaveError> {
    let path = save_path(dir);
    if !path.exists() {
        return Err(SaveError::NotFound(path));
    }
    let json = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
    SaveData::from_json(&json)
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone, Default)]
pub struct LoadRequestEvent;

/// Sent after a save attempt (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error: Option<String>,
}

/// Sent after a load attempt. On failure nothing was changed.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Where save files go.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SaveDirectory(pub PathBuf);

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SaveDirectory>() {
            let dir = app
                .world()
                .get_resource::<SimConfig>()
                .map(|c| c.save_dir.clone())
                .unwrap_or_else(|| SimConfig::default().save_dir);
            app.insert_resource(SaveDirectory(dir));
        }

        app.add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(
                Update,
                (handle_save_request, handle_load_request)
                    .chain()
                    .after(CalendarSet)
                    .before(catch_up_with_clock),
            );
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    dir: Res<SaveDirectory>,
    clock: Res<GameClock>,
    field: Res<FarmField>,
    inventory: Res<Inventory>,
    chests: Res<StorageChests>,
    position: Res<PlayerPosition>,
) {
    // Several requests in one frame would write the same snapshot.
    if save_events.read().count() == 0 {
        return;
    }

    let data = capture(&clock, &field, &inventory, &chests, &position);
    match write_save(&dir.0, &data) {
        Ok(path) => {
            info!(
                "[Save] Day {} saved to {} ({} farm tiles)",
                data.day_count,
                path.display(),
                data.farm_tiles.len()
            );
            complete_events.send(SaveCompleteEvent {
                success: true,
                error: None,
            });
        }
        Err(e) => {
            warn!("[Save] Save FAILED: {e}");
            complete_events.send(SaveCompleteEvent {
                success: false,
                error: Some(e.to_string()),
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    dir: Res<SaveDirectory>,
    mut clock: ResMut<GameClock>,
    mut field: ResMut<FarmField>,
    mut inventory: ResMut<Inventory>,
    mut chests: ResMut<StorageChests>,
    mut position: ResMut<PlayerPosition>,
    market: Option<ResMut<MarketState>>,
) {
    if load_events.read().count() == 0 {
        return;
    }

    let result = read_save(&dir.0).and_then(|data| {
        apply(
            &data,
            &mut clock,
            &mut field,
            &mut inventory,
            &mut chests,
            &mut position,
        )
    });

    match result {
        Ok(()) => {
            if let Some(mut market) = market {
                market.update_prices(clock.day());
                field.set_price_fn(Some(price_fn_from_table(market.sell_price_table())));
            }
            info!("[Save] Loaded day {} from {}", clock.day(), dir.0.display());
            complete_events.send(LoadCompleteEvent {
                success: true,
                error: None,
            });
        }
        Err(e) => {
            warn!("[Save] Load FAILED: {e}");
            complete_events.send(LoadCompleteEvent {
                success: false,
                error: Some(e.to_string()),
            });
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
