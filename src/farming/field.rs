//! The farm field: per-tile soil and crop state, the daily growth pass,
//! and catch-up across days the field did not see.

use bevy::prelude::*;

use super::crops::CropRegistry;
use super::shipping::{EarningsCallback, PriceFn, Settlement, ShippingBin};
use crate::calendar::GameClock;
use crate::shared::*;
use crate::world::StorageChests;

// ─────────────────────────────────────────────────────────────────────────────
// Tile state
// ─────────────────────────────────────────────────────────────────────────────

/// Soil and crop state of one farm tile.
///
/// `crop == None` always comes with `growth_stage == 0` and
/// `stage_progress_days == 0`; every mutation goes through `FarmField`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FarmTile {
    pub tilled: bool,
    pub watered: bool,
    pub crop: Option<CropKind>,
    pub growth_stage: u32,
    pub stage_progress_days: u32,
}

impl FarmTile {
    pub fn has_crop(&self) -> bool {
        self.crop.is_some()
    }

    /// Save-format crop id: -1 when empty.
    pub fn crop_id(&self) -> i32 {
        self.crop.map(CropKind::id).unwrap_or(-1)
    }

    fn clear_crop(&mut self) {
        self.crop = None;
        self.growth_stage = 0;
        self.stage_progress_days = 0;
    }
}

/// A tile together with its coordinate, as exchanged with save files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmTileRecord {
    pub coord: TileCoord,
    pub tile: FarmTile,
}

/// Result of a catch-up pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUp {
    pub days_simulated: u32,
    pub settlements: Vec<Settlement>,
}

impl CatchUp {
    pub fn earnings(&self) -> i64 {
        self.settlements.iter().map(|s| s.earnings).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field
// ─────────────────────────────────────────────────────────────────────────────

/// Every tile of the farm, stored row-major in a flat array.
#[derive(Resource)]
pub struct FarmField {
    width: i32,
    height: i32,
    tiles: Vec<FarmTile>,
    crops: CropRegistry,
    pub shipping_bin: ShippingBin,
    price_fn: Option<PriceFn>,
    earnings_callback: Option<EarningsCallback>,
}

impl std::fmt::Debug for FarmField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FarmField")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("planted", &self.tiles.iter().filter(|t| t.has_crop()).count())
            .field("shipping_bin", &self.shipping_bin)
            .field("price_fn_bound", &self.price_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl FarmField {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_crops(width, height, CropRegistry::default())
    }

    pub fn with_crops(width: i32, height: i32, crops: CropRegistry) -> Self {
        let (width, height) = match width.max(0).checked_mul(height.max(0)) {
            Some(_) => (width.max(0), height.max(0)),
            None => {
                warn!("[Farming] Field {width}x{height} is too large; using an empty field");
                (0, 0)
            }
        };
        Self {
            width,
            height,
            tiles: vec![FarmTile::default(); (width as usize) * (height as usize)],
            crops,
            shipping_bin: ShippingBin::default(),
            price_fn: None,
            earnings_callback: None,
        }
    }

    /// Sized to the map collaborator's tile dimensions.
    pub fn for_map(map: &dyn TileMap) -> Self {
        let (w, h) = map.size_in_tiles();
        Self::new(w, h)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn crops(&self) -> &CropRegistry {
        &self.crops
    }

    pub fn is_valid_tile(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        self.is_valid_tile(coord)
            .then(|| (coord.y * self.width + coord.x) as usize)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<FarmTile> {
        self.index(coord).map(|i| self.tiles[i])
    }

    fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut FarmTile> {
        self.index(coord).map(|i| &mut self.tiles[i])
    }

    pub fn is_mature(&self, tile: &FarmTile) -> bool {
        match tile.crop {
            Some(kind) => tile.growth_stage >= self.crops.stage_count(kind),
            None => false,
        }
    }

    // ── Actions ─────────────────────────────────────────────────────────────

    pub fn till_tile(&mut self, coord: TileCoord) -> ActionResult {
        let Some(tile) = self.tile_mut(coord) else {
            return ActionResult::fail("Out of farm bounds");
        };
        if tile.has_crop() {
            return ActionResult::fail("Crop already here");
        }
        tile.tilled = true;
        tile.watered = false;
        ActionResult::ok("Tile tilled")
    }

    pub fn plant_seed(&mut self, coord: TileCoord, crop: CropKind) -> ActionResult {
        let Some(name) = self.crops.get(crop).map(|d| d.name) else {
            return ActionResult::fail("Unknown crop");
        };
        let Some(tile) = self.tile_mut(coord) else {
            return ActionResult::fail("Out of farm bounds");
        };
        if !tile.tilled {
            return ActionResult::fail("Till first");
        }
        if tile.has_crop() {
            return ActionResult::fail("Crop already here");
        }
        tile.crop = Some(crop);
        tile.growth_stage = 0;
        tile.stage_progress_days = 0;
        tile.watered = false;
        ActionResult::ok(format!("Planted {}", name.to_lowercase()))
    }

    /// Watering an already watered tile is a successful no-op.
    pub fn water_tile(&mut self, coord: TileCoord) -> ActionResult {
        let Some(tile) = self.tile_mut(coord) else {
            return ActionResult::fail("Out of farm bounds");
        };
        if !tile.tilled {
            return ActionResult::fail("Till first");
        }
        tile.watered = true;
        ActionResult::ok("Watered")
    }

    /// Harvests a mature crop, leaving the tile tilled and empty.
    pub fn harvest_tile(&mut self, coord: TileCoord) -> ActionResult {
        let Some(tile) = self.tile(coord) else {
            return ActionResult::fail("Out of farm bounds");
        };
        let Some(kind) = tile.crop else {
            return ActionResult::fail("No crop here");
        };
        if !self.is_mature(&tile) {
            return ActionResult::fail("Not mature yet");
        }
        let (name, price) = self
            .crops
            .get(kind)
            .map(|d| (d.name, d.sale_price))
            .unwrap_or(("Unknown", 0));

        if let Some(tile) = self.tile_mut(coord) {
            tile.clear_crop();
            tile.tilled = true;
            tile.watered = false;
        }

        let mut result = ActionResult::ok(format!("Harvested {name} (+{price} gold)"));
        result.crop = Some(kind);
        result
    }

    /// True when a chest or other object may be placed here.
    pub fn is_tile_clear_for_placement(
        &self,
        coord: TileCoord,
        map: &dyn TileMap,
        chests: &StorageChests,
    ) -> bool {
        let Some(tile) = self.tile(coord) else {
            return false;
        };
        !tile.has_crop()
            && !tile.tilled
            && map.is_walkable(coord)
            && !map.has_collision_at(coord)
            && !chests.is_occupied(coord)
    }

    // ── Daily advance ───────────────────────────────────────────────────────

    /// One day of growth for every watered crop, then every tile dries out,
    /// then the shipping bin is settled.
    pub fn progress_day(&mut self) -> Settlement {
        let Self { tiles, crops, .. } = self;
        for tile in tiles.iter_mut() {
            if let (Some(kind), true) = (tile.crop, tile.watered) {
                if let Some(def) = crops.get(kind) {
                    if let Some(&needed) = def.stage_days.get(tile.growth_stage as usize) {
                        tile.stage_progress_days += 1;
                        if tile.stage_progress_days >= needed {
                            tile.growth_stage += 1;
                            tile.stage_progress_days = 0;
                        }
                    }
                }
            }
            tile.watered = false;
        }
        self.settle_shipping_bin()
    }

    /// Replays `progress_day` once per day the field missed, oldest first.
    /// The very first call only stamps the clock.
    pub fn catch_up(&mut self, clock: &mut GameClock) -> CatchUp {
        let current = clock.day();
        let last = clock.last_farm_update_day();
        let mut result = CatchUp::default();

        if last == 0 {
            clock.set_last_farm_update_day(current);
            return result;
        }
        let gap = current - last;
        if gap > 0 {
            for _ in 0..gap {
                result.settlements.push(self.progress_day());
            }
            result.days_simulated = gap as u32;
        }
        // A negative gap means an older save was loaded; there is nothing to replay.
        clock.set_last_farm_update_day(current);
        result
    }

    /// Read-through to the clock the field is simulated against.
    pub fn day_count(&self, clock: &GameClock) -> i32 {
        clock.day()
    }

    pub fn day_progress(&self, clock: &GameClock) -> f32 {
        clock.day_progress()
    }

    // ── Shipping ────────────────────────────────────────────────────────────

    pub fn set_price_fn(&mut self, price_fn: Option<PriceFn>) {
        self.price_fn = price_fn;
    }

    pub fn set_earnings_callback(&mut self, callback: Option<EarningsCallback>) {
        self.earnings_callback = callback;
    }

    /// Sells the bin contents. With no price function bound nothing is touched.
    pub fn settle_shipping_bin(&mut self) -> Settlement {
        let Some(price_fn) = self.price_fn.clone() else {
            return Settlement::default();
        };
        let settlement = self.shipping_bin.settle(price_fn.as_ref());
        if settlement.earnings > 0 {
            if let Some(callback) = self.earnings_callback.as_mut() {
                callback(settlement.earnings);
            }
        }
        settlement
    }

    // ── Snapshot ────────────────────────────────────────────────────────────

    /// Tiles that differ from the default: tilled or planted.
    pub fn all_tiles(&self) -> Vec<FarmTileRecord> {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.tilled || t.has_crop())
            .map(|(i, tile)| FarmTileRecord {
                coord: TileCoord::new(i as i32 % width, i as i32 / width),
                tile: *tile,
            })
            .collect()
    }

    /// Resets the field, then applies the records. Out-of-bounds records are
    /// skipped; crops outside the catalog are dropped and stages clamped.
    /// Returns how many records were applied.
    pub fn set_all_tiles(&mut self, records: &[FarmTileRecord]) -> usize {
        self.tiles.iter_mut().for_each(|t| *t = FarmTile::default());
        let mut applied = 0;
        for record in records {
            let mut tile = record.tile;
            match tile.crop {
                Some(kind) if self.crops.contains(kind) => {
                    let stages = self.crops.stage_count(kind);
                    tile.growth_stage = tile.growth_stage.min(stages);
                }
                _ => tile.clear_crop(),
            }
            if let Some(slot) = self.tile_mut(record.coord) {
                *slot = tile;
                applied += 1;
            }
        }
        applied
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::farming::shipping::price_fn_from_table;
    use crate::world::FarmMap;

    const ORIGIN: TileCoord = TileCoord::new(0, 0);

    #[test]
    fn test_single_tile_turnip_lifecycle() {
        let mut farm = FarmField::new(1, 1);
        assert!(farm.till_tile(ORIGIN).success);
        assert!(farm.plant_seed(ORIGIN, CropKind::Turnip).success);
        assert!(farm.water_tile(ORIGIN).success);

        farm.progress_day();
        let tile = farm.tile(ORIGIN).unwrap();
        assert_eq!(tile.growth_stage, 1);
        assert_eq!(tile.stage_progress_days, 0);

        for _ in 0..2 {
            assert!(!farm.harvest_tile(ORIGIN).success);
            farm.water_tile(ORIGIN);
            farm.progress_day();
        }
        assert_eq!(farm.tile(ORIGIN).unwrap().growth_stage, 3);

        let result = farm.harvest_tile(ORIGIN);
        assert!(result.success);
        assert_eq!(result.crop_id(), 0);
        assert_eq!(result.message, "Harvested Turnip (+60 gold)");
        let tile = farm.tile(ORIGIN).unwrap();
        assert!(tile.tilled);
        assert!(!tile.has_crop());
        assert_eq!(tile.growth_stage, 0);
    }

    #[test]
    fn test_oversized_field_is_empty_instead_of_overflowing() {
        let mut farm = FarmField::new(65_536, 65_536);
        assert_eq!(farm.size(), (0, 0));
        assert!(!farm.till_tile(TileCoord::new(0, 0)).success);
    }

    #[test]
    fn test_out_of_bounds_rejected_everywhere() {
        let mut farm = FarmField::new(2, 2);
        let outside = TileCoord::new(2, 0);
        for result in [
            farm.till_tile(outside),
            farm.plant_seed(outside, CropKind::Corn),
            farm.water_tile(outside),
            farm.harvest_tile(outside),
        ] {
            assert!(!result.success);
            assert_eq!(result.message, "Out of farm bounds");
        }
        assert!(farm.tile(TileCoord::new(-1, 0)).is_none());
    }

    #[test]
    fn test_plant_requires_tilled_empty_soil() {
        let mut farm = FarmField::new(2, 1);
        assert_eq!(farm.plant_seed(ORIGIN, CropKind::Corn).message, "Till first");
        farm.till_tile(ORIGIN);
        assert!(farm.plant_seed(ORIGIN, CropKind::Corn).success);
        assert_eq!(
            farm.plant_seed(ORIGIN, CropKind::Potato).message,
            "Crop already here"
        );
        assert_eq!(farm.till_tile(ORIGIN).message, "Crop already here");
    }

    #[test]
    fn test_unknown_crop_rejected() {
        let mut farm = FarmField::with_crops(1, 1, CropRegistry::with_defs([]));
        farm.till_tile(ORIGIN);
        let result = farm.plant_seed(ORIGIN, CropKind::Turnip);
        assert!(!result.success);
        assert!(!farm.tile(ORIGIN).unwrap().has_crop());
    }

    #[test]
    fn test_water_needs_tilled_and_is_idempotent() {
        let mut farm = FarmField::new(1, 1);
        assert_eq!(farm.water_tile(ORIGIN).message, "Till first");
        farm.till_tile(ORIGIN);
        assert!(farm.water_tile(ORIGIN).success);
        assert!(farm.water_tile(ORIGIN).success);
        assert!(farm.tile(ORIGIN).unwrap().watered);
    }

    #[test]
    fn test_unwatered_crop_does_not_grow() {
        let mut farm = FarmField::new(1, 1);
        farm.till_tile(ORIGIN);
        farm.plant_seed(ORIGIN, CropKind::Turnip);
        farm.progress_day();
        farm.progress_day();
        assert_eq!(farm.tile(ORIGIN).unwrap().growth_stage, 0);
    }

    #[test]
    fn test_stage_thresholds_are_not_cumulative() {
        let mut farm = FarmField::new(1, 1);
        farm.till_tile(ORIGIN);
        farm.plant_seed(ORIGIN, CropKind::Potato); // [1, 2, 1]
        let mut stages = Vec::new();
        for _ in 0..4 {
            farm.water_tile(ORIGIN);
            farm.progress_day();
            stages.push(farm.tile(ORIGIN).unwrap().growth_stage);
        }
        assert_eq!(stages, vec![1, 1, 2, 3]);
    }

    #[test]
    fn test_mature_crop_stops_growing() {
        let mut farm = FarmField::new(1, 1);
        farm.till_tile(ORIGIN);
        farm.plant_seed(ORIGIN, CropKind::Turnip);
        for _ in 0..6 {
            farm.water_tile(ORIGIN);
            farm.progress_day();
        }
        let tile = farm.tile(ORIGIN).unwrap();
        assert_eq!(tile.growth_stage, 3);
        assert_eq!(tile.stage_progress_days, 0);
    }

    #[test]
    fn test_every_tile_dries_overnight() {
        let mut farm = FarmField::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                let c = TileCoord::new(x, y);
                farm.till_tile(c);
                farm.water_tile(c);
            }
        }
        farm.progress_day();
        assert!(farm.all_tiles().iter().all(|r| !r.tile.watered));
    }

    #[test]
    fn test_day_reads_through_to_clock() {
        let farm = FarmField::new(1, 1);
        let mut clock = GameClock::default();
        clock.set_day_count(9);
        clock.advance(75.0);
        assert_eq!(farm.day_count(&clock), 9);
        assert!((farm.day_progress(&clock) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_first_catch_up_only_stamps() {
        let mut farm = FarmField::new(1, 1);
        let mut clock = GameClock::default();
        clock.set_day_count(5);
        let result = farm.catch_up(&mut clock);
        assert_eq!(result.days_simulated, 0);
        assert_eq!(clock.last_farm_update_day(), 5);
    }

    #[test]
    fn test_catch_up_replays_each_missed_day() {
        let mut stepped = FarmField::new(1, 1);
        stepped.till_tile(ORIGIN);
        stepped.plant_seed(ORIGIN, CropKind::Turnip);
        stepped.water_tile(ORIGIN);

        let mut caught_up = FarmField::new(1, 1);
        caught_up.till_tile(ORIGIN);
        caught_up.plant_seed(ORIGIN, CropKind::Turnip);
        caught_up.water_tile(ORIGIN);

        for _ in 0..3 {
            stepped.progress_day();
        }

        let mut clock = GameClock::default();
        caught_up.catch_up(&mut clock);
        clock.set_day_count(4);
        let result = caught_up.catch_up(&mut clock);

        assert_eq!(result.days_simulated, 3);
        assert_eq!(clock.last_farm_update_day(), 4);
        assert_eq!(stepped.all_tiles(), caught_up.all_tiles());
        assert_eq!(caught_up.tile(ORIGIN).unwrap().growth_stage, 1);
    }

    #[test]
    fn test_shipping_untouched_without_price_fn() {
        let mut farm = FarmField::new(1, 1);
        farm.shipping_bin.deposit(ItemKind::Turnip, 3);
        let settlement = farm.progress_day();
        assert_eq!(settlement.earnings, 0);
        assert_eq!(farm.shipping_bin.slots.count(ItemKind::Turnip), 3);
    }

    #[test]
    fn test_shipping_settles_with_callback() {
        let earned = Arc::new(Mutex::new(0i64));
        let sink = Arc::clone(&earned);

        let mut farm = FarmField::new(1, 1);
        farm.set_price_fn(Some(price_fn_from_table(vec![(ItemKind::Corn, 120)])));
        farm.set_earnings_callback(Some(Box::new(move |amount| {
            if let Ok(mut total) = sink.lock() {
                *total += amount;
            }
        })));
        farm.shipping_bin.deposit(ItemKind::Corn, 2);
        farm.shipping_bin.deposit(ItemKind::Wood, 9);

        let settlement = farm.progress_day();
        assert_eq!(settlement.earnings, 240);
        assert_eq!(*earned.lock().unwrap(), 240);
        assert!(farm.shipping_bin.slots.has(ItemKind::Wood, 9));
    }

    #[test]
    fn test_placement_check() {
        let mut farm = FarmField::new(3, 1);
        let mut map = FarmMap::new(3, 1);
        let chests = StorageChests::default();

        assert!(farm.is_tile_clear_for_placement(ORIGIN, &map, &chests));
        farm.till_tile(ORIGIN);
        assert!(!farm.is_tile_clear_for_placement(ORIGIN, &map, &chests));
        map.block(TileCoord::new(1, 0));
        assert!(!farm.is_tile_clear_for_placement(TileCoord::new(1, 0), &map, &chests));
        assert!(farm.is_tile_clear_for_placement(TileCoord::new(2, 0), &map, &chests));
        assert!(!farm.is_tile_clear_for_placement(TileCoord::new(3, 0), &map, &chests));
    }

    #[test]
    fn test_snapshot_round_trip_is_sparse() {
        let mut farm = FarmField::new(4, 4);
        farm.till_tile(TileCoord::new(1, 2));
        farm.till_tile(TileCoord::new(3, 3));
        farm.plant_seed(TileCoord::new(3, 3), CropKind::Blueberry);

        let records = farm.all_tiles();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].coord, TileCoord::new(1, 2));

        let mut restored = FarmField::new(4, 4);
        restored.till_tile(ORIGIN);
        assert_eq!(restored.set_all_tiles(&records), 2);
        assert_eq!(restored.all_tiles(), records);
    }

    #[test]
    fn test_set_all_tiles_sanitises_records() {
        let mut farm = FarmField::new(2, 2);
        let records = [
            FarmTileRecord {
                coord: TileCoord::new(5, 5),
                tile: FarmTile { tilled: true, ..Default::default() },
            },
            FarmTileRecord {
                coord: ORIGIN,
                tile: FarmTile {
                    tilled: true,
                    crop: Some(CropKind::Corn),
                    growth_stage: 99,
                    ..Default::default()
                },
            },
        ];
        assert_eq!(farm.set_all_tiles(&records), 1);
        assert_eq!(farm.tile(ORIGIN).unwrap().growth_stage, 3);
    }
}
