//! Headless integration tests for Harvestvale.
//!
//! These tests drive the full `SimulationPlugin` without a window or GPU.
//! Time is fed through `TimeUpdateStrategy::ManualDuration`, so each
//! `app.update()` advances the clock by an exact, known amount.
//!
//! Run with: `cargo test --test headless`

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use harvestvale::calendar::GameClock;
use harvestvale::config::SimConfig;
use harvestvale::economy::{BuyRequestEvent, MarketState, TradeOutcomeEvent};
use harvestvale::farming::{FarmField, ShipItemEvent};
use harvestvale::mining::{MineFloors, MineGrid, MineHitOutcome, MineralKind};
use harvestvale::save::{LoadCompleteEvent, LoadRequestEvent, SaveCompleteEvent, SaveRequestEvent};
use harvestvale::shared::*;
use harvestvale::sim::SimulationPlugin;
use harvestvale::skills::{SkillKind, Skills};
use harvestvale::world::{Inventory, PlayerPosition};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the full simulation with time frozen, and runs the first frame
/// (startup systems, first catch-up stamp).
fn build_test_app(config: SimConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
    app.insert_resource(config);
    app.add_plugins(SimulationPlugin);
    app.update();
    app
}

fn small_farm() -> SimConfig {
    SimConfig {
        farm_width: 4,
        farm_height: 4,
        ..SimConfig::default()
    }
}

fn temp_save_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "harvestvale-headless-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Every event of type `E` still held in the double buffer.
fn drain<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).cloned().collect()
}

fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}

fn farm_action(app: &mut App, coord: TileCoord, action: FarmAction) {
    send(app, FarmActionEvent { coord, action });
}

fn sleep(app: &mut App) {
    send(app, SleepRequestEvent);
    app.update();
}

fn run_time(app: &mut App, step: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
}

const PLOT: TileCoord = TileCoord::new(1, 1);

// ─────────────────────────────────────────────────────────────────────────────
// Calendar
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_passing_out_at_midnight_rolls_day_with_penalty() {
    let mut app = build_test_app(SimConfig::default());
    {
        let mut clock = app.world_mut().resource_mut::<GameClock>();
        let to_midnight = clock.seconds_per_day() - clock.seconds_into_day();
        clock.advance(to_midnight - 0.1);
        assert!(!clock.is_midnight());
    }

    run_time(&mut app, Duration::from_millis(200));
    app.update();

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day(), 2);
    assert_eq!(clock.hour(), 6);
    assert!(!clock.is_midnight());

    let passed_out = drain::<PassedOutEvent>(&app);
    assert_eq!(passed_out.len(), 1);
    assert_eq!(passed_out[0].day, 1);
    assert_eq!(passed_out[0].penalty, 200);

    let starts = drain::<DayStartEvent>(&app);
    assert_eq!(starts.last().map(|e| e.day), Some(2));
    assert_eq!(app.world().resource::<Inventory>().money, 300);
}

#[test]
fn test_sleep_rolls_day_without_penalty() {
    let mut app = build_test_app(SimConfig::default());
    sleep(&mut app);

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day(), 2);
    assert_eq!(clock.hour(), 6);
    assert!(drain::<PassedOutEvent>(&app).is_empty());
    assert_eq!(drain::<DayEndEvent>(&app).last().map(|e| e.day), Some(1));
    assert_eq!(app.world().resource::<Inventory>().money, STARTING_MONEY);
}

#[test]
fn test_invalid_inserted_config_falls_back_to_defaults() {
    let mut app = build_test_app(SimConfig {
        seconds_per_day: 0.0,
        ..small_farm()
    });
    assert_eq!(*app.world().resource::<SimConfig>(), SimConfig::default());

    run_time(&mut app, Duration::from_millis(100));
    app.update();
    app.update();
    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day(), 1);
    assert!((0.0..1.0).contains(&clock.day_progress()));
    assert!(drain::<PassedOutEvent>(&app).is_empty());
}

#[test]
fn test_skip_to_next_morning_rolls_over_on_next_tick() {
    let mut app = build_test_app(SimConfig::default());
    app.world_mut()
        .resource_mut::<GameClock>()
        .skip_to_next_morning();
    assert_eq!(app.world().resource::<GameClock>().day(), 1);

    app.update();

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day(), 2);
    assert_eq!(clock.hour(), 6);
    assert!(!clock.skip_pending());

    let ends = drain::<DayEndEvent>(&app);
    let starts = drain::<DayStartEvent>(&app);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].day, 1);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].day, 2);

    assert!(drain::<PassedOutEvent>(&app).is_empty());
    assert_eq!(app.world().resource::<Inventory>().money, STARTING_MONEY);

    app.update();
    assert_eq!(app.world().resource::<GameClock>().day(), 2);
}

#[test]
fn test_clock_frozen_while_paused() {
    let mut app = build_test_app(SimConfig::default());
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Paused
    );

    run_time(&mut app, Duration::from_millis(200));
    let before = app.world().resource::<GameClock>().seconds_into_day();
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(app.world().resource::<GameClock>().seconds_into_day(), before);

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
    app.update();
    assert!(app.world().resource::<GameClock>().seconds_into_day() > before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Farming
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_turnip_from_seed_to_harvest() {
    let mut app = build_test_app(small_farm());
    app.world_mut()
        .resource_mut::<Inventory>()
        .add_item(ItemKind::SeedTurnip, 1);

    farm_action(&mut app, PLOT, FarmAction::Till);
    farm_action(&mut app, PLOT, FarmAction::Plant(CropKind::Turnip));
    farm_action(&mut app, PLOT, FarmAction::Water);
    app.update();

    let outcomes = drain::<FarmActionOutcome>(&app);
    let messages: Vec<&str> = outcomes.iter().map(|o| o.result.message.as_str()).collect();
    assert_eq!(messages, vec!["Tile tilled", "Planted turnip", "Watered"]);
    assert_eq!(app.world().resource::<Inventory>().count(ItemKind::SeedTurnip), 0);

    for expected_stage in 1..=3 {
        sleep(&mut app);
        let tile = app.world().resource::<FarmField>().tile(PLOT).unwrap();
        assert_eq!(tile.growth_stage, expected_stage);
        assert_eq!(tile.stage_progress_days, 0);
        assert!(!tile.watered);
        if expected_stage < 3 {
            farm_action(&mut app, PLOT, FarmAction::Water);
            app.update();
        }
    }

    farm_action(&mut app, PLOT, FarmAction::Harvest);
    app.update();

    let harvest = drain::<FarmActionOutcome>(&app)
        .into_iter()
        .find(|o| o.action == FarmAction::Harvest)
        .unwrap();
    assert!(harvest.result.success);
    assert_eq!(harvest.result.crop_id(), CropKind::Turnip.id());

    let tile = app.world().resource::<FarmField>().tile(PLOT).unwrap();
    assert!(tile.tilled);
    assert!(!tile.has_crop());
    assert_eq!(app.world().resource::<Inventory>().count(ItemKind::Turnip), 1);
    assert_eq!(
        app.world().resource::<Skills>().get(SkillKind::Agriculture).actions,
        1
    );
}

#[test]
fn test_planting_without_seed_is_refused() {
    let mut app = build_test_app(small_farm());
    farm_action(&mut app, PLOT, FarmAction::Till);
    farm_action(&mut app, PLOT, FarmAction::Plant(CropKind::Corn));
    app.update();

    let plant = drain::<FarmActionOutcome>(&app)
        .into_iter()
        .find(|o| matches!(o.action, FarmAction::Plant(_)))
        .unwrap();
    assert!(!plant.result.success);
    assert_eq!(plant.result.message, "No Corn Seed left");
    assert!(!app.world().resource::<FarmField>().tile(PLOT).unwrap().has_crop());
}

#[test]
fn test_skipped_days_are_caught_up_once() {
    let mut app = build_test_app(small_farm());
    app.world_mut()
        .resource_mut::<Inventory>()
        .add_item(ItemKind::SeedPumpkin, 1);
    farm_action(&mut app, PLOT, FarmAction::Till);
    farm_action(&mut app, PLOT, FarmAction::Plant(CropKind::Pumpkin));
    farm_action(&mut app, PLOT, FarmAction::Water);
    app.update();

    app.world_mut().resource_mut::<GameClock>().set_day_count(6);
    app.update();

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.last_farm_update_day(), 6);

    // Only the first of the five days had water.
    let tile = app.world().resource::<FarmField>().tile(PLOT).unwrap();
    assert_eq!(tile.growth_stage, 0);
    assert_eq!(tile.stage_progress_days, 1);
    assert!(!tile.watered);
}

#[test]
fn test_shipping_bin_pays_at_tomorrows_price() {
    let mut app = build_test_app(small_farm());
    app.world_mut()
        .resource_mut::<Inventory>()
        .add_item(ItemKind::Turnip, 2);

    send(
        &mut app,
        ShipItemEvent {
            kind: ItemKind::Turnip,
            count: 2,
        },
    );
    app.update();
    assert_eq!(app.world().resource::<Inventory>().count(ItemKind::Turnip), 0);
    assert!(!app.world().resource::<FarmField>().shipping_bin.is_empty());

    sleep(&mut app);
    app.update();

    // Day 2: Spring, heavy rain. 60 + 30 each.
    assert_eq!(
        app.world().resource::<MarketState>().sell_price(ItemKind::Turnip),
        Some(90)
    );
    assert!(app.world().resource::<FarmField>().shipping_bin.is_empty());
    assert_eq!(app.world().resource::<Inventory>().money, STARTING_MONEY + 180);
}

// ─────────────────────────────────────────────────────────────────────────────
// Economy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_winter_snowy_prices_after_day_start() {
    let mut app = build_test_app(SimConfig::default());
    app.world_mut().resource_mut::<GameClock>().set_day_count(24);
    sleep(&mut app);

    let market = app.world().resource::<MarketState>();
    assert_eq!(market.day_count(), 25);
    assert_eq!(market.season_name(), "Winter");
    assert_eq!(market.weather_name(), "Snowy");
    assert_eq!(market.sell_price(ItemKind::Turnip), Some(170));
}

#[test]
fn test_buying_seeds_through_events() {
    let mut app = build_test_app(SimConfig::default());
    let price = app
        .world()
        .resource::<MarketState>()
        .buy_price(ItemKind::SeedTurnip)
        .unwrap();

    send(
        &mut app,
        BuyRequestEvent {
            kind: ItemKind::SeedTurnip,
            quantity: 3,
        },
    );
    app.update();

    let outcome = drain::<TradeOutcomeEvent>(&app).pop().unwrap();
    assert_eq!(outcome.result.ok(), Some(i64::from(price) * 3));
    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count(ItemKind::SeedTurnip), 3);
    assert_eq!(inventory.money, STARTING_MONEY - i64::from(price) * 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mining
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_copper_deposit_breaks_on_third_hit() {
    let mut app = build_test_app(SimConfig::default());
    let at = TileCoord::new(3, 3);
    {
        let mut floors = app.world_mut().resource_mut::<MineFloors>();
        floors.grid = MineGrid::new(8, 8);
        floors.grid.place_mineral(at, 530);
    }

    for _ in 0..3 {
        send(&mut app, MineHitEvent { coord: at });
    }
    app.update();

    let outcomes = drain::<MineHitOutcome>(&app);
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].result.message, "Mining... (2 more)");
    assert_eq!(outcomes[1].result.message, "Mining... (1 more)");
    assert_eq!(outcomes[2].result.depleted, Some(MineralKind::CopperOre));

    let copper = app.world().resource::<Inventory>().count(ItemKind::CopperOre);
    assert!((1..=3).contains(&copper));
    assert_eq!(app.world().resource::<Skills>().get(SkillKind::Mining).actions, 1);

    send(&mut app, MineHitEvent { coord: at });
    app.update();
    let last = drain::<MineHitOutcome>(&app).pop().unwrap();
    assert!(!last.result.success);
    assert_eq!(last.result.message, "No mineral here");
}

// ─────────────────────────────────────────────────────────────────────────────
// Save / Load
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_save_then_load_restores_state() {
    let dir = temp_save_dir("round-trip");
    let mut app = build_test_app(SimConfig {
        save_dir: dir.clone(),
        ..small_farm()
    });
    app.world_mut()
        .resource_mut::<Inventory>()
        .add_item(ItemKind::SeedTurnip, 1);
    farm_action(&mut app, PLOT, FarmAction::Till);
    farm_action(&mut app, PLOT, FarmAction::Plant(CropKind::Turnip));
    farm_action(&mut app, PLOT, FarmAction::Water);
    app.update();
    sleep(&mut app);
    app.world_mut().resource_mut::<PlayerPosition>().x = 12.5;

    send(&mut app, SaveRequestEvent);
    app.update();
    let saved = drain::<SaveCompleteEvent>(&app).pop().unwrap();
    assert!(saved.success, "{:?}", saved.error);
    assert!(dir.join("savegame.json").is_file());

    // Wander off from the saved state.
    app.world_mut().resource_mut::<Inventory>().money = 1;
    app.world_mut()
        .resource_mut::<FarmField>()
        .till_tile(TileCoord::new(3, 3));
    app.world_mut().resource_mut::<PlayerPosition>().x = 0.0;

    send(&mut app, LoadRequestEvent);
    app.update();
    let loaded = drain::<LoadCompleteEvent>(&app).pop().unwrap();
    assert!(loaded.success, "{:?}", loaded.error);

    assert_eq!(app.world().resource::<GameClock>().day(), 2);
    assert_eq!(app.world().resource::<Inventory>().money, STARTING_MONEY);
    assert_eq!(app.world().resource::<PlayerPosition>().x, 12.5);
    let field = app.world().resource::<FarmField>();
    let tile = field.tile(PLOT).unwrap();
    assert_eq!(tile.crop, Some(CropKind::Turnip));
    assert_eq!(tile.growth_stage, 1);
    assert!(!field.tile(TileCoord::new(3, 3)).unwrap().tilled);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_far_future_day_count_loads_and_keeps_running() {
    let dir = temp_save_dir("far-future");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("savegame.json"), "{\"dayCount\": 2000000000}").unwrap();

    let mut app = build_test_app(SimConfig {
        save_dir: dir.clone(),
        ..small_farm()
    });
    send(&mut app, LoadRequestEvent);
    app.update();
    let loaded = drain::<LoadCompleteEvent>(&app).pop().unwrap();
    assert!(loaded.success, "{:?}", loaded.error);
    assert_eq!(app.world().resource::<GameClock>().day(), 2_000_000_000);
    assert_eq!(
        app.world().resource::<MarketState>().day_count(),
        2_000_000_000
    );

    sleep(&mut app);
    assert_eq!(app.world().resource::<GameClock>().day(), 2_000_000_001);
    assert_eq!(app.world().resource::<MarketState>().weather(), Weather::Snowy);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_save_leaves_state_untouched() {
    let dir = temp_save_dir("corrupt");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("savegame.json"), "{\"dayCount\": \"soon\"}").unwrap();

    let mut app = build_test_app(SimConfig {
        save_dir: dir.clone(),
        ..small_farm()
    });
    sleep(&mut app);
    app.world_mut().resource_mut::<Inventory>().money = 777;

    send(&mut app, LoadRequestEvent);
    app.update();
    let loaded = drain::<LoadCompleteEvent>(&app).pop().unwrap();
    assert!(!loaded.success);
    assert!(loaded.error.is_some());
    assert_eq!(app.world().resource::<GameClock>().day(), 2);
    assert_eq!(app.world().resource::<Inventory>().money, 777);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_load_without_save_file_fails() {
    let dir = temp_save_dir("absent");
    let mut app = build_test_app(SimConfig {
        save_dir: dir,
        ..SimConfig::default()
    });
    send(&mut app, LoadRequestEvent);
    app.update();
    let loaded = drain::<LoadCompleteEvent>(&app).pop().unwrap();
    assert!(!loaded.success);
    assert_eq!(app.world().resource::<GameClock>().day(), 1);
}
