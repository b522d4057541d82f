//! Headless Harvestvale runner.
//!
//! Plays a scripted week on a small turnip plot with an accelerated clock:
//! every morning it harvests what is ripe, re-tills, buys seed, plants and
//! waters; every evening it goes to bed before midnight. After the last day
//! the game is saved and the app exits.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use harvestvale::calendar::{CalendarSet, GameClock};
use harvestvale::config::SimConfig;
use harvestvale::economy::{format_gold, BuyRequestEvent, TradeOutcomeEvent};
use harvestvale::save::{SaveCompleteEvent, SaveRequestEvent};
use harvestvale::shared::*;
use harvestvale::sim::SimulationPlugin;
use harvestvale::world::Inventory;

const CONFIG_PATH: &str = "harvestvale.ron";
const SCRIPTED_DAYS: i32 = 7;
const BEDTIME_HOUR: u32 = 22;
/// Simulated time per frame; each frame is run back to back.
const FRAME_STEP: Duration = Duration::from_millis(250);

fn main() -> AppExit {
    let config = SimConfig::load_or_default(CONFIG_PATH);

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME_STEP))
        .insert_resource(config)
        .add_plugins(SimulationPlugin)
        .init_resource::<FarmScript>()
        .add_systems(
            Update,
            (morning_chores, evening_routine, finish_week)
                .chain()
                .before(CalendarSet)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(Update, (log_farm_outcomes, log_trades, exit_after_save))
        .run()
}

// ─────────────────────────────────────────────────────────────────────────────
// Script
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource, Debug)]
struct FarmScript {
    plot: Vec<TileCoord>,
    crop: CropKind,
    /// Chores run the frame after the day starts, so seed bought that
    /// morning is already in the bag.
    planting_due: bool,
    chores_started: bool,
    slept_on_day: i32,
    save_sent: bool,
}

impl Default for FarmScript {
    fn default() -> Self {
        Self {
            plot: (2..6).map(|x| TileCoord::new(x, 2)).collect(),
            crop: CropKind::Turnip,
            planting_due: false,
            chores_started: false,
            slept_on_day: 0,
            save_sent: false,
        }
    }
}

fn morning_chores(
    mut day_start_reader: EventReader<DayStartEvent>,
    mut script: ResMut<FarmScript>,
    inventory: Res<Inventory>,
    mut actions: EventWriter<FarmActionEvent>,
    mut buy_writer: EventWriter<BuyRequestEvent>,
) {
    let new_day = day_start_reader.read().count() > 0;

    if script.planting_due {
        script.planting_due = false;
        for &coord in &script.plot {
            actions.send(FarmActionEvent {
                coord,
                action: FarmAction::Plant(script.crop),
            });
            actions.send(FarmActionEvent {
                coord,
                action: FarmAction::Water,
            });
        }
        return;
    }

    if !new_day && script.chores_started {
        return;
    }
    script.chores_started = true;

    for &coord in &script.plot {
        actions.send(FarmActionEvent {
            coord,
            action: FarmAction::Harvest,
        });
        actions.send(FarmActionEvent {
            coord,
            action: FarmAction::Till,
        });
    }

    let seed = script.crop.seed_item();
    let short = (script.plot.len() as u32).saturating_sub(inventory.count(seed));
    if short > 0 {
        buy_writer.send(BuyRequestEvent {
            kind: seed,
            quantity: short,
        });
    }
    script.planting_due = true;
}

fn evening_routine(
    clock: Res<GameClock>,
    mut script: ResMut<FarmScript>,
    mut sleep_writer: EventWriter<SleepRequestEvent>,
) {
    if clock.hour() >= BEDTIME_HOUR && script.slept_on_day != clock.day() {
        script.slept_on_day = clock.day();
        info!("[Script] Going to bed on day {}", clock.day());
        sleep_writer.send(SleepRequestEvent);
    }
}

fn finish_week(
    clock: Res<GameClock>,
    inventory: Res<Inventory>,
    mut script: ResMut<FarmScript>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if script.save_sent || clock.day() <= SCRIPTED_DAYS {
        return;
    }
    script.save_sent = true;
    info!(
        "[Script] Week over on day {}: {} turnips, {}",
        clock.day(),
        inventory.count(ItemKind::Turnip),
        format_gold(inventory.money)
    );
    save_writer.send(SaveRequestEvent);
}

fn exit_after_save(
    mut complete_reader: EventReader<SaveCompleteEvent>,
    mut exit_writer: EventWriter<AppExit>,
) {
    for ev in complete_reader.read() {
        if ev.success {
            exit_writer.send(AppExit::Success);
        } else {
            error!(
                "[Script] Save failed: {}",
                ev.error.as_deref().unwrap_or("unknown error")
            );
            exit_writer.send(AppExit::error());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

fn log_farm_outcomes(mut outcome_reader: EventReader<FarmActionOutcome>) {
    for ev in outcome_reader.read() {
        if ev.result.success {
            debug!(
                "[Script] ({}, {}) {:?}: {}",
                ev.coord.x, ev.coord.y, ev.action, ev.result.message
            );
        } else {
            debug!(
                "[Script] ({}, {}) {:?} refused: {}",
                ev.coord.x, ev.coord.y, ev.action, ev.result.message
            );
        }
    }
}

fn log_trades(mut trade_reader: EventReader<TradeOutcomeEvent>) {
    for ev in trade_reader.read() {
        match &ev.result {
            Ok(gold) => info!("[Script] Traded {} × {} for {gold}g", ev.quantity, ev.kind.name()),
            Err(e) => warn!("[Script] Trade of {} × {} failed: {e}", ev.quantity, ev.kind.name()),
        }
    }
}
