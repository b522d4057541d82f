//! Calendar domain: the heartbeat of Harvestvale.
//!
//! Responsible for:
//! - Mapping frame delta-time onto in-game seconds, hours and days
//! - Detecting midnight and rolling the day over
//! - Sending DayEndEvent / DayStartEvent around each rollover
//! - Charging the pass-out penalty when the player never went to bed
//! - Ending the day early on SleepRequestEvent
//!
//! Time only flows while `GameState::Playing`; the Paused state freezes it.

use bevy::prelude::*;

use crate::config::SimConfig;
use crate::shared::*;

// ─── Clock ────────────────────────────────────────────────────────────────────

/// Day/hour clock. One instance per `App`.
///
/// `advance` never increments the day on its own. Once the elapsed time
/// reaches the day length, `is_midnight` stays true until the owner calls
/// `advance_to_next_day`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameClock {
    day_count: i32,
    seconds_into_day: f32,
    last_farm_update_day: i32,
    seconds_per_day: f32,
    start_offset: f32,
    /// Set by `skip_to_next_morning`; the next rollover carries no penalty.
    skip_pending: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl GameClock {
    pub fn new(seconds_per_day: f32, start_hour: f32) -> Self {
        let start_offset = seconds_per_day * (start_hour / 24.0);
        Self {
            day_count: 1,
            seconds_into_day: start_offset,
            last_farm_update_day: 0,
            seconds_per_day,
            start_offset,
            skip_pending: false,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.seconds_per_day, config.start_hour)
    }

    pub fn advance(&mut self, delta_seconds: f32) {
        self.seconds_into_day += delta_seconds;
    }

    pub fn day(&self) -> i32 {
        self.day_count
    }

    pub fn hour(&self) -> u32 {
        (self.hours_into_day().floor() as u32) % 24
    }

    pub fn minute(&self) -> u32 {
        let hours = self.hours_into_day();
        ((hours - hours.floor()) * 60.0).floor() as u32 % 60
    }

    /// Fraction of the current day elapsed, wrapped into `[0, 1)`.
    pub fn day_progress(&self) -> f32 {
        (self.seconds_into_day / self.seconds_per_day).rem_euclid(1.0)
    }

    pub fn is_midnight(&self) -> bool {
        self.seconds_into_day >= self.seconds_per_day
    }

    pub fn advance_to_next_day(&mut self) {
        self.day_count = self.day_count.saturating_add(1);
        self.seconds_into_day = self.start_offset;
        self.skip_pending = false;
    }

    /// Debug skip: parks the clock just short of tomorrow's start offset.
    /// The rollover itself still happens through `is_midnight` on the next tick.
    pub fn skip_to_next_morning(&mut self) {
        self.seconds_into_day = self.seconds_per_day + self.start_offset - 0.2;
        self.skip_pending = true;
    }

    pub fn skip_pending(&self) -> bool {
        self.skip_pending
    }

    pub fn set_day_count(&mut self, day: i32) {
        self.day_count = day.max(1);
    }

    pub fn last_farm_update_day(&self) -> i32 {
        self.last_farm_update_day
    }

    pub fn set_last_farm_update_day(&mut self, day: i32) {
        self.last_farm_update_day = day;
    }

    pub fn seconds_into_day(&self) -> f32 {
        self.seconds_into_day
    }

    pub fn seconds_per_day(&self) -> f32 {
        self.seconds_per_day
    }

    pub fn season(&self) -> Season {
        Season::for_day(self.day_count)
    }

    fn hours_into_day(&self) -> f32 {
        self.seconds_into_day * 24.0 / self.seconds_per_day
    }
}

// ─── Plugin ───────────────────────────────────────────────────────────────────

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameClock>() {
            let clock = app
                .world()
                .get_resource::<SimConfig>()
                .map(GameClock::from_config)
                .unwrap_or_default();
            app.insert_resource(clock);
        }

        app.add_event::<DayEndEvent>()
            .add_event::<DayStartEvent>()
            .add_event::<SleepRequestEvent>()
            .add_event::<PassedOutEvent>()
            .add_event::<GoldChangeEvent>()
            .add_systems(Startup, announce_clock)
            .add_systems(OnEnter(GameState::Playing), resume_time)
            .add_systems(OnExit(GameState::Playing), pause_time)
            .add_systems(
                Update,
                (tick_clock, handle_sleep_request)
                    .chain()
                    .in_set(CalendarSet)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Systems that move the clock. Other domains order themselves after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarSet;

fn announce_clock(clock: Res<GameClock>) {
    info!(
        "[Calendar] Clock ready — Day {} {:02}:{:02}, {}s per day",
        clock.day(),
        clock.hour(),
        clock.minute(),
        clock.seconds_per_day()
    );
}

fn resume_time(clock: Option<Res<GameClock>>) {
    if let Some(clock) = clock {
        info!(
            "[Calendar] Time resumed — Day {} {:02}:{:02}",
            clock.day(),
            clock.hour(),
            clock.minute()
        );
    }
}

fn pause_time() {
    info!("[Calendar] Time paused");
}

// ─── Time tick ────────────────────────────────────────────────────────────────

/// Advances the clock by the frame delta. Reaching midnight while still
/// awake means the player passed out: the day ends with a gold penalty.
/// A debug skip rolls the day over without one.
fn tick_clock(
    time: Res<Time>,
    config: Option<Res<SimConfig>>,
    mut clock: ResMut<GameClock>,
    mut day_end_writer: EventWriter<DayEndEvent>,
    mut day_start_writer: EventWriter<DayStartEvent>,
    mut passed_out_writer: EventWriter<PassedOutEvent>,
    mut gold_writer: EventWriter<GoldChangeEvent>,
) {
    clock.advance(time.delta_secs());
    if !clock.is_midnight() {
        return;
    }

    if clock.skip_pending() {
        info!("[Calendar] Skipped to the morning after Day {}", clock.day());
        roll_over(&mut clock, &mut day_end_writer, &mut day_start_writer);
        return;
    }

    let penalty = config
        .map(|c| c.pass_out_penalty)
        .unwrap_or(SimConfig::default().pass_out_penalty);
    let day = clock.day();

    warn!("[Calendar] Player passed out at midnight on Day {day} (-{penalty}g)");
    passed_out_writer.send(PassedOutEvent { day, penalty });
    if penalty > 0 {
        gold_writer.send(GoldChangeEvent {
            amount: -i64::from(penalty),
            reason: "Passed out".to_string(),
        });
    }

    roll_over(&mut clock, &mut day_end_writer, &mut day_start_writer);
}

/// Going to bed ends the day without a penalty.
fn handle_sleep_request(
    mut sleep_reader: EventReader<SleepRequestEvent>,
    mut clock: ResMut<GameClock>,
    mut day_end_writer: EventWriter<DayEndEvent>,
    mut day_start_writer: EventWriter<DayStartEvent>,
) {
    // Several requests in one frame still only end one day.
    if sleep_reader.read().count() == 0 {
        return;
    }
    info!(
        "[Calendar] Player went to sleep at {:02}:{:02} on Day {}",
        clock.hour(),
        clock.minute(),
        clock.day()
    );
    roll_over(&mut clock, &mut day_end_writer, &mut day_start_writer);
}

fn roll_over(
    clock: &mut GameClock,
    day_end_writer: &mut EventWriter<DayEndEvent>,
    day_start_writer: &mut EventWriter<DayStartEvent>,
) {
    let ended = clock.day();
    day_end_writer.send(DayEndEvent { day: ended });
    clock.advance_to_next_day();
    day_start_writer.send(DayStartEvent { day: clock.day() });
    info!(
        "[Calendar] Day {} ended — Day {} {} begins",
        ended,
        clock.day(),
        clock.season().name()
    );
}

// ─── Tests ────────────────────────────────────────────────────────────────────
