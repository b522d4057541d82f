//! Economy domain: market prices, shop transactions, gold tracking.
//!
//! Prices are refreshed from the day count on every DayStartEvent.
//! Gold changes from any domain arrive as GoldChangeEvents.

use bevy::prelude::*;

use crate::calendar::{CalendarSet, GameClock};
use crate::shared::*;

pub mod gold;
pub mod market;
pub mod shop;

pub use gold::{apply_gold_changes, format_gold, EconomyStats};
pub use market::{MarketGood, MarketState};
pub use shop::{buy, sell, BuyRequestEvent, SellRequestEvent, TradeError, TradeOutcomeEvent};

use shop::{handle_buy, handle_sell};

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // ── Resources ──────────────────────────────────────────────────────
        app.init_resource::<EconomyStats>()
            .init_resource::<MarketState>();

        // ── Events ─────────────────────────────────────────────────────────
        app.add_event::<BuyRequestEvent>()
            .add_event::<SellRequestEvent>()
            .add_event::<TradeOutcomeEvent>()
            .add_event::<GoldChangeEvent>()
            .add_event::<DayStartEvent>()
            .add_event::<ItemPickupEvent>();

        // ── Systems ────────────────────────────────────────────────────────
        app.add_systems(Startup, sync_prices_with_clock)
            .add_systems(
                Update,
                (
                    refresh_prices_on_day_start,
                    handle_buy,
                    handle_sell,
                    // Gold change events can arrive from any domain at any time.
                    apply_gold_changes,
                )
                    .chain()
                    .after(CalendarSet),
            );
    }
}

/// Prices must match the loaded day before the first frame.
fn sync_prices_with_clock(clock: Option<Res<GameClock>>, mut market: ResMut<MarketState>) {
    let day = clock.map(|c| c.day()).unwrap_or(1);
    market.update_prices(day);
}

pub fn refresh_prices_on_day_start(
    mut day_start_reader: EventReader<DayStartEvent>,
    mut market: ResMut<MarketState>,
) {
    let Some(ev) = day_start_reader.read().last() else {
        return;
    };
    market.update_prices(ev.day);
    info!(
        "[Market] Day {} prices — {} / {}",
        market.day_count(),
        market.season_name(),
        market.weather_name()
    );
}
