//! Farming domain: soil tilling, watering, planting, crop growth, harvest,
//! and the shipping bin.
//!
//! The field catches up with the clock on every tick, so days that passed
//! while the farm was not simulated (sleep, load) are replayed one by one.

use bevy::prelude::*;

use crate::calendar::{CalendarSet, GameClock};
use crate::config::SimConfig;
use crate::economy::{refresh_prices_on_day_start, MarketState};
use crate::shared::*;
use crate::skills::{SkillKind, Skills};
use crate::world::{FarmMap, Inventory};

pub mod crops;
pub mod field;
pub mod shipping;

pub use crops::{CropDef, CropRegistry};
pub use field::{CatchUp, FarmField, FarmTile, FarmTileRecord};
pub use shipping::{price_fn_from_table, EarningsCallback, PriceFn, Settlement, ShippingBin};

/// Player drops items from the bag into the shipping bin.
#[derive(Event, Debug, Clone)]
pub struct ShipItemEvent {
    pub kind: ItemKind,
    pub count: u32,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<FarmField>() {
            let field = match app.world().get_resource::<FarmMap>() {
                Some(map) => FarmField::for_map(map),
                None => {
                    let config = app
                        .world()
                        .get_resource::<SimConfig>()
                        .cloned()
                        .unwrap_or_default();
                    FarmField::new(config.farm_width, config.farm_height)
                }
            };
            app.insert_resource(field);
        }

        app.add_event::<FarmActionEvent>()
            .add_event::<FarmActionOutcome>()
            .add_event::<ShipItemEvent>()
            .add_event::<ItemPickupEvent>()
            .add_event::<GoldChangeEvent>()
            .add_event::<DayStartEvent>()
            .add_systems(Startup, bind_market_prices)
            .add_systems(
                Update,
                (
                    bind_market_prices_on_day_start,
                    catch_up_with_clock,
                    apply_farm_actions,
                    ship_items,
                )
                    .chain()
                    .after(CalendarSet)
                    .after(refresh_prices_on_day_start)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Price binding
// ─────────────────────────────────────────────────────────────────────────────

fn bind_market_prices(market: Option<Res<MarketState>>, mut field: ResMut<FarmField>) {
    if let Some(market) = market {
        field.set_price_fn(Some(price_fn_from_table(market.sell_price_table())));
    }
}

/// Rebinds the shipping price table to today's market prices.
fn bind_market_prices_on_day_start(
    mut day_start_reader: EventReader<DayStartEvent>,
    market: Option<Res<MarketState>>,
    field: ResMut<FarmField>,
) {
    if day_start_reader.read().count() == 0 {
        return;
    }
    bind_market_prices(market, field);
}

// ─────────────────────────────────────────────────────────────────────────────
// Catch-up
// ─────────────────────────────────────────────────────────────────────────────

/// Replays every day the field has not seen yet and pays out the shipping bin.
pub fn catch_up_with_clock(
    mut clock: ResMut<GameClock>,
    mut field: ResMut<FarmField>,
    mut gold_writer: EventWriter<GoldChangeEvent>,
) {
    let result = field.catch_up(&mut clock);
    if result.days_simulated == 0 {
        return;
    }

    for settlement in &result.settlements {
        if settlement.earnings > 0 {
            gold_writer.send(GoldChangeEvent {
                amount: settlement.earnings,
                reason: "Shipping bin".to_string(),
            });
        }
        for stack in &settlement.unsold {
            warn!(
                "[Farming] {} × {} has no buyer; left in shipping bin",
                stack.count,
                stack.kind.name()
            );
        }
    }

    info!(
        "[Farming] Simulated {} day(s) up to Day {}; shipping earned {}g",
        result.days_simulated,
        clock.day(),
        result.earnings()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Player actions
// ─────────────────────────────────────────────────────────────────────────────

/// Applies farm actions in the order they were sent.
/// Planting consumes one seed; harvesting puts the crop in the bag.
pub fn apply_farm_actions(
    mut action_reader: EventReader<FarmActionEvent>,
    mut field: ResMut<FarmField>,
    mut inventory: ResMut<Inventory>,
    mut skills: Option<ResMut<Skills>>,
    mut outcome_writer: EventWriter<FarmActionOutcome>,
    mut pickup_writer: EventWriter<ItemPickupEvent>,
) {
    for ev in action_reader.read() {
        let result = match ev.action {
            FarmAction::Till => field.till_tile(ev.coord),
            FarmAction::Water => field.water_tile(ev.coord),
            FarmAction::Plant(crop) => {
                let seed = crop.seed_item();
                if !inventory.has(seed, 1) {
                    ActionResult::fail(format!("No {} left", seed.name()))
                } else {
                    let result = field.plant_seed(ev.coord, crop);
                    if result.success {
                        inventory.remove_item(seed, 1);
                    }
                    result
                }
            }
            FarmAction::Harvest => {
                let mut result = field.harvest_tile(ev.coord);
                if let Some(crop) = result.crop {
                    if let Some(skills) = skills.as_deref_mut() {
                        skills.record_action(SkillKind::Agriculture, 1);
                    }
                    let item = crop.harvest_item();
                    if inventory.add_item(item, 1) {
                        pickup_writer.send(ItemPickupEvent { kind: item, count: 1 });
                    } else {
                        warn!("[Farming] Inventory full; {} not collected", item.name());
                        result.message = "Inventory full!".to_string();
                    }
                }
                result
            }
        };

        if result.success {
            debug!(
                "[Farming] {:?} at ({}, {}): {}",
                ev.action, ev.coord.x, ev.coord.y, result.message
            );
        }
        outcome_writer.send(FarmActionOutcome {
            coord: ev.coord,
            action: ev.action,
            result,
        });
    }
}

/// Moves items from the bag into the shipping bin; all or nothing.
pub fn ship_items(
    mut ship_reader: EventReader<ShipItemEvent>,
    mut field: ResMut<FarmField>,
    mut inventory: ResMut<Inventory>,
) {
    for ev in ship_reader.read() {
        if ev.count == 0 {
            continue;
        }
        if !inventory.has(ev.kind, ev.count) {
            info!(
                "[Farming] Cannot ship {} × {}: only {} in bag",
                ev.count,
                ev.kind.name(),
                inventory.count(ev.kind)
            );
            continue;
        }
        if field.shipping_bin.slots.room_for(ev.kind) < ev.count {
            info!("[Farming] Shipping bin is full");
            continue;
        }
        inventory.remove_item(ev.kind, ev.count);
        field.shipping_bin.deposit(ev.kind, ev.count);
        info!("[Farming] Shipped {} × {}", ev.count, ev.kind.name());
    }
}
