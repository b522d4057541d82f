//! Day-driven market prices.
//!
//! Prices are a pure function of the day count: season scales the base
//! price, weather adds a flat bonus, and the result never drops below 1.
//! Ores ignore both and always trade at their base price.

use bevy::prelude::*;

use crate::shared::*;

const SUNNY_BONUS: i32 = 0;
const LIGHT_RAIN_BONUS: i32 = 10;
const HEAVY_RAIN_BONUS: i32 = 30;
const SNOWY_BONUS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketGood {
    pub kind: ItemKind,
    pub base_price: i32,
    pub current_price: i32,
}

impl MarketGood {
    const fn new(kind: ItemKind, base_price: i32) -> Self {
        Self { kind, base_price, current_price: base_price }
    }

    fn is_fixed_price(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::CopperOre
                | ItemKind::IronOre
                | ItemKind::SilverOre
                | ItemKind::GoldOre
                | ItemKind::DiamondOre
        )
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct MarketState {
    buy_goods: Vec<MarketGood>,
    sell_goods: Vec<MarketGood>,
    day_count: i32,
    season: Season,
    weather: Weather,
}

impl Default for MarketState {
    fn default() -> Self {
        let mut market = Self {
            buy_goods: default_buy_goods(),
            sell_goods: default_sell_goods(),
            day_count: 1,
            season: Season::Spring,
            weather: Weather::Sunny,
        };
        market.update_prices(1);
        market
    }
}

fn default_buy_goods() -> Vec<MarketGood> {
    vec![
        MarketGood::new(ItemKind::SeedTurnip, 20),
        MarketGood::new(ItemKind::SeedPotato, 30),
        MarketGood::new(ItemKind::SeedCorn, 40),
        MarketGood::new(ItemKind::SeedTomato, 35),
        MarketGood::new(ItemKind::SeedPumpkin, 60),
        MarketGood::new(ItemKind::SeedBlueberry, 45),
    ]
}

fn default_sell_goods() -> Vec<MarketGood> {
    vec![
        // Crops
        MarketGood::new(ItemKind::Turnip, 60),
        MarketGood::new(ItemKind::Potato, 80),
        MarketGood::new(ItemKind::Corn, 120),
        MarketGood::new(ItemKind::Tomato, 90),
        MarketGood::new(ItemKind::Pumpkin, 180),
        MarketGood::new(ItemKind::Blueberry, 110),
        // Fish
        MarketGood::new(ItemKind::Fish, 50),
        MarketGood::new(ItemKind::Anchovy, 30),
        MarketGood::new(ItemKind::Carp, 30),
        MarketGood::new(ItemKind::Eel, 85),
        MarketGood::new(ItemKind::Flounder, 50),
        MarketGood::new(ItemKind::LargemouthBass, 100),
        MarketGood::new(ItemKind::Pufferfish, 200),
        MarketGood::new(ItemKind::RainbowTrout, 65),
        MarketGood::new(ItemKind::Sturgeon, 200),
        MarketGood::new(ItemKind::Tilapia, 75),
        // Ores
        MarketGood::new(ItemKind::CopperOre, 20),
        MarketGood::new(ItemKind::IronOre, 50),
        MarketGood::new(ItemKind::SilverOre, 100),
        MarketGood::new(ItemKind::GoldOre, 250),
        MarketGood::new(ItemKind::DiamondOre, 500),
    ]
}

impl MarketState {
    /// Recomputes season, weather and every current price for `day_count`.
    /// Days below 1 are treated as day 1.
    pub fn update_prices(&mut self, day_count: i32) {
        let day = day_count.max(1);
        self.day_count = day;
        self.season = Season::for_day(day);
        self.weather = Weather::for_day(day);

        let (season, weather) = (self.season, self.weather);
        for good in self.buy_goods.iter_mut().chain(self.sell_goods.iter_mut()) {
            good.current_price = price_for(good, season, weather);
        }
    }

    pub fn buy_goods(&self) -> &[MarketGood] {
        &self.buy_goods
    }

    pub fn sell_goods(&self) -> &[MarketGood] {
        &self.sell_goods
    }

    /// Price the shop charges, or `None` if the shop does not sell it.
    pub fn buy_price(&self, kind: ItemKind) -> Option<i32> {
        lookup(&self.buy_goods, kind)
    }

    /// Price the shop pays, or `None` if the shop does not buy it.
    pub fn sell_price(&self, kind: ItemKind) -> Option<i32> {
        lookup(&self.sell_goods, kind)
    }

    /// Save-format flavour of `buy_price`: -1 when untradeable.
    pub fn buy_price_or_sentinel(&self, kind: ItemKind) -> i32 {
        self.buy_price(kind).unwrap_or(-1)
    }

    /// Save-format flavour of `sell_price`: -1 when untradeable.
    pub fn sell_price_or_sentinel(&self, kind: ItemKind) -> i32 {
        self.sell_price(kind).unwrap_or(-1)
    }

    pub fn day_count(&self) -> i32 {
        self.day_count
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn season_name(&self) -> &'static str {
        self.season.name()
    }

    pub fn weather_name(&self) -> &'static str {
        self.weather.name()
    }

    /// Forecast for any day, without touching current prices.
    pub fn predict_weather(day_count: i32) -> Weather {
        Weather::for_day(day_count)
    }

    /// Snapshot of today's sell table, for settling the shipping bin.
    pub fn sell_price_table(&self) -> Vec<(ItemKind, i32)> {
        self.sell_goods.iter().map(|g| (g.kind, g.current_price)).collect()
    }
}

fn lookup(goods: &[MarketGood], kind: ItemKind) -> Option<i32> {
    goods.iter().find(|g| g.kind == kind).map(|g| g.current_price)
}

fn price_for(good: &MarketGood, season: Season, weather: Weather) -> i32 {
    if good.is_fixed_price() {
        return good.base_price.max(1);
    }

    let scaled = match season {
        Season::Spring => good.base_price,
        Season::Summer => good.base_price / 2,
        Season::Fall => good.base_price * 3 / 2,
        Season::Winter => good.base_price * 2,
    };
    let bonus = match weather {
        Weather::Sunny => SUNNY_BONUS,
        Weather::LightRain => LIGHT_RAIN_BONUS,
        Weather::HeavyRain => HEAVY_RAIN_BONUS,
        Weather::Snowy => SNOWY_BONUS,
    };
    (scaled + bonus).max(1)
}
