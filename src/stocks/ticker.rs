// src/stocks/ticker.rs

use super::definitions::Stock;
use crate::types::{Side, Symbol};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Number of recent prices kept for rolling statistics.
pub const PRICE_WINDOW: usize = 20;
/// Look-back (in price updates) for short-window momentum.
pub const MOMENTUM_WINDOW: usize = 5;

/// Live market state for one listed stock.
///
/// The price is only writable through `set_price`, which keeps the rolling
/// window and the high-water mark in step with it. Market cap is always
/// derived from the current price.
#[derive(Debug, Clone)]
pub struct Ticker {
    pub symbol: Symbol,
    pub company_name: String,
    pub shares_outstanding: u64,
    /// Denominator of the participation ratio.
    pub typical_volume: u64,
    /// Model volatility used by the impact formula.
    pub volatility: f64,
    /// Shares traded during the current timestep.
    pub volume: u64,
    /// Shares bought since the start of the run.
    pub buy_volume: u64,
    /// Shares sold since the start of the run.
    pub sell_volume: u64,
    /// Set once the price has been clamped to the floor.
    pub distressed: bool,
    /// Circuit breaker state; cleared at the next day boundary.
    pub halted: bool,
    price: f64,
    previous_price: f64,
    initial_price: f64,
    high_water: f64,
    history: VecDeque<f64>,
}

impl Ticker {
    pub fn new(stock: &Stock, baseline_volatility: f64) -> Self {
        let mut history = VecDeque::with_capacity(PRICE_WINDOW);
        history.push_back(stock.initial_price);
        Self {
            symbol: stock.ticker.clone(),
            company_name: stock.company_name.clone(),
            shares_outstanding: stock.shares_outstanding,
            typical_volume: stock.typical_volume.max(1),
            volatility: baseline_volatility,
            volume: 0,
            buy_volume: 0,
            sell_volume: 0,
            distressed: false,
            halted: false,
            price: stock.initial_price,
            previous_price: stock.initial_price,
            initial_price: stock.initial_price,
            high_water: stock.initial_price,
            history,
        }
    }

    #[inline]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[inline]
    pub fn previous_price(&self) -> f64 {
        self.previous_price
    }

    #[inline]
    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    #[inline]
    pub fn high_water(&self) -> f64 {
        self.high_water
    }

    /// `price × shares_outstanding`, recomputed on every call.
    #[inline]
    pub fn market_cap(&self) -> f64 {
        self.price * self.shares_outstanding as f64
    }

    /// Relative size of the most recent price move.
    pub fn price_change_pct(&self) -> f64 {
        (self.price - self.previous_price) / self.previous_price
    }

    /// Moves the price. Callers are responsible for keeping it positive;
    /// the pricing model's floor clamp is the only writer.
    pub(crate) fn set_price(&mut self, new_price: f64) {
        debug_assert!(new_price > 0.0 && new_price.is_finite());
        self.previous_price = self.price;
        self.price = new_price;
        self.high_water = self.high_water.max(new_price);
        if self.history.len() == PRICE_WINDOW {
            self.history.pop_front();
        }
        self.history.push_back(new_price);
    }

    pub(crate) fn record_volume(&mut self, side: Side, quantity: u64) {
        self.volume += quantity;
        match side {
            Side::Buy => self.buy_volume += quantity,
            Side::Sell => self.sell_volume += quantity,
        }
    }

    /// Population standard deviation of simple returns over the window.
    pub fn realized_volatility(&self) -> f64 {
        if self.history.len() < 2 {
            return 0.0;
        }
        let returns: Vec<f64> = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(prev, next)| (next - prev) / prev)
            .collect();
        returns.iter().population_std_dev()
    }

    /// Return over the last `MOMENTUM_WINDOW` price updates (or since the
    /// start of the window if fewer are available).
    pub fn momentum(&self) -> f64 {
        let len = self.history.len();
        let anchor = if len > MOMENTUM_WINDOW {
            self.history[len - 1 - MOMENTUM_WINDOW]
        } else {
            self.history[0]
        };
        self.price / anchor - 1.0
    }

    /// Rolling mean of the price window.
    pub fn fair_value(&self) -> f64 {
        self.history.iter().mean()
    }

    /// Highest price in the rolling window.
    pub fn local_peak(&self) -> f64 {
        self.history.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Read-only view handed to strategies.
    pub fn quote(&self) -> Quote {
        Quote {
            symbol: self.symbol.clone(),
            price: self.price,
            previous_price: self.previous_price,
            initial_price: self.initial_price,
            high_water: self.high_water,
            price_change_pct: self.price_change_pct(),
            momentum: self.momentum(),
            fair_value: self.fair_value(),
            local_peak: self.local_peak(),
            volatility: self.volatility,
            realized_volatility: self.realized_volatility(),
            buy_volume: self.buy_volume,
            sell_volume: self.sell_volume,
            distressed: self.distressed,
            halted: self.halted,
        }
    }
}

/// Point-in-time copy of a ticker's observable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub previous_price: f64,
    pub initial_price: f64,
    pub high_water: f64,
    pub price_change_pct: f64,
    pub momentum: f64,
    pub fair_value: f64,
    pub local_peak: f64,
    pub volatility: f64,
    pub realized_volatility: f64,
    pub buy_volume: u64,
    pub sell_volume: u64,
    pub distressed: bool,
    pub halted: bool,
}
