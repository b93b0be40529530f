// src/stocks/definitions.rs
//! Listing metadata and the live ticker table.
//
//! `default_stock_universe()` seeds the four large caps the simulation
//! starts from unless a config says otherwise.

use super::ticker::Ticker;
use crate::types::Symbol;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shares a single participant trade is measured against when no explicit
/// liquidity estimate is configured.
pub const DEFAULT_TYPICAL_VOLUME: u64 = 10_000;

/// Immutable facts about a listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    /// NASDAQ / NYSE ticker (e.g. "AAPL").
    pub ticker: Symbol,
    /// Human-readable company name.
    #[serde(default)]
    pub company_name: String,
    /// Shares outstanding.
    pub shares_outstanding: u64,
    /// Opening price at time-zero of the simulation.
    pub initial_price: f64,
    /// Typical volume used to normalise price impact.
    #[serde(default = "default_typical_volume")]
    pub typical_volume: u64,
}

fn default_typical_volume() -> u64 {
    DEFAULT_TYPICAL_VOLUME
}

/// Convenience factory so call-sites stay concise.
impl Stock {
    #[inline]
    pub fn new<T1: Into<String>, T2: Into<String>>(
        ticker: T1,
        company_name: T2,
        shares_outstanding: u64,
        initial_price: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            company_name: company_name.into(),
            shares_outstanding,
            initial_price,
            typical_volume: DEFAULT_TYPICAL_VOLUME,
        }
    }

    /// Derives shares outstanding from a market cap quoted in billions.
    pub fn from_market_cap<T1: Into<String>, T2: Into<String>>(
        ticker: T1,
        company_name: T2,
        market_cap_bn: f64,
        initial_price: f64,
    ) -> Self {
        let shares = (market_cap_bn * 1e9 / initial_price).round() as u64;
        Self::new(ticker, company_name, shares, initial_price)
    }

    pub fn with_typical_volume(mut self, typical_volume: u64) -> Self {
        self.typical_volume = typical_volume;
        self
    }
}

static DEFAULT_UNIVERSE: Lazy<Vec<Stock>> = Lazy::new(|| {
    vec![
        Stock::from_market_cap("AAPL", "Apple Inc.", 4010.0, 270.0),
        Stock::from_market_cap("GOOGL", "Alphabet Inc.", 3400.0, 281.0),
        Stock::from_market_cap("AMZN", "Amazon.com Inc.", 2600.0, 244.0),
        Stock::from_market_cap("NVDA", "NVIDIA Corporation", 4920.0, 202.0),
    ]
});

/// The universe of stocks available when the market boots.
#[inline]
pub fn default_stock_universe() -> Vec<Stock> {
    DEFAULT_UNIVERSE.clone()
}

/// All live tickers, iterated in listing order.
///
/// The order never changes during a run: the scheduler walks tickers in
/// this order every timestep, which keeps runs reproducible.
#[derive(Debug, Clone)]
pub struct StockMarket {
    tickers: Vec<Ticker>,
    index: HashMap<Symbol, usize>,
}

impl StockMarket {
    pub fn new(stocks: &[Stock], baseline_volatility: f64) -> Self {
        let tickers: Vec<Ticker> = stocks
            .iter()
            .map(|s| Ticker::new(s, baseline_volatility))
            .collect();
        let index = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.symbol.clone(), i))
            .collect();
        Self { tickers, index }
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Ticker> {
        self.index.get(symbol).map(|&i| &self.tickers[i])
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Ticker> {
        match self.index.get(symbol) {
            Some(&i) => Some(&mut self.tickers[i]),
            None => None,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ticker> {
        self.tickers.iter_mut()
    }

    /// Symbols in iteration order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tickers.iter().map(|t| t.symbol.clone()).collect()
    }

    /// Current price per symbol.
    pub fn marks(&self) -> HashMap<Symbol, f64> {
        self.tickers
            .iter()
            .map(|t| (t.symbol.clone(), t.price()))
            .collect()
    }
}
