// src/state.rs

use crate::agents::{MarketSnapshot, Trader};
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::effects::{EventSource, Injector};
use crate::stocks::{StockMarket, Ticker};
use crate::types::Symbol;
use std::collections::HashMap;

/// The single mutable root of a run: every ticker, every trader, the clock,
/// market sentiment and the pending-event queue.
#[derive(Debug)]
pub struct SimulationState {
    pub clock: Clock,
    pub market: StockMarket,
    /// Indexed by `AgentId`; also the fixed order agents are queried in.
    pub traders: Vec<Trader>,
    /// Market-wide sentiment in [-1, 1].
    pub sentiment: f64,
    pub injector: Injector,
}

impl SimulationState {
    pub fn new(cfg: &SimulationConfig) -> Self {
        let mut state = Self {
            clock: Clock::new(cfg.market.opportunities_per_day),
            market: StockMarket::new(&[], 0.0),
            traders: Vec::new(),
            sentiment: 0.0,
            injector: Injector::new(),
        };
        state.reset(cfg);
        state
    }

    /// Rebuilds everything from `cfg`. The injector (and so every
    /// `ControlHandle` handed out) survives, emptied and re-seeded with the
    /// configured events.
    pub fn reset(&mut self, cfg: &SimulationConfig) {
        self.clock = Clock::new(cfg.market.opportunities_per_day);
        self.market = StockMarket::new(&cfg.stocks, cfg.market.baseline_volatility);
        self.traders = cfg
            .traders
            .iter()
            .enumerate()
            .map(|(id, t)| Trader::from_config(id, t, &self.market, cfg.seed))
            .collect();
        self.sentiment = 0.0;
        self.injector.clear();
        for e in &cfg.effects.scheduled {
            self.injector
                .push(e.at, e.kind, e.payload.clone(), EventSource::Scheduled);
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.market.symbols()
    }

    pub fn marks(&self) -> HashMap<Symbol, f64> {
        self.market.marks()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot::new(
            self.clock.now(),
            self.sentiment,
            self.market.iter().map(Ticker::quote).collect(),
        )
    }

    /// Checks the invariants every timestep must leave intact. Returns a
    /// description of the first violation.
    pub fn check_invariants(&self, previous_time: f64) -> Result<(), String> {
        let now = self.clock.now();
        if !(now > previous_time) {
            return Err(format!("clock went from {previous_time} to {now}"));
        }
        for t in self.market.iter() {
            if !(t.price().is_finite() && t.price() > 0.0) {
                return Err(format!("{} has price {}", t.symbol, t.price()));
            }
            if !(t.volatility.is_finite() && t.volatility >= 0.0) {
                return Err(format!("{} has volatility {}", t.symbol, t.volatility));
            }
        }
        for trader in &self.traders {
            let cash = trader.portfolio.cash();
            if !(cash.is_finite() && cash >= 0.0) {
                return Err(format!("trader {} has cash {}", trader.id, cash));
            }
        }
        if !(-1.0..=1.0).contains(&self.sentiment) {
            return Err(format!("sentiment {} out of range", self.sentiment));
        }
        Ok(())
    }
}
