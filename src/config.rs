// src/config.rs

//! Run configuration.
//!
//! Everything here is injected at construction and stays fixed for the run.
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 7
//! days = 30
//!
//! [market]
//! price_impact_factor = 0.05
//!
//! [[effects.scheduled]]
//! at = 10.0
//! kind = "market_crash"
//! payload = { magnitude = -0.10 }
//! ```

use crate::agents::AgentType;
use crate::effects::{EventKind, EventPayload};
use crate::error::ConfigError;
use crate::stocks::{default_stock_universe, Stock};
use crate::types::Symbol;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Trading opportunities (timesteps) per simulated day.
    pub opportunities_per_day: u32,
    /// Scale of a trade's relative price impact.
    pub price_impact_factor: f64,
    /// Level volatility decays back towards.
    pub baseline_volatility: f64,
    /// Fraction of the excess over baseline kept each timestep.
    pub volatility_decay: f64,
    /// Per-timestep drift per unit of sentiment.
    pub sentiment_drift: f64,
    /// Simulated days for sentiment to halve. Zero disables decay.
    pub sentiment_half_life_days: f64,
    /// Per-day sigma of the random diffusion term. Zero disables it.
    pub diffusion_volatility: f64,
    /// Cap on the relative move caused by a single trade. Zero disables the cap.
    pub max_trade_move: f64,
    /// Fraction of the previous price used when a move would go non-positive.
    pub price_floor_ratio: f64,
    /// Halt a ticker for the rest of the day once it is this far from its
    /// opening price. `None` disables the breaker.
    pub circuit_breaker_pct: Option<f64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            opportunities_per_day: 4,
            price_impact_factor: 0.1,
            baseline_volatility: 0.02,
            volatility_decay: 0.9,
            sentiment_drift: 0.001,
            sentiment_half_life_days: 2.0,
            diffusion_volatility: 0.0,
            max_trade_move: 0.10,
            price_floor_ratio: 0.01,
            circuit_breaker_pct: None,
        }
    }
}

/// An event declared up front, applied once the clock reaches `at`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledEvent {
    pub at: f64,
    pub kind: EventKind,
    #[serde(default)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub random_events: bool,
    /// Chance per timestep of a randomly generated event.
    pub random_event_probability: f64,
    pub scheduled: Vec<ScheduledEvent>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            random_events: true,
            random_event_probability: 0.01,
            scheduled: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraderConfig {
    pub kind: AgentType,
    /// Display name; defaults to the strategy name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capital: Option<f64>,
    /// Overrides the strategy's default trade probability.
    #[serde(default)]
    pub trade_probability: Option<f64>,
    #[serde(default)]
    pub holdings: BTreeMap<Symbol, u64>,
}

impl TraderConfig {
    pub fn new(kind: AgentType) -> Self {
        Self {
            kind,
            name: None,
            capital: None,
            trade_probability: None,
            holdings: BTreeMap::new(),
        }
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.capital = Some(capital);
        self
    }

    pub fn with_trade_probability(mut self, p: f64) -> Self {
        self.trade_probability = Some(p);
        self
    }

    pub fn with_holding(mut self, ticker: impl Into<Symbol>, quantity: u64) -> Self {
        self.holdings.insert(ticker.into(), quantity);
        self
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.name().to_string())
    }

    pub fn initial_capital(&self) -> f64 {
        self.capital.unwrap_or_else(|| self.kind.default_capital())
    }
}

fn default_traders() -> Vec<TraderConfig> {
    AgentType::ALL.iter().map(|k| TraderConfig::new(*k)).collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random stream in the run.
    pub seed: u64,
    /// Days to run when `run` is called without an explicit count.
    pub days: Option<u32>,
    pub market: MarketConfig,
    pub effects: EffectsConfig,
    pub stocks: Vec<Stock>,
    pub traders: Vec<TraderConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            days: Some(100),
            market: MarketConfig::default(),
            effects: EffectsConfig::default(),
            stocks: default_stock_universe(),
            traders: default_traders(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Length of one timestep in days.
    pub fn step_days(&self) -> f64 {
        1.0 / self.market.opportunities_per_day as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.market;
        if m.opportunities_per_day == 0 {
            return Err(invalid("opportunities_per_day must be at least 1"));
        }
        if !(m.price_impact_factor.is_finite() && m.price_impact_factor >= 0.0) {
            return Err(invalid("price_impact_factor must be non-negative"));
        }
        if !(m.baseline_volatility.is_finite() && m.baseline_volatility >= 0.0) {
            return Err(invalid("baseline_volatility must be non-negative"));
        }
        if !m.sentiment_drift.is_finite() {
            return Err(invalid("sentiment_drift must be finite"));
        }
        if !(0.0..=1.0).contains(&m.volatility_decay) {
            return Err(invalid("volatility_decay must be within [0, 1]"));
        }
        if !(m.price_floor_ratio > 0.0 && m.price_floor_ratio < 1.0) {
            return Err(invalid("price_floor_ratio must be within (0, 1)"));
        }
        if m.max_trade_move < 0.0 || m.diffusion_volatility < 0.0 || m.sentiment_half_life_days < 0.0 {
            return Err(invalid("max_trade_move, diffusion_volatility and sentiment_half_life_days must be non-negative"));
        }
        if let Some(pct) = m.circuit_breaker_pct {
            if pct <= 0.0 {
                return Err(invalid("circuit_breaker_pct must be positive"));
            }
        }
        if !(0.0..=1.0).contains(&self.effects.random_event_probability) {
            return Err(invalid("random_event_probability must be within [0, 1]"));
        }
        if self.stocks.is_empty() {
            return Err(invalid("at least one stock is required"));
        }
        let mut seen = HashSet::new();
        for s in &self.stocks {
            if !seen.insert(s.ticker.as_str()) {
                return Err(invalid(&format!("duplicate ticker {}", s.ticker)));
            }
            if !(s.initial_price.is_finite() && s.initial_price > 0.0) {
                return Err(invalid(&format!("{} needs a positive initial price", s.ticker)));
            }
            if s.shares_outstanding == 0 {
                return Err(invalid(&format!("{} needs shares outstanding", s.ticker)));
            }
        }
        for t in &self.traders {
            let capital = t.initial_capital();
            if !(capital.is_finite() && capital >= 0.0) {
                return Err(invalid(&format!("{} has negative capital", t.display_name())));
            }
            if let Some(p) = t.trade_probability {
                if !(0.0..=1.0).contains(&p) {
                    return Err(invalid(&format!("{} trade probability outside [0, 1]", t.display_name())));
                }
            }
            if let Some(unknown) = t.holdings.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(invalid(&format!("{} holds unknown ticker {}", t.display_name(), unknown)));
            }
        }
        for e in &self.effects.scheduled {
            if !(e.at.is_finite() && e.at >= 0.0) {
                return Err(invalid("scheduled events need a non-negative time"));
            }
            e.payload
                .validate()
                .map_err(|reason| invalid(&format!("scheduled {} at {}: {reason}", e.kind, e.at)))?;
            if let Some(v) = e.payload.sentiment {
                if !(-1.0..=1.0).contains(&v) {
                    return Err(invalid(&format!("scheduled {} at {}: sentiment outside [-1, 1]", e.kind, e.at)));
                }
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}
