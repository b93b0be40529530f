// src/effects/event.rs

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PositiveNews,
    NegativeNews,
    MarketRally,
    MarketCrash,
    VolatilitySpike,
    VolatilityCalm,
    SectorRotation,
    SentimentShift,
    Dividend,
    Correlation,
    /// Explicit shocks and deltas; nothing is drawn at random.
    Custom,
}

impl EventKind {
    /// Kinds the random generator picks from.
    pub const RANDOM: [EventKind; 10] = [
        EventKind::PositiveNews,
        EventKind::NegativeNews,
        EventKind::MarketRally,
        EventKind::MarketCrash,
        EventKind::VolatilitySpike,
        EventKind::VolatilityCalm,
        EventKind::SectorRotation,
        EventKind::SentimentShift,
        EventKind::Dividend,
        EventKind::Correlation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::PositiveNews => "positive_news",
            EventKind::NegativeNews => "negative_news",
            EventKind::MarketRally => "market_rally",
            EventKind::MarketCrash => "market_crash",
            EventKind::VolatilitySpike => "volatility_spike",
            EventKind::VolatilityCalm => "volatility_calm",
            EventKind::SectorRotation => "sector_rotation",
            EventKind::SentimentShift => "sentiment_shift",
            EventKind::Dividend => "dividend",
            EventKind::Correlation => "correlation",
            EventKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional parameters of an event. Anything left out is drawn when the
/// event is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    pub ticker: Option<Symbol>,
    pub tickers: Option<Vec<Symbol>>,
    /// Relative price move, e.g. `-0.10` for a 10% drop.
    pub magnitude: Option<f64>,
    /// Volatility added (spike), removed (calm) or shifted (custom).
    pub volatility: Option<f64>,
    /// New sentiment level, or the change to it for custom events.
    pub sentiment: Option<f64>,
    pub dividend_pct: Option<f64>,
    pub winners: Option<Vec<Symbol>>,
    pub losers: Option<Vec<Symbol>>,
    /// Per-ticker relative moves for custom events.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub shocks: BTreeMap<Symbol, f64>,
    pub description: Option<String>,
}

impl EventPayload {
    pub fn for_ticker(ticker: impl Into<Symbol>) -> Self {
        Self {
            ticker: Some(ticker.into()),
            ..Self::default()
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn with_dividend_pct(mut self, pct: f64) -> Self {
        self.dividend_pct = Some(pct);
        self
    }

    pub fn with_shock(mut self, ticker: impl Into<Symbol>, magnitude: f64) -> Self {
        self.shocks.insert(ticker.into(), magnitude);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the numeric fields that were given. Unset fields are drawn
    /// later from ranges that are always valid.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("magnitude", self.magnitude),
            ("volatility", self.volatility),
            ("sentiment", self.sentiment),
            ("dividend_pct", self.dividend_pct),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{name} must be finite, got {v}"));
                }
            }
        }
        if let Some(pct) = self.dividend_pct {
            if pct < 0.0 {
                return Err(format!("dividend_pct must be non-negative, got {pct}"));
            }
        }
        if let Some((ticker, m)) = self.shocks.iter().find(|(_, m)| !m.is_finite()) {
            return Err(format!("shock for {ticker} must be finite, got {m}"));
        }
        Ok(())
    }
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Scheduled,
    Triggered,
    Random,
}

/// A pending event. Lives in the injector queue until it is taken once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Insertion order; breaks ties between events due at the same time.
    pub seq: u64,
    /// Simulated time (days) the event becomes due.
    pub at: f64,
    pub kind: EventKind,
    pub payload: EventPayload,
    pub source: EventSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerShock {
    pub ticker: Symbol,
    pub magnitude: f64,
}

/// An event with every random parameter fixed. Applying the same effect to
/// the same state always gives the same result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum MarketEffect {
    PriceShock {
        shocks: Vec<TickerShock>,
    },
    Volatility {
        tickers: Vec<Symbol>,
        delta: f64,
    },
    Sentiment {
        value: f64,
    },
    Dividend {
        ticker: Symbol,
        pct: f64,
    },
    Custom {
        shocks: Vec<TickerShock>,
        volatility_delta: f64,
        sentiment_delta: f64,
    },
}

impl MarketEffect {
    /// Rejects effects that would poison prices, sentiment or cash. Shocks
    /// below -100% are allowed; the price floor absorbs them.
    pub fn validate(&self) -> Result<(), String> {
        let finite_shocks = |shocks: &[TickerShock]| match shocks
            .iter()
            .find(|s| !s.magnitude.is_finite())
        {
            Some(s) => Err(format!("shock for {} is {}", s.ticker, s.magnitude)),
            None => Ok(()),
        };
        match self {
            MarketEffect::PriceShock { shocks } => finite_shocks(shocks),
            MarketEffect::Volatility { delta, .. } if !delta.is_finite() => {
                Err(format!("volatility delta is {delta}"))
            }
            MarketEffect::Volatility { .. } => Ok(()),
            MarketEffect::Sentiment { value } if !value.is_finite() => {
                Err(format!("sentiment is {value}"))
            }
            MarketEffect::Sentiment { .. } => Ok(()),
            MarketEffect::Dividend { pct, .. } if !(pct.is_finite() && *pct >= 0.0) => {
                Err(format!("dividend pct is {pct}"))
            }
            MarketEffect::Dividend { .. } => Ok(()),
            MarketEffect::Custom {
                shocks,
                volatility_delta,
                sentiment_delta,
            } => {
                finite_shocks(shocks)?;
                if !(volatility_delta.is_finite() && sentiment_delta.is_finite()) {
                    return Err(format!(
                        "custom deltas are volatility {volatility_delta}, sentiment {sentiment_delta}"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// What the sink receives once an event has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedEvent {
    pub event: MarketEvent,
    pub effect: MarketEffect,
    pub description: String,
    pub affected: Vec<Symbol>,
    /// Simulated time the event was actually applied.
    pub applied_at: f64,
    /// Total cash credited to holders (dividends only).
    pub cash_paid: f64,
}
