// src/error.rs

//! Error taxonomy for the engine.
//!
//! Order-level problems are values (`Rejection`) returned from the matching
//! engine and counted by the scheduler. Only `SimError` aborts a run.

use crate::types::{AgentId, Symbol};
use serde::Serialize;
use thiserror::Error;

/// A malformed order. Detected before anything is touched.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("order quantity must be positive")]
    NonPositiveQuantity,

    #[error("limit price must be finite and positive, got {0}")]
    InvalidLimitPrice(f64),

    #[error("unknown ticker: {0}")]
    UnknownTicker(Symbol),

    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),
}

/// Why the matching engine refused an order. Agent and ticker state are
/// unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum Rejection {
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationError),

    #[error("insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("insufficient holdings: requested {requested}, held {held}")]
    InsufficientHoldings { requested: u64, held: u64 },

    #[error("limit {limit:.4} not satisfiable at price {price:.4}")]
    LimitNotSatisfiable { limit: f64, price: f64 },

    #[error("trading halted on {0}")]
    TradingHalted(Symbol),
}

impl Rejection {
    /// Stable short name used as a counter key.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Validation(_) => "validation",
            Rejection::InsufficientFunds { .. } => "insufficient_funds",
            Rejection::InsufficientHoldings { .. } => "insufficient_holdings",
            Rejection::LimitNotSatisfiable { .. } => "limit_not_satisfiable",
            Rejection::TradingHalted(_) => "trading_halted",
        }
    }
}

/// Problems loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invariant violated at t={timestamp:.4}: {message}")]
    Fatal { timestamp: f64, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, SimError>;
