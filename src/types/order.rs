// src/types/order.rs

use serde::{Deserialize, Serialize};

/// Ticker symbol, e.g. "AAPL".
pub type Symbol = String;

/// Index of a trader in the scheduler's fixed iteration order.
pub type AgentId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells. Used as the direction of price impact.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

/// How an order is allowed to execute. A limit price only exists on `Limit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit { price: f64 },
}

impl OrderType {
    pub fn limit_price(&self) -> Option<f64> {
        match self {
            OrderType::Market => None,
            OrderType::Limit { price } => Some(*price),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit { .. } => "limit",
        }
    }
}

/// An instruction produced by a strategy and consumed by the matching engine
/// within the same timestep. Never rests anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub agent_id: AgentId,
    pub ticker: Symbol,
    pub side: Side,
    pub quantity: u64,
    pub order_type: OrderType,
}

impl Order {
    pub fn market(agent_id: AgentId, ticker: impl Into<Symbol>, side: Side, quantity: u64) -> Self {
        Self {
            agent_id,
            ticker: ticker.into(),
            side,
            quantity,
            order_type: OrderType::Market,
        }
    }

    pub fn limit(
        agent_id: AgentId,
        ticker: impl Into<Symbol>,
        side: Side,
        quantity: u64,
        price: f64,
    ) -> Self {
        Self {
            agent_id,
            ticker: ticker.into(),
            side,
            quantity,
            order_type: OrderType::Limit { price },
        }
    }
}

/// The immutable record of one executed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Global execution sequence, strictly increasing over a run.
    pub seq: u64,
    pub ticker: Symbol,
    pub agent_id: AgentId,
    pub side: Side,
    pub quantity: u64,
    pub order_type: OrderType,
    /// Price the order executed at (before its own impact).
    pub price: f64,
    /// Ticker price after the trade's impact was applied.
    pub price_after: f64,
    /// Simulated time in days.
    pub timestamp: f64,
    /// Signed change to the agent's cash (negative on buys).
    pub cash_delta: f64,
    /// Signed change to the agent's holdings of `ticker`.
    pub holdings_delta: i64,
}

impl Fill {
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}
