// src/agents/agent_trait.rs

use super::agent_type::AgentType;
use super::aggressive_agent::AggressiveStrategy;
use super::conservative_agent::ConservativeStrategy;
use super::long_term_agent::LongTermStrategy;
use super::loss_maker_agent::LossMakerStrategy;
use super::portfolio::Portfolio;
use crate::stocks::Quote;
use crate::types::{AgentId, Order, Side, Symbol};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// A read-only snapshot of the market given to an agent for decision-making.
///
/// Rebuilt before every decision so a strategy sees the impact of orders
/// executed earlier in the same timestep.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    /// Simulated time in days.
    pub timestamp: f64,
    pub sentiment: f64,
    pub quotes: Vec<Quote>,
    marks: HashMap<Symbol, f64>,
}

impl MarketSnapshot {
    pub fn new(timestamp: f64, sentiment: f64, quotes: Vec<Quote>) -> Self {
        let marks = quotes.iter().map(|q| (q.symbol.clone(), q.price)).collect();
        Self {
            timestamp,
            sentiment,
            quotes,
            marks,
        }
    }

    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }

    /// Current price per symbol.
    pub fn marks(&self) -> &HashMap<Symbol, f64> {
        &self.marks
    }

    /// True until the first day boundary has been crossed.
    pub fn is_first_day(&self) -> bool {
        self.timestamp <= 1.0
    }
}

/// What a strategy wants to do with one (ticker, timestep) opportunity.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Trade(Order),
    NoAction,
}

impl Decision {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Decision::Trade(order) => Some(order),
            Decision::NoAction => None,
        }
    }
}

/// Everything a strategy may look at when deciding.
pub struct DecisionContext<'a> {
    pub agent_id: AgentId,
    pub ticker: &'a str,
    pub current_price: f64,
    pub quote: &'a Quote,
    pub snapshot: &'a MarketSnapshot,
    pub portfolio: &'a Portfolio,
}

impl DecisionContext<'_> {
    pub fn held(&self) -> u64 {
        self.portfolio.holding(self.ticker)
    }

    /// Unrealised gain on the position relative to its cost basis.
    pub fn position_gain(&self) -> Option<f64> {
        match self.portfolio.cost_basis(self.ticker) {
            Some(basis) if basis > 0.0 && self.held() > 0 => Some(self.current_price / basis - 1.0),
            _ => None,
        }
    }

    pub fn portfolio_value(&self) -> f64 {
        self.portfolio.portfolio_value(self.snapshot.marks())
    }

    /// Share of portfolio value sitting in this ticker.
    pub fn exposure(&self) -> f64 {
        let value = self.portfolio_value();
        if value <= 0.0 {
            return 0.0;
        }
        self.held() as f64 * self.current_price / value
    }

    /// Buys with a fraction of cash drawn from `[min, max)`.
    pub fn buy_with_cash_fraction(
        &self,
        rng: &mut ChaCha8Rng,
        min: f64,
        max: f64,
        slippage: Option<f64>,
    ) -> Decision {
        let budget = self.portfolio.cash() * rng.gen_range(min..max);
        self.buy_with_budget(budget, slippage)
    }

    /// Buys as many whole shares as `budget` covers at the current price.
    pub fn buy_with_budget(&self, budget: f64, slippage: Option<f64>) -> Decision {
        let qty = shares_for_budget(budget, self.current_price);
        self.order(Side::Buy, qty, slippage)
    }

    /// Sells a fraction of the position drawn from `[min, max)`, at least one
    /// share when anything is held.
    pub fn sell_held_fraction(
        &self,
        rng: &mut ChaCha8Rng,
        min: f64,
        max: f64,
        slippage: Option<f64>,
    ) -> Decision {
        let held = self.held();
        let qty = fraction_of(held, rng.gen_range(min..max));
        self.order(Side::Sell, qty, slippage)
    }

    /// Market order when `slippage` is `None`, otherwise a limit on the
    /// marketable side of the current price.
    pub fn order(&self, side: Side, qty: u64, slippage: Option<f64>) -> Decision {
        if qty == 0 {
            return Decision::NoAction;
        }
        let order = match slippage {
            None => Order::market(self.agent_id, self.ticker, side, qty),
            Some(s) => {
                let limit = match side {
                    Side::Buy => self.current_price * (1.0 + s),
                    Side::Sell => self.current_price * (1.0 - s),
                };
                Order::limit(self.agent_id, self.ticker, side, qty, limit)
            }
        };
        Decision::Trade(order)
    }
}

/// Whole shares affordable with `budget`.
pub fn shares_for_budget(budget: f64, price: f64) -> u64 {
    if !(budget > 0.0 && price > 0.0) {
        return 0;
    }
    (budget / price).floor() as u64
}

/// `fraction` of `held`, rounded down but never below one share of a
/// non-empty position.
pub fn fraction_of(held: u64, fraction: f64) -> u64 {
    if held == 0 {
        return 0;
    }
    ((held as f64 * fraction).floor() as u64).clamp(1, held)
}

/// The closed set of built-in strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    Aggressive(AggressiveStrategy),
    Conservative(ConservativeStrategy),
    LossMaker(LossMakerStrategy),
    LongTerm(LongTermStrategy),
}

impl Strategy {
    pub fn for_type(kind: AgentType) -> Self {
        match kind {
            AgentType::Aggressive => Strategy::Aggressive(AggressiveStrategy),
            AgentType::Conservative => Strategy::Conservative(ConservativeStrategy),
            AgentType::LossMaker => Strategy::LossMaker(LossMakerStrategy),
            AgentType::LongTerm => Strategy::LongTerm(LongTermStrategy::default()),
        }
    }

    pub fn agent_type(&self) -> AgentType {
        match self {
            Strategy::Aggressive(_) => AgentType::Aggressive,
            Strategy::Conservative(_) => AgentType::Conservative,
            Strategy::LossMaker(_) => AgentType::LossMaker,
            Strategy::LongTerm(_) => AgentType::LongTerm,
        }
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        match self {
            Strategy::Aggressive(s) => s.decide(ctx, rng),
            Strategy::Conservative(s) => s.decide(ctx, rng),
            Strategy::LossMaker(s) => s.decide(ctx, rng),
            Strategy::LongTerm(s) => s.decide(ctx, rng),
        }
    }
}
