// src/agents/trader.rs

use super::agent_trait::{Decision, DecisionContext, MarketSnapshot, Strategy};
use super::agent_type::AgentType;
use super::config::AGENT_SEED_SALT;
use super::portfolio::Portfolio;
use crate::config::TraderConfig;
use crate::stocks::StockMarket;
use crate::types::{AgentId, Fill};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One market participant: an account plus the strategy that trades it.
///
/// Each trader draws from its own RNG, seeded from the run seed and its id,
/// so adding or removing a trader never changes what the others do.
#[derive(Debug, Clone)]
pub struct Trader {
    pub id: AgentId,
    pub name: String,
    pub trade_probability: f64,
    pub portfolio: Portfolio,
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Trader {
    pub fn new(id: AgentId, kind: AgentType, capital: f64, seed: u64) -> Self {
        Self {
            id,
            name: kind.name().to_string(),
            trade_probability: kind.default_trade_probability(),
            portfolio: Portfolio::new(capital),
            strategy: Strategy::for_type(kind),
            rng: ChaCha8Rng::seed_from_u64(agent_seed(seed, id)),
        }
    }

    /// Builds a trader from configuration. Opening positions are booked at
    /// the market's initial prices.
    pub fn from_config(id: AgentId, cfg: &TraderConfig, market: &StockMarket, seed: u64) -> Self {
        let mut trader = Self::new(id, cfg.kind, cfg.initial_capital(), seed);
        trader.name = cfg.display_name();
        if let Some(p) = cfg.trade_probability {
            trader.trade_probability = p;
        }
        for (ticker, qty) in &cfg.holdings {
            if let Some(t) = market.get(ticker) {
                trader.portfolio.open_position(ticker.clone(), *qty, t.price());
            }
        }
        trader
    }

    pub fn agent_type(&self) -> AgentType {
        self.strategy.agent_type()
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Rolls the trade probability, then asks the strategy. `NoAction` is the
    /// usual answer.
    pub fn decide(&mut self, ticker: &str, current_price: f64, snapshot: &MarketSnapshot) -> Decision {
        if !self.rng.gen_bool(self.trade_probability.clamp(0.0, 1.0)) {
            return Decision::NoAction;
        }
        let Some(quote) = snapshot.quote(ticker) else {
            return Decision::NoAction;
        };
        let ctx = DecisionContext {
            agent_id: self.id,
            ticker,
            current_price,
            quote,
            snapshot,
            portfolio: &self.portfolio,
        };
        self.strategy.decide(&ctx, &mut self.rng)
    }

    pub fn apply_fill(&mut self, fill: &Fill) {
        self.portfolio.apply_fill(fill);
    }
}

fn agent_seed(seed: u64, id: AgentId) -> u64 {
    seed ^ (id as u64 + 1).wrapping_mul(AGENT_SEED_SALT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stocks::{default_stock_universe, Ticker};

    fn market() -> StockMarket {
        StockMarket::new(&default_stock_universe(), 0.02)
    }

    fn snapshot(market: &StockMarket) -> MarketSnapshot {
        MarketSnapshot::new(0.25, 0.0, market.iter().map(Ticker::quote).collect())
    }

    #[test]
    fn config_overrides_defaults() {
        // Arrange
        let m = market();
        let cfg = TraderConfig::new(AgentType::LongTerm)
            .with_capital(1_000.0)
            .with_trade_probability(0.9)
            .with_holding("AAPL", 5);

        // Act
        let t = Trader::from_config(7, &cfg, &m, 42);

        // Assert
        assert_eq!(t.id, 7);
        assert_eq!(t.name, "LongTerm");
        assert_eq!(t.agent_type(), AgentType::LongTerm);
        assert_eq!(t.trade_probability, 0.9);
        assert_eq!(t.portfolio.cash(), 1_000.0);
        assert_eq!(t.portfolio.holding("AAPL"), 5);
        assert_eq!(t.portfolio.cost_basis("AAPL"), Some(270.0));
    }

    #[test]
    fn zero_probability_never_acts() {
        let m = market();
        let snap = snapshot(&m);
        let mut t = Trader::new(0, AgentType::LossMaker, 500_000.0, 1);
        t.trade_probability = 0.0;
        for _ in 0..100 {
            assert_eq!(t.decide("AAPL", 270.0, &snap), Decision::NoAction);
        }
    }

    #[test]
    fn same_seed_same_decisions() {
        let m = market();
        let snap = snapshot(&m);
        let run = || {
            let mut t = Trader::new(2, AgentType::LossMaker, 500_000.0, 42);
            (0..50).map(|_| t.decide("AAPL", 270.0, &snap)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn traders_get_distinct_streams() {
        assert_ne!(agent_seed(42, 0), agent_seed(42, 1));
        assert_ne!(agent_seed(42, 0), agent_seed(43, 0));
    }
}
