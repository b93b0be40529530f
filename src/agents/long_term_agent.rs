// src/agents/long_term_agent.rs

use super::agent_trait::{Decision, DecisionContext};
use super::config::{
    LONG_TERM_DRAWDOWN, LONG_TERM_REBALANCE_TRIGGER, LONG_TERM_SIZE_MAX, LONG_TERM_SIZE_MIN,
    LONG_TERM_SLIPPAGE, LONG_TERM_TARGET_MAX, LONG_TERM_TARGET_MIN,
};
use crate::types::{Side, Symbol};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Buy-and-hold investor. Accumulates on deep drawdowns and only sells to
/// bring an overweight ticker back to its target allocation.
#[derive(Debug, Clone, Default)]
pub struct LongTermStrategy {
    /// Per-ticker target share of portfolio value, drawn on first sight.
    targets: BTreeMap<Symbol, f64>,
}

impl LongTermStrategy {
    pub fn target_allocation(&self, ticker: &str) -> Option<f64> {
        self.targets.get(ticker).copied()
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let target = *self
            .targets
            .entry(ctx.ticker.to_string())
            .or_insert_with(|| rng.gen_range(LONG_TERM_TARGET_MIN..=LONG_TERM_TARGET_MAX));

        let held = ctx.held();
        let allocation = ctx.exposure();
        if held > 0 && allocation > target * LONG_TERM_REBALANCE_TRIGGER {
            let excess = (allocation - target) * ctx.portfolio_value();
            let qty = ((excess / ctx.current_price).floor() as u64).min(held);
            return ctx.order(Side::Sell, qty, Some(LONG_TERM_SLIPPAGE));
        }

        let high = ctx.quote.high_water;
        if high > 0.0 && 1.0 - ctx.current_price / high >= LONG_TERM_DRAWDOWN {
            return ctx.buy_with_cash_fraction(
                rng,
                LONG_TERM_SIZE_MIN,
                LONG_TERM_SIZE_MAX,
                Some(LONG_TERM_SLIPPAGE),
            );
        }

        Decision::NoAction
    }
}
