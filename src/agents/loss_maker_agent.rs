// src/agents/loss_maker_agent.rs

use super::agent_trait::{Decision, DecisionContext};
use super::config::{
    LOSS_MAKER_CHASE, LOSS_MAKER_IMPULSE_PROB, LOSS_MAKER_PANIC, LOSS_MAKER_PANIC_SELL_MAX,
    LOSS_MAKER_PANIC_SELL_MIN, LOSS_MAKER_SIZE_MAX, LOSS_MAKER_SIZE_MIN,
    LOSS_MAKER_VOLATILITY_TRADE_PROB, LOSS_MAKER_VOLATILITY_TRIGGER, LOSS_MAKER_WINNER_MAX_GAIN,
    LOSS_MAKER_WINNER_MIN_GAIN, LOSS_MAKER_WINNER_SELL_MAX, LOSS_MAKER_WINNER_SELL_MIN,
    LOSS_MAKER_WINNER_SELL_PROB,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Emotional trader. Buys after spikes, dumps after drops, sells winners
/// too early and rides losers down. Every order is a market order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LossMakerStrategy;

impl LossMakerStrategy {
    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let last_move = ctx.quote.price_change_pct;
        let held = ctx.held();

        if last_move > LOSS_MAKER_CHASE {
            return self.buy(ctx, rng);
        }

        if last_move < LOSS_MAKER_PANIC && held > 0 {
            return ctx.sell_held_fraction(
                rng,
                LOSS_MAKER_PANIC_SELL_MIN,
                LOSS_MAKER_PANIC_SELL_MAX,
                None,
            );
        }

        // Small winners get cashed in; losers are never sold on cost grounds.
        if let Some(gain) = ctx.position_gain() {
            if (LOSS_MAKER_WINNER_MIN_GAIN..=LOSS_MAKER_WINNER_MAX_GAIN).contains(&gain)
                && rng.gen_bool(LOSS_MAKER_WINNER_SELL_PROB)
            {
                return ctx.sell_held_fraction(
                    rng,
                    LOSS_MAKER_WINNER_SELL_MIN,
                    LOSS_MAKER_WINNER_SELL_MAX,
                    None,
                );
            }
        }

        if rng.gen_bool(LOSS_MAKER_IMPULSE_PROB) {
            return self.buy(ctx, rng);
        }

        if ctx.quote.realized_volatility > LOSS_MAKER_VOLATILITY_TRIGGER
            && rng.gen_bool(LOSS_MAKER_VOLATILITY_TRADE_PROB)
        {
            if held > 0 && rng.gen_bool(0.5) {
                return ctx.sell_held_fraction(rng, LOSS_MAKER_SIZE_MIN, LOSS_MAKER_SIZE_MAX, None);
            }
            return self.buy(ctx, rng);
        }

        Decision::NoAction
    }

    fn buy(&self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        ctx.buy_with_cash_fraction(rng, LOSS_MAKER_SIZE_MIN, LOSS_MAKER_SIZE_MAX, None)
    }
}
