// src/agents/aggressive_agent.rs

use super::agent_trait::{Decision, DecisionContext};
use super::config::{
    AGGRESSIVE_MOMENTUM_BUY, AGGRESSIVE_MOMENTUM_SELL, AGGRESSIVE_OPENING_BUY_PROB,
    AGGRESSIVE_SIZE_MAX, AGGRESSIVE_SIZE_MIN, AGGRESSIVE_SLIPPAGE, AGGRESSIVE_TAKE_PROFIT,
    AGGRESSIVE_TAKE_PROFIT_SELL_MAX, AGGRESSIVE_TAKE_PROFIT_SELL_MIN,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Trend follower: rides short-window momentum and banks profits early.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressiveStrategy;

impl AggressiveStrategy {
    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        // Take-profit wins over everything else.
        if let Some(gain) = ctx.position_gain() {
            if gain >= AGGRESSIVE_TAKE_PROFIT {
                return ctx.sell_held_fraction(
                    rng,
                    AGGRESSIVE_TAKE_PROFIT_SELL_MIN,
                    AGGRESSIVE_TAKE_PROFIT_SELL_MAX,
                    None,
                );
            }
        }

        if ctx.snapshot.is_first_day() && rng.gen_bool(AGGRESSIVE_OPENING_BUY_PROB) {
            return ctx.buy_with_cash_fraction(
                rng,
                AGGRESSIVE_SIZE_MIN,
                AGGRESSIVE_SIZE_MAX,
                Some(AGGRESSIVE_SLIPPAGE),
            );
        }

        let momentum = ctx.quote.momentum;
        if momentum > AGGRESSIVE_MOMENTUM_BUY {
            ctx.buy_with_cash_fraction(
                rng,
                AGGRESSIVE_SIZE_MIN,
                AGGRESSIVE_SIZE_MAX,
                Some(AGGRESSIVE_SLIPPAGE),
            )
        } else if momentum < AGGRESSIVE_MOMENTUM_SELL && ctx.held() > 0 {
            ctx.sell_held_fraction(
                rng,
                AGGRESSIVE_SIZE_MIN,
                AGGRESSIVE_SIZE_MAX,
                Some(AGGRESSIVE_SLIPPAGE),
            )
        } else {
            Decision::NoAction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::agent_trait::test_support::{snapshot_of, ticker_with_path};
    use crate::agents::portfolio::Portfolio;
    use crate::types::{OrderType, Side};
    use rand::SeedableRng;

    fn decide(path: &[f64], portfolio: &Portfolio, timestamp: f64, seed: u64) -> Decision {
        let t = ticker_with_path(path);
        let snap = snapshot_of(&t, timestamp);
        let ctx = DecisionContext {
            agent_id: 0,
            ticker: "AAPL",
            current_price: t.price(),
            quote: &snap.quotes[0],
            snapshot: &snap,
            portfolio,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        AggressiveStrategy.decide(&ctx, &mut rng)
    }

    #[test]
    fn buys_on_positive_momentum() {
        // Arrange
        let portfolio = Portfolio::new(1_000_000.0);

        // Act: past the first day, price up 2%
        let decision = decide(&[100.0, 101.0, 102.0], &portfolio, 3.0, 1);

        // Assert
        let order = decision.order().expect("should buy");
        assert_eq!(order.side, Side::Buy);
        // 5-10% of cash at ~$102
        assert!((490..=981).contains(&order.quantity), "qty {}", order.quantity);
        assert!(order.order_type.limit_price().unwrap() >= 102.0);
    }

    #[test]
    fn sells_part_of_position_on_negative_momentum() {
        let portfolio = Portfolio::new(0.0).with_position("AAPL", 1_000, 100.0);
        let decision = decide(&[100.0, 99.0, 99.5], &portfolio, 3.0, 1);
        let order = decision.order().expect("should sell");
        assert_eq!(order.side, Side::Sell);
        assert!((50..=100).contains(&order.quantity), "qty {}", order.quantity);
    }

    #[test]
    fn take_profit_sells_at_market_first() {
        let portfolio = Portfolio::new(1_000_000.0).with_position("AAPL", 1_000, 100.0);
        // Strong upward momentum would also trigger a buy.
        let decision = decide(&[100.0, 106.0], &portfolio, 3.0, 1);
        let order = decision.order().expect("should take profit");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.order_type, OrderType::Market);
        assert!((200..=400).contains(&order.quantity));
    }

    #[test]
    fn flat_market_after_day_one_does_nothing() {
        let portfolio = Portfolio::new(1_000_000.0);
        for seed in 0..20 {
            assert_eq!(decide(&[100.0, 100.0], &portfolio, 3.0, seed), Decision::NoAction);
        }
    }

    #[test]
    fn no_sell_without_a_position() {
        let portfolio = Portfolio::new(1_000_000.0);
        for seed in 0..20 {
            let d = decide(&[100.0, 95.0], &portfolio, 3.0, seed);
            assert_eq!(d, Decision::NoAction);
        }
    }
}
