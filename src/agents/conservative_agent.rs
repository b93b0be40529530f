// src/agents/conservative_agent.rs

use super::agent_trait::{fraction_of, Decision, DecisionContext};
use super::config::{
    CONSERVATIVE_DIP, CONSERVATIVE_EXPOSURE_CUT, CONSERVATIVE_MAX_EXPOSURE,
    CONSERVATIVE_PEAK_BAND, CONSERVATIVE_PEAK_SELL_MAX, CONSERVATIVE_PEAK_SELL_MIN,
    CONSERVATIVE_SIZE_MAX, CONSERVATIVE_SIZE_MIN, CONSERVATIVE_SLIPPAGE,
};
use crate::types::Side;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Value buyer: buys dips below the rolling fair value, trims near the local
/// peak and never lets one ticker dominate the book.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativeStrategy;

impl ConservativeStrategy {
    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let held = ctx.held();
        let price = ctx.current_price;

        if held > 0 && ctx.exposure() > CONSERVATIVE_MAX_EXPOSURE {
            let qty = fraction_of(held, CONSERVATIVE_EXPOSURE_CUT);
            return ctx.order(Side::Sell, qty, None);
        }

        if price < ctx.quote.fair_value * (1.0 - CONSERVATIVE_DIP) {
            let value = ctx.portfolio_value();
            let room = CONSERVATIVE_MAX_EXPOSURE * value - held as f64 * price;
            let budget =
                (ctx.portfolio.cash() * rng.gen_range(CONSERVATIVE_SIZE_MIN..CONSERVATIVE_SIZE_MAX))
                    .min(room);
            return ctx.buy_with_budget(budget, Some(CONSERVATIVE_SLIPPAGE));
        }

        let near_peak = price >= ctx.quote.local_peak * (1.0 - CONSERVATIVE_PEAK_BAND);
        let in_profit = matches!(ctx.position_gain(), Some(g) if g > 0.0);
        if held > 0 && near_peak && in_profit {
            return ctx.sell_held_fraction(
                rng,
                CONSERVATIVE_PEAK_SELL_MIN,
                CONSERVATIVE_PEAK_SELL_MAX,
                Some(CONSERVATIVE_SLIPPAGE),
            );
        }

        Decision::NoAction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::agent_trait::test_support::{snapshot_of, ticker_with_path};
    use crate::agents::portfolio::Portfolio;
    use crate::types::OrderType;
    use rand::SeedableRng;

    fn decide(path: &[f64], portfolio: &Portfolio) -> Decision {
        let t = ticker_with_path(path);
        let snap = snapshot_of(&t, 3.0);
        let ctx = DecisionContext {
            agent_id: 1,
            ticker: "AAPL",
            current_price: t.price(),
            quote: &snap.quotes[0],
            snapshot: &snap,
            portfolio,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        ConservativeStrategy.decide(&ctx, &mut rng)
    }

    #[test]
    fn buys_the_dip() {
        // Arrange: mean of the window is ~100, price is 95
        let portfolio = Portfolio::new(2_000_000.0);

        // Act
        let d = decide(&[100.0, 101.0, 102.0, 99.0, 95.0], &portfolio);

        // Assert
        let order = d.order().expect("should buy");
        assert_eq!(order.side, Side::Buy);
        // 2-5% of 2M at $95
        assert!((421..=1053).contains(&order.quantity), "qty {}", order.quantity);
    }

    #[test]
    fn dip_buy_respects_exposure_cap() {
        // 29% already in AAPL: only ~1% of value is left under the cap.
        let portfolio = Portfolio::new(71_000.0).with_position("AAPL", 290, 100.0);
        let d = decide(&[100.0, 101.0, 102.0, 100.0], &portfolio);
        assert_eq!(d, Decision::NoAction, "price is not far enough below fair value");

        let d = decide(&[104.0, 104.0, 104.0, 100.0], &portfolio);
        let order = d.order().expect("room for a small buy");
        let value_after = (290 + order.quantity) as f64 * 100.0;
        assert!(value_after <= 0.30 * 100_000.0 + 1e-6);
    }

    #[test]
    fn cuts_oversized_position_at_market() {
        let portfolio = Portfolio::new(10_000.0).with_position("AAPL", 1_000, 100.0);
        let d = decide(&[100.0], &portfolio);
        let order = d.order().expect("should cut");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.quantity, 200);
        assert_eq!(order.order_type, OrderType::Market);
    }

    #[test]
    fn trims_near_the_peak_only_in_profit() {
        let winning = Portfolio::new(1_000_000.0).with_position("AAPL", 100, 90.0);
        let d = decide(&[100.0, 100.0, 100.0], &winning);
        let order = d.order().expect("should trim");
        assert_eq!(order.side, Side::Sell);
        assert!((10..=25).contains(&order.quantity));

        let losing = Portfolio::new(1_000_000.0).with_position("AAPL", 100, 110.0);
        assert_eq!(decide(&[100.0, 100.0, 100.0], &losing), Decision::NoAction);
    }
}
