// src/pricing/impact.rs

use crate::config::MarketConfig;
use crate::stocks::Ticker;
use crate::types::Side;
use rand::Rng;
use rand::distributions::Distribution;
use rand_distr::StandardNormal;
use tracing::{trace, warn};

/// Outcome of one price move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceUpdate {
    pub old_price: f64,
    pub new_price: f64,
    /// The candidate price was non-positive and got clamped to the floor.
    pub floored: bool,
    /// This move tripped the circuit breaker.
    pub halted: bool,
}

/// Maps trades, shocks and the passage of time onto ticker prices.
///
/// Stateless apart from its parameters: every function mutates only the
/// `Ticker` it is handed.
#[derive(Debug, Clone)]
pub struct PricingModel {
    impact_factor: f64,
    baseline_volatility: f64,
    volatility_decay: f64,
    sentiment_drift: f64,
    sentiment_decay: f64,
    diffusion_volatility: f64,
    dt: f64,
    max_trade_move: f64,
    floor_ratio: f64,
    circuit_breaker_pct: Option<f64>,
}

impl PricingModel {
    pub fn new(cfg: &MarketConfig) -> Self {
        let dt = 1.0 / cfg.opportunities_per_day.max(1) as f64;
        // at t = half_life → s_new = s_old * 2^(-1)
        let sentiment_decay = if cfg.sentiment_half_life_days > 0.0 {
            2f64.powf(-dt / cfg.sentiment_half_life_days)
        } else {
            1.0
        };
        Self {
            impact_factor: cfg.price_impact_factor,
            baseline_volatility: cfg.baseline_volatility,
            volatility_decay: cfg.volatility_decay,
            sentiment_drift: cfg.sentiment_drift,
            sentiment_decay,
            diffusion_volatility: cfg.diffusion_volatility,
            dt,
            max_trade_move: cfg.max_trade_move,
            floor_ratio: cfg.price_floor_ratio,
            circuit_breaker_pct: cfg.circuit_breaker_pct,
        }
    }

    /// Trade size relative to the ticker's typical volume.
    #[inline]
    pub fn participation_ratio(&self, ticker: &Ticker, trade_qty: u64) -> f64 {
        trade_qty as f64 / ticker.typical_volume as f64
    }

    /// Relative move caused by one trade, before the per-trade cap.
    #[inline]
    pub fn impact(&self, side: Side, participation_ratio: f64, volatility: f64) -> f64 {
        self.impact_factor * side.sign() * participation_ratio * (1.0 + volatility)
    }

    /// Moves `ticker` in the direction of a trade and returns the new price.
    pub fn update_price(
        &self,
        ticker: &mut Ticker,
        trade_qty: u64,
        trade_side: Side,
        participation_ratio: f64,
    ) -> PriceUpdate {
        let mut delta = self.impact(trade_side, participation_ratio, ticker.volatility);
        if self.max_trade_move > 0.0 {
            delta = delta.clamp(-self.max_trade_move, self.max_trade_move);
        }
        trace!(
            ticker = %ticker.symbol,
            qty = trade_qty,
            side = ?trade_side,
            participation_ratio,
            delta,
            "trade impact"
        );
        let candidate = ticker.price() * (1.0 + delta);
        self.commit(ticker, candidate)
    }

    /// Multiplies the price by `1 + magnitude`. Used by market effects.
    pub fn apply_shock(&self, ticker: &mut Ticker, magnitude: f64) -> PriceUpdate {
        let candidate = ticker.price() * (1.0 + magnitude);
        self.commit(ticker, candidate)
    }

    /// Per-timestep housekeeping for one ticker: volatility decays toward the
    /// baseline, sentiment pushes the drift, and the optional diffusion term
    /// adds a log-normal shock.
    pub fn begin_timestep<R: Rng + ?Sized>(
        &self,
        ticker: &mut Ticker,
        sentiment: f64,
        rng: &mut R,
    ) -> Option<PriceUpdate> {
        ticker.volatility = self.baseline_volatility
            + (ticker.volatility - self.baseline_volatility) * self.volatility_decay;
        if ticker.volatility < 0.0 {
            ticker.volatility = 0.0;
        }

        let mut factor = 1.0 + sentiment * self.sentiment_drift;
        if self.diffusion_volatility > 0.0 {
            let sigma = self.diffusion_volatility;
            let z: f64 = StandardNormal.sample(rng);
            factor *= (-0.5 * sigma.powi(2) * self.dt + sigma * self.dt.sqrt() * z).exp();
        }
        if factor == 1.0 {
            return None;
        }
        let candidate = ticker.price() * factor;
        Some(self.commit(ticker, candidate))
    }

    /// Sentiment after one more timestep of decay, kept within [-1, 1].
    pub fn decay_sentiment(&self, sentiment: f64) -> f64 {
        (sentiment * self.sentiment_decay).clamp(-1.0, 1.0)
    }

    /// Writes a candidate price, clamping to the floor when it is not
    /// strictly positive. A non-finite candidate leaves the price unchanged.
    fn commit(&self, ticker: &mut Ticker, candidate: f64) -> PriceUpdate {
        let old_price = ticker.price();
        let mut floored = false;
        let new_price = if !candidate.is_finite() {
            warn!(ticker = %ticker.symbol, candidate, "non-finite price ignored");
            old_price
        } else if candidate <= 0.0 {
            floored = true;
            old_price * self.floor_ratio
        } else {
            candidate
        };

        ticker.set_price(new_price);
        if floored {
            ticker.distressed = true;
            warn!(ticker = %ticker.symbol, old_price, new_price, "price clamped to floor, ticker distressed");
        }

        let mut halted = false;
        if let Some(limit) = self.circuit_breaker_pct {
            let drift = (new_price / ticker.initial_price() - 1.0).abs();
            if !ticker.halted && drift > limit {
                ticker.halted = true;
                halted = true;
                warn!(ticker = %ticker.symbol, drift, "circuit breaker tripped");
            }
        }

        PriceUpdate {
            old_price,
            new_price,
            floored,
            halted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stocks::Stock;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn model() -> PricingModel {
        PricingModel::new(&MarketConfig::default())
    }

    fn aapl() -> Ticker {
        Ticker::new(
            &Stock::new("AAPL", "Apple Inc.", 16_000_000_000, 270.0).with_typical_volume(100_000_000),
            0.02,
        )
    }

    #[test]
    fn buy_impact_matches_reference_scenario() {
        // Arrange
        let pm = model();
        let mut t = aapl();

        // Act
        let ratio = pm.participation_ratio(&t, 1_000_000);
        let update = pm.update_price(&mut t, 1_000_000, Side::Buy, ratio);

        // Assert
        assert!((ratio - 0.01).abs() < 1e-12);
        let expected = 270.0 * (1.0 + 0.1 * 0.01 * 1.02);
        assert!((update.new_price - expected).abs() < 1e-9);
        assert!((t.price() - 270.27).abs() < 0.01);
        assert!((t.market_cap() - t.price() * 16e9).abs() < 1e-3);
        assert!(!update.floored);
    }

    #[test]
    fn sell_moves_price_down() {
        let pm = model();
        let mut t = aapl();
        let update = pm.update_price(&mut t, 1_000_000, Side::Sell, 0.01);
        assert!(update.new_price < update.old_price);
    }

    #[test]
    fn single_trade_move_is_capped() {
        let pm = model();
        let mut t = aapl();
        let update = pm.update_price(&mut t, u64::MAX, Side::Buy, 50.0);
        assert!((update.new_price - 270.0 * 1.10).abs() < 1e-9);
    }

    #[test]
    fn uncapped_crash_hits_floor_and_flags_distress() {
        let mut cfg = MarketConfig::default();
        cfg.max_trade_move = 0.0;
        let pm = PricingModel::new(&cfg);
        let mut t = aapl();

        let update = pm.update_price(&mut t, 1, Side::Sell, 100.0);

        assert!(update.floored);
        assert!(t.distressed);
        assert!((t.price() - 2.70).abs() < 1e-9, "floor is 1% of previous price");
        assert!(t.price() > 0.0);
    }

    #[test]
    fn shock_of_minus_ten_percent() {
        let pm = model();
        let mut t = aapl();
        pm.apply_shock(&mut t, -0.10);
        assert!((t.price() - 243.0).abs() < 1e-9);
        pm.apply_shock(&mut t, -1.5);
        assert!(t.distressed);
        assert!((t.price() - 2.43).abs() < 1e-9);
    }

    #[test]
    fn volatility_decays_towards_baseline() {
        let pm = model();
        let mut t = aapl();
        t.volatility = 0.12;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        pm.begin_timestep(&mut t, 0.0, &mut rng);
        assert!((t.volatility - (0.02 + 0.10 * 0.9)).abs() < 1e-12);
        for _ in 0..200 {
            pm.begin_timestep(&mut t, 0.0, &mut rng);
        }
        assert!((t.volatility - 0.02).abs() < 1e-6);
    }

    #[test]
    fn neutral_timestep_leaves_price_alone() {
        let pm = model();
        let mut t = aapl();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(pm.begin_timestep(&mut t, 0.0, &mut rng).is_none());
        assert_eq!(t.price(), 270.0);
    }

    #[test]
    fn positive_sentiment_drifts_price_up() {
        let pm = model();
        let mut t = aapl();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let update = pm.begin_timestep(&mut t, 1.0, &mut rng).unwrap();
        assert!((update.new_price - 270.0 * 1.001).abs() < 1e-9);
    }

    #[test]
    fn diffusion_is_reproducible_for_a_seed() {
        let mut cfg = MarketConfig::default();
        cfg.diffusion_volatility = 0.05;
        let pm = PricingModel::new(&cfg);
        let run = |seed| {
            let mut t = aapl();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..50 {
                pm.begin_timestep(&mut t, 0.0, &mut rng);
            }
            t.price()
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn sentiment_halves_after_half_life() {
        let pm = model();
        // 2 days at 4 steps per day
        let mut s = 0.8;
        for _ in 0..8 {
            s = pm.decay_sentiment(s);
        }
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn circuit_breaker_halts_once() {
        let mut cfg = MarketConfig::default();
        cfg.circuit_breaker_pct = Some(0.05);
        let pm = PricingModel::new(&cfg);
        let mut t = aapl();
        let first = pm.apply_shock(&mut t, -0.06);
        let second = pm.apply_shock(&mut t, -0.01);
        assert!(first.halted);
        assert!(!second.halted, "already halted");
        assert!(t.halted);
    }
}
