// src/effects/generator.rs

//! Random event generation and payload resolution.
//!
//! Both draw from the scheduler's event RNG only, so the sequence of effects
//! for a given seed does not depend on how often traders roll their dice.

use super::event::{EventKind, EventPayload, MarketEffect, TickerShock};
use crate::types::Symbol;
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use std::ops::RangeInclusive;

// Default ranges for payload fields left unset.
pub const NEWS_RANGE: RangeInclusive<f64> = 0.02..=0.08;
pub const RALLY_RANGE: RangeInclusive<f64> = 0.03..=0.07;
pub const CRASH_RANGE: RangeInclusive<f64> = -0.10..=-0.03;
pub const VOLATILITY_SPIKE_RANGE: RangeInclusive<f64> = 0.05..=0.10;
pub const VOLATILITY_CALM_RANGE: RangeInclusive<f64> = 0.005..=0.015;
pub const ROTATION_RANGE: RangeInclusive<f64> = 0.02..=0.05;
pub const SENTIMENT_RANGE: RangeInclusive<f64> = -0.5..=0.5;
pub const DIVIDEND_RANGE: RangeInclusive<f64> = 0.01..=0.03;
pub const CORRELATION_RANGE: RangeInclusive<f64> = -0.05..=0.05;

/// Rolls for a spontaneous event once per timestep.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    enabled: bool,
    probability: f64,
}

impl EventGenerator {
    pub fn new(enabled: bool, probability: f64) -> Self {
        Self {
            enabled,
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// A uniformly chosen kind with an empty payload, or `None` most steps.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(EventKind, EventPayload)> {
        if !self.enabled || !rng.gen_bool(self.probability) {
            return None;
        }
        EventKind::RANDOM
            .choose(rng)
            .map(|kind| (*kind, EventPayload::default()))
    }
}

/// Fixes every parameter of an event, drawing what the payload leaves out.
/// Returns the effect and a human-readable description.
pub fn resolve<R: Rng + ?Sized>(
    kind: EventKind,
    payload: &EventPayload,
    symbols: &[Symbol],
    rng: &mut R,
) -> (MarketEffect, String) {
    let effect = match kind {
        EventKind::PositiveNews | EventKind::NegativeNews => {
            let ticker = pick_ticker(payload, symbols, rng);
            let magnitude = payload.magnitude.unwrap_or_else(|| {
                let m = rng.gen_range(NEWS_RANGE);
                if kind == EventKind::NegativeNews { -m } else { m }
            });
            MarketEffect::PriceShock {
                shocks: ticker
                    .into_iter()
                    .map(|ticker| TickerShock { ticker, magnitude })
                    .collect(),
            }
        }
        EventKind::MarketRally | EventKind::MarketCrash => {
            let range = if kind == EventKind::MarketRally {
                RALLY_RANGE
            } else {
                CRASH_RANGE
            };
            let magnitude = payload.magnitude.unwrap_or_else(|| rng.gen_range(range));
            MarketEffect::PriceShock {
                shocks: symbols
                    .iter()
                    .map(|t| TickerShock {
                        ticker: t.clone(),
                        magnitude,
                    })
                    .collect(),
            }
        }
        EventKind::VolatilitySpike | EventKind::VolatilityCalm => {
            let delta = match kind {
                EventKind::VolatilitySpike => payload
                    .volatility
                    .unwrap_or_else(|| rng.gen_range(VOLATILITY_SPIKE_RANGE)),
                _ => -payload
                    .volatility
                    .unwrap_or_else(|| rng.gen_range(VOLATILITY_CALM_RANGE)),
            };
            let tickers = match explicit_tickers(payload) {
                Some(list) => list,
                None => symbols.to_vec(),
            };
            MarketEffect::Volatility { tickers, delta }
        }
        EventKind::SectorRotation => {
            let magnitude = payload
                .magnitude
                .unwrap_or_else(|| rng.gen_range(ROTATION_RANGE))
                .abs();
            let (winners, losers) = match (&payload.winners, &payload.losers) {
                (Some(w), Some(l)) => (w.clone(), l.clone()),
                (Some(w), None) => (w.clone(), rest(symbols, w)),
                (None, Some(l)) => (rest(symbols, l), l.clone()),
                (None, None) => {
                    let n = rng.gen_range(1..=(symbols.len() / 2).max(1));
                    let winners: Vec<Symbol> = symbols.iter().cloned().choose_multiple(rng, n);
                    let losers = rest(symbols, &winners);
                    (winners, losers)
                }
            };
            let shocks = winners
                .into_iter()
                .map(|ticker| TickerShock { ticker, magnitude })
                .chain(losers.into_iter().map(|ticker| TickerShock {
                    ticker,
                    magnitude: -magnitude,
                }))
                .collect();
            MarketEffect::PriceShock { shocks }
        }
        EventKind::SentimentShift => MarketEffect::Sentiment {
            value: payload
                .sentiment
                .unwrap_or_else(|| rng.gen_range(SENTIMENT_RANGE))
                .clamp(-1.0, 1.0),
        },
        EventKind::Dividend => {
            let pct = payload
                .dividend_pct
                .unwrap_or_else(|| rng.gen_range(DIVIDEND_RANGE));
            match pick_ticker(payload, symbols, rng) {
                Some(ticker) => MarketEffect::Dividend { ticker, pct },
                None => MarketEffect::PriceShock { shocks: Vec::new() },
            }
        }
        EventKind::Correlation => {
            let magnitude = payload
                .magnitude
                .unwrap_or_else(|| rng.gen_range(CORRELATION_RANGE));
            let tickers = match explicit_tickers(payload) {
                Some(list) => list,
                None => {
                    let n = rng.gen_range(2.min(symbols.len())..=symbols.len());
                    symbols.iter().cloned().choose_multiple(rng, n)
                }
            };
            MarketEffect::PriceShock {
                shocks: tickers
                    .into_iter()
                    .map(|ticker| TickerShock { ticker, magnitude })
                    .collect(),
            }
        }
        EventKind::Custom => {
            let mut shocks: Vec<TickerShock> = payload
                .shocks
                .iter()
                .map(|(t, m)| TickerShock {
                    ticker: t.clone(),
                    magnitude: *m,
                })
                .collect();
            if let (Some(ticker), Some(magnitude)) = (&payload.ticker, payload.magnitude) {
                if !payload.shocks.contains_key(ticker) {
                    shocks.push(TickerShock {
                        ticker: ticker.clone(),
                        magnitude,
                    });
                }
            }
            MarketEffect::Custom {
                shocks,
                volatility_delta: payload.volatility.unwrap_or(0.0),
                sentiment_delta: payload.sentiment.unwrap_or(0.0),
            }
        }
    };
    let description = payload
        .description
        .clone()
        .unwrap_or_else(|| describe(kind, &effect));
    (effect, description)
}

fn pick_ticker<R: Rng + ?Sized>(
    payload: &EventPayload,
    symbols: &[Symbol],
    rng: &mut R,
) -> Option<Symbol> {
    payload
        .ticker
        .clone()
        .or_else(|| symbols.choose(rng).cloned())
}

fn explicit_tickers(payload: &EventPayload) -> Option<Vec<Symbol>> {
    match (&payload.tickers, &payload.ticker) {
        (Some(list), _) => Some(list.clone()),
        (None, Some(t)) => Some(vec![t.clone()]),
        (None, None) => None,
    }
}

fn rest(symbols: &[Symbol], taken: &[Symbol]) -> Vec<Symbol> {
    symbols
        .iter()
        .filter(|s| !taken.contains(s))
        .cloned()
        .collect()
}

fn describe(kind: EventKind, effect: &MarketEffect) -> String {
    match effect {
        MarketEffect::PriceShock { shocks } => match (kind, shocks.as_slice()) {
            (EventKind::PositiveNews, [s]) => {
                format!("Positive news for {} ({:+.1}%)", s.ticker, s.magnitude * 100.0)
            }
            (EventKind::NegativeNews, [s]) => {
                format!("Negative news for {} ({:+.1}%)", s.ticker, s.magnitude * 100.0)
            }
            (EventKind::MarketRally, [s, ..]) => {
                format!("Market rallies ({:+.1}%)", s.magnitude * 100.0)
            }
            (EventKind::MarketCrash, [s, ..]) => {
                format!("Market drops ({:+.1}%)", s.magnitude * 100.0)
            }
            (EventKind::SectorRotation, _) => "Sector rotation".to_string(),
            _ => {
                let names: Vec<&str> = shocks.iter().map(|s| s.ticker.as_str()).collect();
                format!("Correlated move in {}", names.join(", "))
            }
        },
        MarketEffect::Volatility { delta, .. } if *delta >= 0.0 => {
            format!("Volatility spikes (+{:.3})", delta)
        }
        MarketEffect::Volatility { delta, .. } => format!("Volatility calms ({:.3})", delta),
        MarketEffect::Sentiment { value } if *value > 0.3 => {
            format!("Market sentiment turns bullish ({value:+.2})")
        }
        MarketEffect::Sentiment { value } if *value < -0.3 => {
            format!("Market sentiment turns bearish ({value:+.2})")
        }
        MarketEffect::Sentiment { value } => format!("Market sentiment neutral ({value:+.2})"),
        MarketEffect::Dividend { ticker, pct } => {
            format!("{ticker} pays dividend ({:.1}% yield)", pct * 100.0)
        }
        MarketEffect::Custom { .. } => "Custom market effect".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn symbols() -> Vec<Symbol> {
        ["AAPL", "GOOGL", "AMZN", "NVDA"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn explicit_crash_magnitude_is_kept() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (effect, description) = resolve(
            EventKind::MarketCrash,
            &EventPayload::default().with_magnitude(-0.10),
            &symbols(),
            &mut rng,
        );
        let MarketEffect::PriceShock { shocks } = effect else {
            panic!("crash resolves to a price shock");
        };
        assert_eq!(shocks.len(), 4);
        assert!(shocks.iter().all(|s| s.magnitude == -0.10));
        assert!(description.contains("-10.0%"));
    }

    #[test]
    fn missing_fields_are_drawn_from_default_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            let (effect, _) = resolve(EventKind::NegativeNews, &EventPayload::default(), &symbols(), &mut rng);
            let MarketEffect::PriceShock { shocks } = effect else { panic!() };
            assert_eq!(shocks.len(), 1);
            assert!((-0.08..=-0.02).contains(&shocks[0].magnitude));

            let (effect, _) = resolve(EventKind::VolatilityCalm, &EventPayload::default(), &symbols(), &mut rng);
            let MarketEffect::Volatility { delta, tickers } = effect else { panic!() };
            assert!((-0.015..=-0.005).contains(&delta));
            assert_eq!(tickers.len(), 4);

            let (effect, _) = resolve(EventKind::SentimentShift, &EventPayload::default(), &symbols(), &mut rng);
            let MarketEffect::Sentiment { value } = effect else { panic!() };
            assert!((-0.5..=0.5).contains(&value));
        }
    }

    #[test]
    fn rotation_splits_the_universe() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (effect, _) = resolve(EventKind::SectorRotation, &EventPayload::default(), &symbols(), &mut rng);
        let MarketEffect::PriceShock { shocks } = effect else { panic!() };
        assert_eq!(shocks.len(), 4);
        let winners = shocks.iter().filter(|s| s.magnitude > 0.0).count();
        assert!((1..=2).contains(&winners));
        assert!(shocks.iter().all(|s| (0.02..=0.05).contains(&s.magnitude.abs())));
    }

    #[test]
    fn custom_uses_only_explicit_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let payload = EventPayload::default()
            .with_shock("AAPL", 0.02)
            .with_volatility(0.01)
            .with_sentiment(-0.2)
            .with_description("earnings");
        let (effect, description) = resolve(EventKind::Custom, &payload, &symbols(), &mut rng);
        assert_eq!(
            effect,
            MarketEffect::Custom {
                shocks: vec![TickerShock {
                    ticker: "AAPL".into(),
                    magnitude: 0.02
                }],
                volatility_delta: 0.01,
                sentiment_delta: -0.2,
            }
        );
        assert_eq!(description, "earnings");
    }

    #[test]
    fn generator_respects_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let never = EventGenerator::new(true, 0.0);
        let always = EventGenerator::new(true, 1.0);
        let disabled = EventGenerator::new(false, 1.0);
        for _ in 0..100 {
            assert!(never.roll(&mut rng).is_none());
            assert!(disabled.roll(&mut rng).is_none());
            let (kind, payload) = always.roll(&mut rng).unwrap();
            assert_ne!(kind, EventKind::Custom);
            assert_eq!(payload, EventPayload::default());
        }
    }
}
