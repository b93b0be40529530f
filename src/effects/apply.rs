// src/effects/apply.rs

use super::event::{MarketEffect, TickerShock};
use crate::pricing::PricingModel;
use crate::state::SimulationState;
use crate::types::Symbol;
use tracing::warn;

/// What applying an effect touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    pub affected: Vec<Symbol>,
    pub cash_paid: f64,
}

/// Mutates prices, volatility, sentiment or cash according to `effect`.
/// Tickers the market does not list are skipped with a warning.
pub fn apply_effect(
    state: &mut SimulationState,
    pricing: &PricingModel,
    effect: &MarketEffect,
) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();
    match effect {
        MarketEffect::PriceShock { shocks } => {
            apply_shocks(state, pricing, shocks, &mut outcome);
        }
        MarketEffect::Volatility { tickers, delta } => {
            for symbol in tickers {
                match state.market.get_mut(symbol) {
                    Some(t) => {
                        t.volatility = (t.volatility + delta).max(0.0);
                        outcome.affected.push(symbol.clone());
                    }
                    None => warn!(ticker = %symbol, "volatility effect on unknown ticker"),
                }
            }
        }
        MarketEffect::Sentiment { value } => {
            state.sentiment = value.clamp(-1.0, 1.0);
        }
        MarketEffect::Dividend { ticker, pct } => match state.market.get(ticker) {
            Some(t) => {
                let price = t.price();
                for trader in state.traders.iter_mut() {
                    let held = trader.portfolio.holding(ticker);
                    if held > 0 {
                        let amount = held as f64 * price * pct;
                        trader.portfolio.credit_dividend(amount);
                        outcome.cash_paid += amount;
                    }
                }
                outcome.affected.push(ticker.clone());
            }
            None => warn!(ticker = %ticker, "dividend on unknown ticker"),
        },
        MarketEffect::Custom {
            shocks,
            volatility_delta,
            sentiment_delta,
        } => {
            apply_shocks(state, pricing, shocks, &mut outcome);
            if *volatility_delta != 0.0 {
                for t in state.market.iter_mut() {
                    t.volatility = (t.volatility + volatility_delta).max(0.0);
                }
            }
            state.sentiment = (state.sentiment + sentiment_delta).clamp(-1.0, 1.0);
        }
    }
    outcome
}

fn apply_shocks(
    state: &mut SimulationState,
    pricing: &PricingModel,
    shocks: &[TickerShock],
    outcome: &mut EffectOutcome,
) {
    for shock in shocks {
        match state.market.get_mut(&shock.ticker) {
            Some(t) => {
                pricing.apply_shock(t, shock.magnitude);
                outcome.affected.push(shock.ticker.clone());
            }
            None => warn!(ticker = %shock.ticker, "price shock on unknown ticker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, TraderConfig};
    use crate::agents::AgentType;

    fn state() -> (SimulationState, PricingModel) {
        let mut cfg = SimulationConfig::default();
        cfg.traders = vec![
            TraderConfig::new(AgentType::LongTerm).with_holding("AAPL", 100),
            TraderConfig::new(AgentType::Aggressive),
        ];
        let pricing = PricingModel::new(&cfg.market);
        (SimulationState::new(&cfg), pricing)
    }

    #[test]
    fn crash_moves_every_ticker() {
        // Arrange
        let (mut s, pm) = state();
        let shocks = s
            .market
            .symbols()
            .into_iter()
            .map(|ticker| TickerShock { ticker, magnitude: -0.10 })
            .collect();

        // Act
        let outcome = apply_effect(&mut s, &pm, &MarketEffect::PriceShock { shocks });

        // Assert
        assert_eq!(outcome.affected.len(), 4);
        assert!((s.market.get("AAPL").unwrap().price() - 243.0).abs() < 1e-9);
        assert!((s.market.get("NVDA").unwrap().price() - 181.8).abs() < 1e-9);
    }

    #[test]
    fn dividend_pays_holders_only() {
        let (mut s, pm) = state();
        let outcome = apply_effect(
            &mut s,
            &pm,
            &MarketEffect::Dividend {
                ticker: "AAPL".into(),
                pct: 0.02,
            },
        );
        // 100 shares * 270 * 2%
        assert!((outcome.cash_paid - 540.0).abs() < 1e-9);
        assert!((s.traders[0].portfolio.cash() - 5_000_540.0).abs() < 1e-6);
        assert_eq!(s.traders[1].portfolio.cash(), 1_000_000.0);
    }

    #[test]
    fn calm_never_goes_negative_and_sentiment_is_clamped() {
        let (mut s, pm) = state();
        apply_effect(
            &mut s,
            &pm,
            &MarketEffect::Volatility {
                tickers: vec!["AAPL".into(), "ZZZZ".into()],
                delta: -1.0,
            },
        );
        assert_eq!(s.market.get("AAPL").unwrap().volatility, 0.0);

        apply_effect(&mut s, &pm, &MarketEffect::Sentiment { value: 3.0 });
        assert_eq!(s.sentiment, 1.0);

        apply_effect(
            &mut s,
            &pm,
            &MarketEffect::Custom {
                shocks: vec![],
                volatility_delta: 0.0,
                sentiment_delta: -0.5,
            },
        );
        assert!((s.sentiment - 0.5).abs() < 1e-12);
    }
}
