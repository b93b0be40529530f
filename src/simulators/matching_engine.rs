// src/simulators/matching_engine.rs

use crate::agents::Trader;
use crate::error::{Rejection, ValidationError};
use crate::pricing::PricingModel;
use crate::stocks::StockMarket;
use crate::types::{Fill, Order, OrderType, Side};
use tracing::debug;

/// Executes orders against the ticker's current price. There is no resting
/// book: an order either fills in full right now or is rejected.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    pricing: PricingModel,
    next_seq: u64,
}

impl MatchingEngine {
    pub fn new(pricing: PricingModel) -> Self {
        Self { pricing, next_seq: 0 }
    }

    pub fn pricing(&self) -> &PricingModel {
        &self.pricing
    }

    /// Number of fills produced so far.
    pub fn fills_executed(&self) -> u64 {
        self.next_seq
    }

    /// Validates and executes `order` at simulated time `timestamp`.
    ///
    /// Every check runs before anything is written, so a rejected order
    /// leaves the market and every trader untouched. On success the trader's
    /// account is updated, the ticker's volume accumulated and its price
    /// moved by the trade's impact.
    pub fn submit(
        &mut self,
        market: &mut StockMarket,
        traders: &mut [Trader],
        order: &Order,
        timestamp: f64,
    ) -> Result<Fill, Rejection> {
        if order.quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity.into());
        }
        if let OrderType::Limit { price } = order.order_type {
            if !(price.is_finite() && price > 0.0) {
                return Err(ValidationError::InvalidLimitPrice(price).into());
            }
        }
        let ticker = market
            .get_mut(&order.ticker)
            .ok_or_else(|| ValidationError::UnknownTicker(order.ticker.clone()))?;
        let trader = traders
            .get_mut(order.agent_id)
            .ok_or(ValidationError::UnknownAgent(order.agent_id))?;

        if ticker.halted {
            return Err(Rejection::TradingHalted(order.ticker.clone()));
        }

        let price = ticker.price();
        if let Some(limit) = order.order_type.limit_price() {
            let satisfiable = match order.side {
                Side::Buy => price <= limit,
                Side::Sell => price >= limit,
            };
            if !satisfiable {
                return Err(Rejection::LimitNotSatisfiable { limit, price });
            }
        }

        let notional = order.quantity as f64 * price;
        match order.side {
            Side::Buy => {
                let available = trader.portfolio.cash();
                if notional > available {
                    return Err(Rejection::InsufficientFunds {
                        required: notional,
                        available,
                    });
                }
            }
            Side::Sell => {
                let held = trader.portfolio.holding(&order.ticker);
                if held < order.quantity {
                    return Err(Rejection::InsufficientHoldings {
                        requested: order.quantity,
                        held,
                    });
                }
            }
        }

        // --- commit ---
        ticker.record_volume(order.side, order.quantity);
        let ratio = self.pricing.participation_ratio(ticker, order.quantity);
        let update = self
            .pricing
            .update_price(ticker, order.quantity, order.side, ratio);

        let qty = order.quantity as i64;
        let (cash_delta, holdings_delta) = match order.side {
            Side::Buy => (-notional, qty),
            Side::Sell => (notional, -qty),
        };
        let fill = Fill {
            seq: self.next_seq,
            ticker: order.ticker.clone(),
            agent_id: order.agent_id,
            side: order.side,
            quantity: order.quantity,
            order_type: order.order_type,
            price,
            price_after: update.new_price,
            timestamp,
            cash_delta,
            holdings_delta,
        };
        self.next_seq += 1;
        trader.apply_fill(&fill);

        debug!(
            seq = fill.seq,
            agent = fill.agent_id,
            ticker = %fill.ticker,
            side = ?fill.side,
            qty = fill.quantity,
            price = fill.price,
            price_after = fill.price_after,
            "fill"
        );
        Ok(fill)
    }
}

// -----------------------------------------------------------------------------
//  Unit Tests
// -----------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentType;
    use crate::config::MarketConfig;
    use crate::stocks::Stock;

    fn setup(cash: f64) -> (MatchingEngine, StockMarket, Vec<Trader>) {
        let stocks = vec![
            Stock::new("AAPL", "Apple Inc.", 16_000_000_000, 270.0).with_typical_volume(100_000_000),
            Stock::new("XYZ", "Xyz Corp.", 1_000_000, 10.0),
        ];
        let market = StockMarket::new(&stocks, 0.02);
        let engine = MatchingEngine::new(PricingModel::new(&MarketConfig::default()));
        let traders = vec![Trader::new(0, AgentType::Aggressive, cash, 42)];
        (engine, market, traders)
    }

    #[test]
    fn market_buy_debits_cash_and_moves_price() {
        // Arrange
        let (mut engine, mut market, mut traders) = setup(1_000_000.0);
        let order = Order::market(0, "AAPL", Side::Buy, 100);

        // Act
        let fill = engine.submit(&mut market, &mut traders, &order, 0.25).unwrap();

        // Assert
        assert_eq!(fill.seq, 0);
        assert_eq!(fill.price, 270.0);
        assert!(fill.price_after > 270.0);
        assert!((fill.cash_delta + 27_000.0).abs() < 1e-9);
        assert_eq!(fill.holdings_delta, 100);
        assert!((traders[0].portfolio.cash() - 973_000.0).abs() < 1e-9);
        assert_eq!(traders[0].portfolio.holding("AAPL"), 100);
        let aapl = market.get("AAPL").unwrap();
        assert_eq!(aapl.volume, 100);
        assert_eq!(aapl.price(), fill.price_after);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        // Arrange: 1000 cash, 10 shares at $270 cost $2700
        let (mut engine, mut market, mut traders) = setup(1_000.0);
        let before = traders[0].portfolio.clone();

        // Act
        let result = engine.submit(
            &mut market,
            &mut traders,
            &Order::market(0, "AAPL", Side::Buy, 10),
            0.25,
        );

        // Assert
        assert!(matches!(result, Err(Rejection::InsufficientFunds { .. })));
        assert_eq!(traders[0].portfolio, before);
        assert_eq!(traders[0].portfolio.cash(), 1_000.0);
        assert_eq!(market.get("AAPL").unwrap().price(), 270.0);
        assert_eq!(market.get("AAPL").unwrap().volume, 0);
        assert_eq!(engine.fills_executed(), 0);
    }

    #[test]
    fn sell_requires_holdings() {
        let (mut engine, mut market, mut traders) = setup(1_000.0);
        let err = engine
            .submit(&mut market, &mut traders, &Order::market(0, "XYZ", Side::Sell, 1), 0.25)
            .unwrap_err();
        assert_eq!(err, Rejection::InsufficientHoldings { requested: 1, held: 0 });
    }

    #[test]
    fn round_trip_returns_shares_and_cash() {
        let (mut engine, mut market, mut traders) = setup(1_000.0);
        engine
            .submit(&mut market, &mut traders, &Order::market(0, "XYZ", Side::Buy, 10), 0.25)
            .unwrap();
        let sell = engine
            .submit(&mut market, &mut traders, &Order::market(0, "XYZ", Side::Sell, 10), 0.5)
            .unwrap();
        assert_eq!(sell.seq, 1);
        assert_eq!(traders[0].portfolio.holding("XYZ"), 0);
        assert!(traders[0].portfolio.cash() > 0.0);
    }

    #[test]
    fn validation_errors() {
        let (mut engine, mut market, mut traders) = setup(1_000.0);
        let cases = [
            (Order::market(0, "AAPL", Side::Buy, 0), ValidationError::NonPositiveQuantity),
            (
                Order::limit(0, "AAPL", Side::Buy, 1, f64::NAN),
                ValidationError::InvalidLimitPrice(f64::NAN),
            ),
            (
                Order::limit(0, "AAPL", Side::Buy, 1, -1.0),
                ValidationError::InvalidLimitPrice(-1.0),
            ),
            (
                Order::market(0, "ZZZZ", Side::Buy, 1),
                ValidationError::UnknownTicker("ZZZZ".into()),
            ),
            (Order::market(9, "AAPL", Side::Buy, 1), ValidationError::UnknownAgent(9)),
        ];
        for (order, expected) in cases {
            let err = engine.submit(&mut market, &mut traders, &order, 0.25).unwrap_err();
            match (&err, &expected) {
                (
                    Rejection::Validation(ValidationError::InvalidLimitPrice(a)),
                    ValidationError::InvalidLimitPrice(b),
                ) => assert!(a.to_bits() == b.to_bits() || a == b),
                _ => assert_eq!(err, Rejection::Validation(expected)),
            }
            assert_eq!(err.reason(), "validation");
        }
        assert_eq!(traders[0].portfolio.cash(), 1_000.0);
    }

    #[test]
    fn limit_orders_fill_only_when_marketable() {
        let (mut engine, mut market, mut traders) = setup(10_000.0);

        let too_low = Order::limit(0, "XYZ", Side::Buy, 1, 9.99);
        let err = engine.submit(&mut market, &mut traders, &too_low, 0.25).unwrap_err();
        assert_eq!(err, Rejection::LimitNotSatisfiable { limit: 9.99, price: 10.0 });

        let ok = Order::limit(0, "XYZ", Side::Buy, 1, 10.0);
        assert!(engine.submit(&mut market, &mut traders, &ok, 0.25).is_ok());

        let too_high = Order::limit(0, "XYZ", Side::Sell, 1, 1_000.0);
        let err = engine.submit(&mut market, &mut traders, &too_high, 0.25).unwrap_err();
        assert_eq!(err.reason(), "limit_not_satisfiable");
    }

    #[test]
    fn halted_ticker_rejects() {
        let (mut engine, mut market, mut traders) = setup(10_000.0);
        market.get_mut("XYZ").unwrap().halted = true;
        let err = engine
            .submit(&mut market, &mut traders, &Order::market(0, "XYZ", Side::Buy, 1), 0.25)
            .unwrap_err();
        assert_eq!(err, Rejection::TradingHalted("XYZ".into()));
    }
}
