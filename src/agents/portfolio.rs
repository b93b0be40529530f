// src/agents/portfolio.rs

use crate::types::{Fill, Side, Symbol};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Cash, positions and running P&L of one trader.
///
/// Strategies only ever see it by shared reference; during a run cash and
/// holdings change through `apply_fill` and `credit_dividend` alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    cash: f64,
    initial_capital: f64,
    initial_value: f64,
    holdings: BTreeMap<Symbol, u64>,
    cost_basis: BTreeMap<Symbol, f64>,
    realized_pnl: f64,
    dividends_received: f64,
    trades_executed: u64,
    total_buy_volume: u64,
    total_sell_volume: u64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            initial_value: initial_capital,
            holdings: BTreeMap::new(),
            cost_basis: BTreeMap::new(),
            realized_pnl: 0.0,
            dividends_received: 0.0,
            trades_executed: 0,
            total_buy_volume: 0,
            total_sell_volume: 0,
        }
    }

    /// Seeds an opening position acquired at `price`. Counts towards the
    /// starting value, not towards P&L.
    pub fn with_position(mut self, ticker: impl Into<Symbol>, quantity: u64, price: f64) -> Self {
        self.open_position(ticker, quantity, price);
        self
    }

    pub fn open_position(&mut self, ticker: impl Into<Symbol>, quantity: u64, price: f64) {
        if quantity == 0 {
            return;
        }
        let ticker = ticker.into();
        self.initial_value += quantity as f64 * price;
        self.holdings.insert(ticker.clone(), quantity);
        self.cost_basis.insert(ticker, price);
    }

    #[inline]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn holding(&self, ticker: &str) -> u64 {
        self.holdings.get(ticker).copied().unwrap_or(0)
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, u64> {
        &self.holdings
    }

    /// Average price paid for the shares currently held.
    pub fn cost_basis(&self, ticker: &str) -> Option<f64> {
        self.cost_basis.get(ticker).copied()
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn dividends_received(&self) -> f64 {
        self.dividends_received
    }

    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    pub fn total_buy_volume(&self) -> u64 {
        self.total_buy_volume
    }

    pub fn total_sell_volume(&self) -> u64 {
        self.total_sell_volume
    }

    /// Books an executed trade. The matching engine has already checked that
    /// cash and holdings cover it.
    pub fn apply_fill(&mut self, fill: &Fill) {
        self.cash += fill.cash_delta;
        match fill.side {
            Side::Buy => {
                let held = self.holding(&fill.ticker);
                let basis = self.cost_basis(&fill.ticker).unwrap_or(0.0);
                let new_held = held + fill.quantity;
                let new_basis =
                    (basis * held as f64 + fill.price * fill.quantity as f64) / new_held as f64;
                self.holdings.insert(fill.ticker.clone(), new_held);
                self.cost_basis.insert(fill.ticker.clone(), new_basis);
                self.total_buy_volume += fill.quantity;
            }
            Side::Sell => {
                let held = self.holding(&fill.ticker);
                let basis = self.cost_basis(&fill.ticker).unwrap_or(fill.price);
                self.realized_pnl += (fill.price - basis) * fill.quantity as f64;
                let remaining = held.saturating_sub(fill.quantity);
                if remaining == 0 {
                    self.holdings.remove(&fill.ticker);
                    self.cost_basis.remove(&fill.ticker);
                } else {
                    self.holdings.insert(fill.ticker.clone(), remaining);
                }
                self.total_sell_volume += fill.quantity;
            }
        }
        self.trades_executed += 1;
    }

    pub fn credit_dividend(&mut self, amount: f64) {
        self.cash += amount;
        self.dividends_received += amount;
    }

    /// Mark-to-market value of the positions. Tickers without a mark count
    /// at zero.
    pub fn holdings_value(&self, marks: &HashMap<Symbol, f64>) -> f64 {
        self.holdings
            .iter()
            .map(|(t, q)| *q as f64 * marks.get(t).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn portfolio_value(&self, marks: &HashMap<Symbol, f64>) -> f64 {
        self.cash + self.holdings_value(marks)
    }

    pub fn unrealized_pnl(&self, marks: &HashMap<Symbol, f64>) -> f64 {
        self.holdings
            .iter()
            .map(|(t, q)| {
                let mark = marks.get(t).copied().unwrap_or(0.0);
                let basis = self.cost_basis(t).unwrap_or(mark);
                (mark - basis) * *q as f64
            })
            .sum()
    }

    /// Change in value since the start of the run, dividends included.
    pub fn total_pnl(&self, marks: &HashMap<Symbol, f64>) -> f64 {
        self.portfolio_value(marks) - self.initial_value
    }

    pub fn total_return(&self, marks: &HashMap<Symbol, f64>) -> f64 {
        if self.initial_value <= 0.0 {
            return 0.0;
        }
        self.total_pnl(marks) / self.initial_value
    }
}
