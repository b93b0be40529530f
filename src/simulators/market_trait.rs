// src/simulators/market_trait.rs

use crate::error::Result;

/// A trait for any object that can simulate a market one step at a time.
/// This allows for a pluggable simulation engine.
pub trait Marketable {
    /// What one step reports back.
    type Report;

    /// Advances the simulation by one time step.
    fn step(&mut self) -> Result<Self::Report>;

    /// Returns the current price of `ticker` without advancing the simulation.
    fn current_price(&self, ticker: &str) -> Option<f64>;

    /// Resets the simulation to its initial state.
    fn reset(&mut self);
}
