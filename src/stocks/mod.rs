// src/stocks/mod.rs
// -----------------
pub mod definitions;
pub mod ticker;

// Re-export the most useful items so callers don’t have to dive
// another level down the path.
pub use definitions::{default_stock_universe, Stock, StockMarket, DEFAULT_TYPICAL_VOLUME};
pub use ticker::{Quote, Ticker};
