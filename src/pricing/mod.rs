// src/pricing/mod.rs

pub mod impact;

pub use impact::{PriceUpdate, PricingModel};
