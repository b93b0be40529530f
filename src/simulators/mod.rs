// src/simulators/mod.rs

pub mod market_trait;
pub mod matching_engine;

pub use market_trait::Marketable;
pub use matching_engine::MatchingEngine;
