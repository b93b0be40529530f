// src/effects/mod.rs

//! Market effects: news, shocks, volatility regimes, sentiment swings and
//! dividends, queued by time and applied by the scheduler.

pub mod apply;
pub mod event;
pub mod generator;
pub mod injector;

pub use apply::{apply_effect, EffectOutcome};
pub use event::{
    AppliedEvent, EventKind, EventPayload, EventSource, MarketEffect, MarketEvent, TickerShock,
};
pub use generator::{resolve, EventGenerator};
pub use injector::{ControlHandle, Injector};
