// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod agents;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod pricing;
pub mod scheduler;
pub mod simulators;
pub mod sink;
pub mod state;
pub mod stocks;
pub mod types;

// === 2. Re-export the public-facing components to create a clean API ===

// --- From `agents` ---
pub use agents::{AgentType, Decision, MarketSnapshot, Portfolio, Strategy, Trader};

// --- From the engine core ---
pub use clock::Clock;
pub use scheduler::{RunSummary, Scheduler, StepReport};
pub use state::SimulationState;

// --- From `simulators` and `pricing` ---
pub use pricing::{PriceUpdate, PricingModel};
pub use simulators::{Marketable, MatchingEngine};

// --- From `effects` ---
pub use effects::{AppliedEvent, ControlHandle, EventKind, EventPayload, MarketEffect};

// --- Boundaries: config, sinks, errors ---
pub use config::{MarketConfig, SimulationConfig, TraderConfig};
pub use error::{Rejection, SimError, ValidationError};
pub use sink::{JsonLinesSink, MarketSink, MemorySink, NullSink, PortfolioSnapshot, StockMetric};

// --- From `stocks` and `types` ---
pub use stocks::{Quote, Stock, StockMarket, Ticker};
pub use types::{Fill, Order, OrderType, Side};
