// src/types/mod.rs

pub mod order;

pub use order::{AgentId, Fill, Order, OrderType, Side, Symbol};
