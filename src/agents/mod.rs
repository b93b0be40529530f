// src/agents/mod.rs

pub mod agent_trait;
pub mod agent_type;
pub mod aggressive_agent;
pub mod config;
pub mod conservative_agent;
pub mod long_term_agent;
pub mod loss_maker_agent;
pub mod portfolio;
pub mod trader;

pub use agent_trait::{Decision, DecisionContext, MarketSnapshot, Strategy};
pub use agent_type::AgentType;
pub use portfolio::Portfolio;
pub use trader::Trader;
