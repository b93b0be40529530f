// src/agents/agent_type.rs

use super::config::{
    AGGRESSIVE_CAPITAL, AGGRESSIVE_TRADE_PROB, CONSERVATIVE_CAPITAL, CONSERVATIVE_TRADE_PROB,
    LONG_TERM_CAPITAL, LONG_TERM_TRADE_PROB, LOSS_MAKER_CAPITAL, LOSS_MAKER_TRADE_PROB,
};
use serde::{Deserialize, Serialize};

/// The built-in trading styles. Selects the strategy variant a trader is
/// constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Aggressive,
    Conservative,
    LossMaker,
    LongTerm,
}

impl AgentType {
    /// Every built-in style, in the default roster order.
    pub const ALL: [AgentType; 4] = [
        AgentType::Aggressive,
        AgentType::Conservative,
        AgentType::LossMaker,
        AgentType::LongTerm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AgentType::Aggressive => "Aggressive",
            AgentType::Conservative => "Conservative",
            AgentType::LossMaker => "LossMaker",
            AgentType::LongTerm => "LongTerm",
        }
    }

    pub fn default_capital(self) -> f64 {
        match self {
            AgentType::Aggressive => AGGRESSIVE_CAPITAL,
            AgentType::Conservative => CONSERVATIVE_CAPITAL,
            AgentType::LossMaker => LOSS_MAKER_CAPITAL,
            AgentType::LongTerm => LONG_TERM_CAPITAL,
        }
    }

    /// Chance of acting on any given (ticker, timestep) opportunity.
    pub fn default_trade_probability(self) -> f64 {
        match self {
            AgentType::Aggressive => AGGRESSIVE_TRADE_PROB,
            AgentType::Conservative => CONSERVATIVE_TRADE_PROB,
            AgentType::LossMaker => LOSS_MAKER_TRADE_PROB,
            AgentType::LongTerm => LONG_TERM_TRADE_PROB,
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
