// src/agents/config.rs

//! A centralized place for tuning agent behavior parameters.
//!
//! Fractions are of cash for buys and of the held quantity for sells unless
//! noted otherwise. Ranges are sampled uniformly from each trader's own RNG.

// --- General ---
/// Salt mixed with the run seed and the agent id to seed each trader's RNG.
pub const AGENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

// --- AggressiveTrader ---
// Momentum chaser with a quick take-profit.
pub const AGGRESSIVE_CAPITAL: f64 = 1_000_000.0;
pub const AGGRESSIVE_TRADE_PROB: f64 = 0.70;
pub const AGGRESSIVE_SIZE_MIN: f64 = 0.05;
pub const AGGRESSIVE_SIZE_MAX: f64 = 0.10;
pub const AGGRESSIVE_MOMENTUM_BUY: f64 = 0.005;
pub const AGGRESSIVE_MOMENTUM_SELL: f64 = -0.003;
pub const AGGRESSIVE_TAKE_PROFIT: f64 = 0.05;
pub const AGGRESSIVE_TAKE_PROFIT_SELL_MIN: f64 = 0.20;
pub const AGGRESSIVE_TAKE_PROFIT_SELL_MAX: f64 = 0.40;
// Chance of an opening buy while the first simulated day lasts.
pub const AGGRESSIVE_OPENING_BUY_PROB: f64 = 0.30;
pub const AGGRESSIVE_SLIPPAGE: f64 = 0.001;

// --- ConservativeTrader ---
// Buys dips below fair value, trims near local peaks, caps exposure.
pub const CONSERVATIVE_CAPITAL: f64 = 2_000_000.0;
pub const CONSERVATIVE_TRADE_PROB: f64 = 0.30;
pub const CONSERVATIVE_SIZE_MIN: f64 = 0.02;
pub const CONSERVATIVE_SIZE_MAX: f64 = 0.05;
pub const CONSERVATIVE_DIP: f64 = 0.01;
pub const CONSERVATIVE_PEAK_BAND: f64 = 0.002;
pub const CONSERVATIVE_PEAK_SELL_MIN: f64 = 0.10;
pub const CONSERVATIVE_PEAK_SELL_MAX: f64 = 0.25;
// Share of portfolio value one ticker may take up.
pub const CONSERVATIVE_MAX_EXPOSURE: f64 = 0.30;
pub const CONSERVATIVE_EXPOSURE_CUT: f64 = 0.20;
pub const CONSERVATIVE_SLIPPAGE: f64 = 0.002;

// --- LossMakerTrader ---
// Emotional retail flow: chases spikes, panics on drops, never cuts losers.
pub const LOSS_MAKER_CAPITAL: f64 = 500_000.0;
pub const LOSS_MAKER_TRADE_PROB: f64 = 0.80;
pub const LOSS_MAKER_SIZE_MIN: f64 = 0.05;
pub const LOSS_MAKER_SIZE_MAX: f64 = 0.15;
pub const LOSS_MAKER_IMPULSE_PROB: f64 = 0.20;
pub const LOSS_MAKER_CHASE: f64 = 0.01;
pub const LOSS_MAKER_PANIC: f64 = -0.008;
pub const LOSS_MAKER_PANIC_SELL_MIN: f64 = 0.40;
pub const LOSS_MAKER_PANIC_SELL_MAX: f64 = 0.70;
pub const LOSS_MAKER_WINNER_MIN_GAIN: f64 = 0.02;
pub const LOSS_MAKER_WINNER_MAX_GAIN: f64 = 0.04;
pub const LOSS_MAKER_WINNER_SELL_PROB: f64 = 0.40;
pub const LOSS_MAKER_WINNER_SELL_MIN: f64 = 0.50;
pub const LOSS_MAKER_WINNER_SELL_MAX: f64 = 0.80;
pub const LOSS_MAKER_VOLATILITY_TRIGGER: f64 = 0.03;
pub const LOSS_MAKER_VOLATILITY_TRADE_PROB: f64 = 0.30;

// --- LongTermTrader ---
// Patient accumulator; only sells to rebalance.
pub const LONG_TERM_CAPITAL: f64 = 5_000_000.0;
pub const LONG_TERM_TRADE_PROB: f64 = 0.20;
pub const LONG_TERM_SIZE_MIN: f64 = 0.08;
pub const LONG_TERM_SIZE_MAX: f64 = 0.15;
pub const LONG_TERM_DRAWDOWN: f64 = 0.10;
pub const LONG_TERM_TARGET_MIN: f64 = 0.20;
pub const LONG_TERM_TARGET_MAX: f64 = 0.25;
pub const LONG_TERM_REBALANCE_TRIGGER: f64 = 1.5;
pub const LONG_TERM_SLIPPAGE: f64 = 0.003;
