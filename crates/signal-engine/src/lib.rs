//! Signal engine.
//!
//! Turns candle series into `{adx, rsi, ema50, ema200, signal, strength}`
//! snapshots, ranks them across a symbol universe and dispatches alerts.

pub mod alerts;
pub mod calculator;
pub mod engine;
pub mod scanner;
pub mod signal;
pub mod strength;

pub use alerts::{format_alert, AlertDispatcher, AlertPolicy};
pub use calculator::{CompoundPlan, PlanInput, PlanSummary, TradeStep};
pub use engine::{compute_indicators, EngineConfig, IndicatorEngine};
pub use scanner::{rank_by_strength, top_strong_buys, SignalScanner};
pub use signal::{classify, Readings};
pub use strength::strength_score;
