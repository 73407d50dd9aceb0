//! Technical indicators.
//!
//! This crate provides the indicators behind the signal engine:
//! - Moving averages (EMA)
//! - Momentum indicators (RSI with Wilder's smoothing)
//! - Trend indicators (ADX)
//!
//! Every indicator offers a full `calculate` series and a `latest` value.
//! `latest` never fails: too-short input yields the indicator's neutral
//! fallback (EMA 0, RSI 50, ADX 0). Non-finite results are passed through
//! so the caller can decide how to treat them.

pub mod momentum;
pub mod moving_average;
pub mod trend;

pub use momentum::Rsi;
pub use moving_average::Ema;
pub use trend::Adx;
