//! Core types and traits for the signal desk.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Series, Timeframe)
//! - Indicator results and signal classification
//! - Price snapshots and symbol metadata
//! - Core traits for indicators, data sources, price sources and notifiers

pub mod error;
pub mod traits;
pub mod types;

pub use error::{SignalError, SignalResult};
pub use traits::*;
pub use types::*;
