//! Core data types.

mod candle;
mod signal;
mod ticker;
mod timeframe;

pub use candle::*;
pub use signal::*;
pub use ticker::*;
pub use timeframe::*;
