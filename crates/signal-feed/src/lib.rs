//! Live price feeds.
//!
//! A [`PricePool`] keeps one upstream connection per subscribed symbol.
//! Each connection streams 24h ticker updates over WebSocket, retries with
//! exponential backoff, and degrades to REST polling once retries run out.

pub mod pool;
pub mod state;
pub mod ticker;

pub use pool::{FeedConfig, PriceEvent, PricePool, Subscription};
pub use state::{ConnectionMachine, FeedState, ReconnectAction, ReconnectPolicy};
pub use ticker::parse_ticker;
