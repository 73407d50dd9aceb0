//! Data sources and notification channels for the signal desk.

mod binance;
mod cache;
mod csv_source;
mod rate_limit;
mod telegram;

pub use binance::{BinanceClient, BinanceConfig};
pub use cache::PriceCache;
pub use csv_source::CsvDataSource;
pub use rate_limit::RateLimiter;
pub use telegram::{BotInfo, TelegramNotifier};
