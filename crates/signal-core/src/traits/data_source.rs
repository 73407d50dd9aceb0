//! Market data source trait definitions.

use crate::error::DataError;
use crate::types::{PriceTick, Series, Timeframe};
use async_trait::async_trait;

/// Source of historical candle series and the tradable symbol list.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the most recent candles for a symbol.
    ///
    /// # Returns
    /// A series ordered from oldest to newest. It may be shorter than any
    /// indicator lookback; consumers decide what is sufficient.
    async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Series, DataError>;

    /// List tradable symbols quoted in `quote` (e.g. `USDT`), in exchange order.
    async fn list_symbols(&self, quote: &str) -> Result<Vec<String>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}

/// Source of point-in-time price snapshots.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the latest price snapshot for a symbol.
    async fn fetch_price(&self, symbol: &str) -> Result<PriceTick, DataError>;
}
