//! Price snapshots and symbol metadata.

use serde::{Deserialize, Serialize};

/// Latest traded price with 24h statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Symbol
    pub symbol: String,
    /// Last traded price
    pub price: f64,
    /// 24h price change, percent
    pub change_pct: f64,
    /// 24h base volume
    pub volume: f64,
    /// 24h high, when the source reports it
    pub high_24h: Option<f64>,
    /// 24h low, when the source reports it
    pub low_24h: Option<f64>,
}

impl PriceTick {
    /// A tick with a non-positive price carries no usable quote.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Tradable symbol metadata from the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub status: String,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }

    /// Case-insensitive match against the symbol or its base asset.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.symbol.to_lowercase().contains(&query)
            || self.base_asset.to_lowercase().contains(&query)
    }
}
