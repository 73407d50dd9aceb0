//! Kline interval definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar interval, named the way the exchange kline API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    #[default]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
    #[serde(rename = "1M")]
    Monthly,
}

impl Timeframe {
    /// Interval string as used in kline requests and stream names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1M",
        }
    }

    /// Get all available timeframes.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Minute1,
            Timeframe::Minute5,
            Timeframe::Minute15,
            Timeframe::Minute30,
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Daily,
            Timeframe::Weekly,
            Timeframe::Monthly,
        ]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Accepts the exchange names (`15m`, `1M`) exactly, plus a few
    /// case-insensitive aliases. "1m" and "1M" differ only by case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tf) = Self::all().iter().find(|tf| tf.as_str() == s) {
            return Ok(*tf);
        }
        let tf = match s.to_ascii_lowercase().as_str() {
            "1min" | "minute" => Timeframe::Minute1,
            "5min" => Timeframe::Minute5,
            "15min" => Timeframe::Minute15,
            "30min" => Timeframe::Minute30,
            "1hour" | "hour" => Timeframe::Hour1,
            "4hour" => Timeframe::Hour4,
            "1d" | "day" | "daily" => Timeframe::Daily,
            "1w" | "week" | "weekly" => Timeframe::Weekly,
            "month" | "monthly" => Timeframe::Monthly,
            "5m" => Timeframe::Minute5,
            "15m" => Timeframe::Minute15,
            "30m" => Timeframe::Minute30,
            "1h" => Timeframe::Hour1,
            "4h" => Timeframe::Hour4,
            _ => return Err(format!("Unknown kline interval: {s}")),
        };
        Ok(tf)
    }
}
