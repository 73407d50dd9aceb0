//! Indicator results and the discrete trading signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    StrongSell,
    #[default]
    Neutral,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::StrongBuy => "STRONG_BUY",
            SignalKind::StrongSell => "STRONG_SELL",
            SignalKind::Neutral => "NEUTRAL",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::StrongBuy => "Strong Buy",
            SignalKind::StrongSell => "Strong Sell",
            SignalKind::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator snapshot for one series.
///
/// Created fresh on every computation; carries no identity beyond the call
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// ADX(14), trend strength
    pub adx: f64,
    /// RSI(14), 0-100
    pub rsi: f64,
    /// EMA(50) of closes
    pub ema50: f64,
    /// EMA(200) of closes
    pub ema200: f64,
    /// Discrete classification
    pub signal: SignalKind,
    /// Composite confidence, 0-100
    pub strength: f64,
}

impl IndicatorResult {
    /// Sentinel returned for insufficient or anomalous input.
    pub const NEUTRAL: IndicatorResult = IndicatorResult {
        adx: 0.0,
        rsi: 50.0,
        ema50: 0.0,
        ema200: 0.0,
        signal: SignalKind::Neutral,
        strength: 0.0,
    };

    /// Whether this is exactly the sentinel value.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl Default for IndicatorResult {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Indicator result tagged with the symbol it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSignal {
    pub symbol: String,
    #[serde(flatten)]
    pub result: IndicatorResult,
}

impl SymbolSignal {
    pub fn new(symbol: impl Into<String>, result: IndicatorResult) -> Self {
        Self {
            symbol: symbol.into(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sentinel() {
        let result = IndicatorResult::default();
        assert!(result.is_sentinel());
        assert_eq!(result.rsi, 50.0);
        assert_eq!(result.signal, SignalKind::Neutral);
    }

    #[test]
    fn test_signal_serialized_names() {
        assert_eq!(
            serde_json::to_string(&SignalKind::StrongBuy).unwrap(),
            "\"STRONG_BUY\""
        );
        assert_eq!(
            serde_json::to_string(&SignalKind::StrongSell).unwrap(),
            "\"STRONG_SELL\""
        );
        assert_eq!(SignalKind::Neutral.to_string(), "NEUTRAL");
    }

    #[test]
    fn test_symbol_signal_flattens_result() {
        let signal = SymbolSignal::new("BTCUSDT", IndicatorResult::NEUTRAL);
        let json = serde_json::to_value(&signal).unwrap();

        assert_eq!(json["symbol"], "BTCUSDT");
        assert_eq!(json["rsi"], 50.0);
        assert_eq!(json["signal"], "NEUTRAL");
    }
}
