//! Discrete signal classification.

use signal_core::SignalKind;

/// ADX above this marks a trending market.
pub const ADX_TREND_THRESHOLD: f64 = 25.0;
/// RSI a strong buy must exceed.
pub const BUY_RSI_THRESHOLD: f64 = 50.0;
/// RSI a strong sell must exceed.
///
/// Not the mirror of the buy threshold: a sell needs an overbought RSI
/// while price sits below a falling EMA stack.
pub const SELL_RSI_THRESHOLD: f64 = 70.0;

/// Indicator readings at the newest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub adx: f64,
    pub rsi: f64,
    /// Close of the newest candle
    pub close: f64,
    pub ema50: f64,
    pub ema200: f64,
}

/// Classify readings into a discrete signal. Buy is checked first.
pub fn classify(r: &Readings) -> SignalKind {
    let trending = r.adx > ADX_TREND_THRESHOLD;

    if trending && r.rsi > BUY_RSI_THRESHOLD && r.close > r.ema50 && r.ema50 > r.ema200 {
        SignalKind::StrongBuy
    } else if trending && r.rsi > SELL_RSI_THRESHOLD && r.close < r.ema50 && r.ema50 < r.ema200 {
        SignalKind::StrongSell
    } else {
        SignalKind::Neutral
    }
}
