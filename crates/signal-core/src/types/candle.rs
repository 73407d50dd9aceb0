//! OHLC candle and candle series types.

use serde::{Deserialize, Serialize};

use super::Timeframe;

/// One OHLC bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, Unix seconds
    pub time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded base volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Ordered candles for one symbol at one bar interval, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Symbol identifier, e.g. `BTCUSDT`
    pub symbol: String,
    /// Bar interval
    pub timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl Series {
    /// Wrap candles that are already in chronological order.
    pub fn from_candles(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            candles,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// All candles, oldest first.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Whether open times never decrease.
    pub fn is_chronological(&self) -> bool {
        self.candles.windows(2).all(|w| w[0].time <= w[1].time)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_wraps_candles() {
        let series = Series::from_candles(
            "BTCUSDT",
            Timeframe::Minute15,
            vec![
                Candle::new(0, 100.0, 101.0, 99.0, 100.5, 10.0),
                Candle::new(900, 100.5, 102.0, 100.0, 101.5, 20.0),
            ],
        );

        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
        assert_eq!(series.candles()[1].close, 101.5);
    }

    #[test]
    fn test_series_chronology() {
        let ordered = Series::from_candles(
            "ETHUSDT",
            Timeframe::Minute15,
            vec![
                Candle::new(0, 1.0, 1.0, 1.0, 1.0, 0.0),
                Candle::new(0, 1.0, 1.0, 1.0, 1.0, 0.0),
                Candle::new(900, 1.0, 1.0, 1.0, 1.0, 0.0),
            ],
        );
        assert!(ordered.is_chronological());

        let shuffled = Series::from_candles(
            "ETHUSDT",
            Timeframe::Minute15,
            vec![
                Candle::new(900, 1.0, 1.0, 1.0, 1.0, 0.0),
                Candle::new(0, 1.0, 1.0, 1.0, 1.0, 0.0),
            ],
        );
        assert!(!shuffled.is_chronological());
    }
}
