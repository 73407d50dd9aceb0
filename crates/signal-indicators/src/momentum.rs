//! Momentum indicators.

use signal_core::traits::Indicator;

/// RSI reported when there is not enough data.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let period = self.period as f64;
        let mut gains = 0.0;
        let mut losses = 0.0;

        // Seed from the first `period` deltas; an unchanged close is a zero gain
        for i in 1..=self.period {
            let change = data[i] - data[i - 1];
            if change >= 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        let mut avg_gain = gains / period;
        let mut avg_loss = losses / period;

        let mut result = Vec::with_capacity(data.len() - self.period);
        result.push(Self::value(avg_gain, avg_loss));

        // Wilder's smoothing: avg = (prev_avg * (period-1) + value) / period
        for i in (self.period + 1)..data.len() {
            let change = data[i] - data[i - 1];
            let (gain, loss) = if change >= 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            };
            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            result.push(Self::value(avg_gain, avg_loss));
        }

        result
    }

    fn latest(&self, data: &[f64]) -> f64 {
        self.calculate(data).last().copied().unwrap_or(RSI_NEUTRAL)
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}
