//! Moving average indicators.

use signal_core::traits::Indicator;

/// Exponential Moving Average (EMA).
///
/// Seeded with the simple mean of the first `period` values, then
/// weighted by `2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }
}

impl Indicator for Ema {
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let mut result = Vec::with_capacity(data.len() - self.period + 1);

        // Initialize with SMA
        let mut ema: f64 = data[..self.period].iter().sum::<f64>() / self.period as f64;
        result.push(ema);

        for &price in &data[self.period..] {
            ema = (price - ema) * self.multiplier + ema;
            result.push(ema);
        }

        result
    }

    fn latest(&self, data: &[f64]) -> f64 {
        self.calculate(data).last().copied().unwrap_or(0.0)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
