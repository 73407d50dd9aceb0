//! Trend-strength indicators.

use signal_core::traits::OhlcIndicator;

/// Average Directional Index (ADX).
///
/// Directional movement is summed over a sliding window of `period` bars
/// rather than Wilder-smoothed, and the DX series is then smoothed with
/// `adx = (adx * (period - 1) + dx) / period`, seeded with the first DX.
///
/// +DM and -DM are taken independently on every bar: when a bar extends both
/// above the previous high and below the previous low, both are counted.
/// Textbook ADX keeps only the larger of the two.
///
/// A window whose true-range sum is zero, or that carries no directional
/// movement at all, produces a non-finite DX. It is propagated, not masked.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn dx(plus_dm: f64, minus_dm: f64, tr: f64) -> f64 {
        let plus_di = (plus_dm / tr) * 100.0;
        let minus_di = (minus_dm / tr) * 100.0;
        (plus_di - minus_di).abs() / (plus_di + minus_di) * 100.0
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

/// True range per bar; bar 0 uses its own high-low range.
pub fn true_ranges(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    (0..len)
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return hl;
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Upward directional movement per bar (0 for bar 0 and for non-positive moves).
pub fn plus_dm(high: &[f64]) -> Vec<f64> {
    (0..high.len())
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            let diff = high[i] - high[i - 1];
            if diff > 0.0 {
                diff
            } else {
                0.0
            }
        })
        .collect()
}

/// Downward directional movement per bar (0 for bar 0 and for non-positive moves).
pub fn minus_dm(low: &[f64]) -> Vec<f64> {
    (0..low.len())
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            let diff = low[i - 1] - low[i];
            if diff > 0.0 {
                diff
            } else {
                0.0
            }
        })
        .collect()
}

impl OhlcIndicator for Adx {
    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        if len < self.period() {
            return vec![];
        }

        let tr = true_ranges(&high[..len], &low[..len], &close[..len]);
        let pdm = plus_dm(&high[..len]);
        let mdm = minus_dm(&low[..len]);

        let p = self.period;
        let period = p as f64;

        let mut sum_tr: f64 = tr[..p].iter().sum();
        let mut sum_pdm: f64 = pdm[..p].iter().sum();
        let mut sum_mdm: f64 = mdm[..p].iter().sum();

        let mut adx = Self::dx(sum_pdm, sum_mdm, sum_tr);
        let mut result = Vec::with_capacity(len - p + 1);
        result.push(adx);

        // Slide the window one bar at a time
        for i in p..len {
            sum_tr = sum_tr - tr[i - p] + tr[i];
            sum_pdm = sum_pdm - pdm[i - p] + pdm[i];
            sum_mdm = sum_mdm - mdm[i - p] + mdm[i];

            let dx = Self::dx(sum_pdm, sum_mdm, sum_tr);
            adx = (adx * (period - 1.0) + dx) / period;
            result.push(adx);
        }

        result
    }

    fn latest(&self, high: &[f64], low: &[f64], close: &[f64]) -> f64 {
        self.calculate(high, low, close).last().copied().unwrap_or(0.0)
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend_bars(n: usize, step: f64, half_range: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * step).collect();
        let high = close.iter().map(|c| c + half_range).collect();
        let low = close.iter().map(|c| c - half_range).collect();
        (high, low, close)
    }

    #[test]
    fn test_true_range_components() {
        let high = [10.0, 12.0, 9.0];
        let low = [8.0, 11.0, 7.0];
        let close = [9.0, 11.5, 8.0];

        let tr = true_ranges(&high, &low, &close);
        assert_eq!(tr, vec![2.0, 3.0, 4.5]);
    }

    #[test]
    fn test_directional_movement_not_mutually_exclusive() {
        // Outside bar: higher high and lower low on the same bar
        let high = [10.0, 12.0];
        let low = [8.0, 5.0];

        assert_eq!(plus_dm(&high), vec![0.0, 2.0]);
        assert_eq!(minus_dm(&low), vec![0.0, 3.0]);
    }

    #[test]
    fn test_adx_short_input_is_zero() {
        let adx = Adx::default();
        let (high, low, close) = trend_bars(27, 1.0, 0.5);

        assert!(adx.calculate(&high, &low, &close).is_empty());
        assert_eq!(adx.latest(&high, &low, &close), 0.0);
        assert_eq!(adx.latest(&[], &[], &[]), 0.0);
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let adx = Adx::default();
        let (high, low, close) = trend_bars(200, 0.25, 0.5);

        let value = adx.latest(&high, &low, &close);
        // Only upward movement: +DI > 0, -DI = 0, so DX stays at 100
        assert!((value - 100.0).abs() < 1e-9, "expected ADX 100, got {value}");
    }

    #[test]
    fn test_adx_series_length() {
        let adx = Adx::new(5);
        let (high, low, close) = trend_bars(30, 1.0, 0.5);

        // Seed DX plus one smoothed value per bar after the first window
        assert_eq!(adx.calculate(&high, &low, &close).len(), 30 - 5 + 1);
    }

    #[test]
    fn test_adx_choppy_market_is_bounded() {
        let adx = Adx::default();
        let close: Vec<f64> = (0..300)
            .map(|i| 50.0 + (i as f64 * 0.3).sin() * 10.0)
            .collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();

        for value in adx.calculate(&high, &low, &close) {
            assert!((0.0..=100.0).contains(&value), "ADX {value} out of range");
        }
    }

    #[test]
    fn test_adx_flat_bars_are_non_finite() {
        let adx = Adx::default();
        let flat = vec![100.0; 200];

        assert!(adx.latest(&flat, &flat, &flat).is_nan());
    }
}
