//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for close-price indicators.
pub trait Indicator: Send + Sync {
    /// Calculate indicator values for the given data.
    ///
    /// Returns one value per step once the lookback is satisfied, or an
    /// empty vector when there is not enough data.
    fn calculate(&self, data: &[f64]) -> Vec<f64>;

    /// Most recent value, or the indicator's neutral fallback when the
    /// data is too short.
    fn latest(&self, data: &[f64]) -> f64;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }
}

/// Indicator over high/low/close bars.
pub trait OhlcIndicator: Send + Sync {
    /// Calculate indicator values from aligned high, low and close slices.
    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64>;

    /// Most recent value, or the neutral fallback when the data is too short.
    fn latest(&self, high: &[f64], low: &[f64], close: &[f64]) -> f64;

    /// Get the minimum bars required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}
