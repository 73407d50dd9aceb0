//! Indicator engine: one candle series in, one `IndicatorResult` out.

use serde::{Deserialize, Serialize};
use signal_core::error::IndicatorError;
use signal_core::traits::{Indicator, OhlcIndicator};
use signal_core::types::{Candle, IndicatorResult};
use signal_indicators::{Adx, Ema, Rsi};
use tracing::debug;

use crate::signal::{classify, Readings};
use crate::strength::strength_score;

/// Indicator periods and the minimum series length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub rsi_period: usize,
    pub adx_period: usize,
    pub fast_ema: usize,
    pub slow_ema: usize,
    /// Series shorter than this yield the neutral result
    pub min_candles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            adx_period: 14,
            fast_ema: 50,
            slow_ema: 200,
            min_candles: 200,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.rsi_period == 0 || self.adx_period == 0 || self.fast_ema == 0 {
            return Err(IndicatorError::InvalidParameter(
                "Indicator periods must be greater than 0".into(),
            ));
        }
        if self.fast_ema >= self.slow_ema {
            return Err(IndicatorError::InvalidParameter(
                "Fast EMA period must be less than slow EMA period".into(),
            ));
        }
        let lookback = self
            .slow_ema
            .max(2 * self.adx_period)
            .max(self.rsi_period + 1);
        if self.min_candles < lookback {
            return Err(IndicatorError::InvalidParameter(format!(
                "min_candles ({}) is below the longest lookback ({lookback})",
                self.min_candles
            )));
        }
        Ok(())
    }
}

/// Computes RSI, EMA50, EMA200, ADX, the signal and its strength.
///
/// Stateless and `Send + Sync`; share one instance across tasks.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: EngineConfig,
    rsi: Rsi,
    adx: Adx,
    fast: Ema,
    slow: Ema,
}

impl IndicatorEngine {
    pub fn new(config: EngineConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            rsi: Rsi::new(config.rsi_period),
            adx: Adx::new(config.adx_period),
            fast: Ema::new(config.fast_ema),
            slow: Ema::new(config.slow_ema),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute indicators, reporting why a series was rejected.
    pub fn try_compute(&self, candles: &[Candle]) -> Result<IndicatorResult, IndicatorError> {
        if candles.len() < self.config.min_candles {
            return Err(IndicatorError::InsufficientData {
                required: self.config.min_candles,
                available: candles.len(),
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

        let rsi = self.rsi.latest(&closes);
        let ema50 = self.fast.latest(&closes);
        let ema200 = self.slow.latest(&closes);
        let adx = self.adx.latest(&highs, &lows, &closes);

        for (indicator, value) in [
            ("ADX", adx),
            ("RSI", rsi),
            ("EMA50", ema50),
            ("EMA200", ema200),
        ] {
            if !value.is_finite() {
                return Err(IndicatorError::NonFinite { indicator, value });
            }
        }

        let close = closes[closes.len() - 1];
        let readings = Readings {
            adx,
            rsi,
            close,
            ema50,
            ema200,
        };

        Ok(IndicatorResult {
            adx,
            rsi,
            ema50,
            ema200,
            signal: classify(&readings),
            strength: strength_score(&readings),
        })
    }

    /// Compute indicators; any rejection yields [`IndicatorResult::NEUTRAL`].
    pub fn compute(&self, candles: &[Candle]) -> IndicatorResult {
        match self.try_compute(candles) {
            Ok(result) => result,
            Err(e) => {
                debug!(candles = candles.len(), error = %e, "Falling back to neutral result");
                IndicatorResult::NEUTRAL
            }
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

/// Compute indicators with the standard periods (RSI 14, ADX 14, EMA 50/200).
pub fn compute_indicators(candles: &[Candle]) -> IndicatorResult {
    IndicatorEngine::default().compute(candles)
}
