//! Composite signal strength.

use crate::signal::Readings;

const ADX_WEIGHT_CAP: f64 = 30.0;
const RSI_EXTREME_POINTS: f64 = 25.0;
const RSI_LEANING_POINTS: f64 = 15.0;
const DISTANCE_CAP: f64 = 25.0;
const ALIGNMENT_POINTS: f64 = 20.0;

/// Score readings on a 0-100 scale.
///
/// Four parts are summed: trend strength (`adx / 2`, capped at 30), RSI
/// extremity (25 beyond 70/30, 15 beyond 60/40), distance of the close from
/// EMA50 (5 points per percent, capped at 25, none when the gap is not
/// finite), and 20 points when EMA50 is above EMA200. The total is clamped
/// to `[0, 100]`.
pub fn strength_score(r: &Readings) -> f64 {
    let mut score = (r.adx / 2.0).min(ADX_WEIGHT_CAP);

    if r.rsi >= 70.0 || r.rsi <= 30.0 {
        score += RSI_EXTREME_POINTS;
    } else if r.rsi >= 60.0 || r.rsi <= 40.0 {
        score += RSI_LEANING_POINTS;
    }

    // Undefined when EMA50 is zero; such a gap earns nothing
    let distance_pct = ((r.close / r.ema50 - 1.0) * 100.0).abs();
    if distance_pct.is_finite() {
        score += (distance_pct * 5.0).min(DISTANCE_CAP);
    }

    if r.ema50 > r.ema200 {
        score += ALIGNMENT_POINTS;
    }

    score.clamp(0.0, 100.0)
}
