// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (period + 1)
//   EMA_t  = alpha * close_t + (1 - alpha) * EMA_{t-1}
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

use crate::error::InsightError;
use crate::indicators::{ensure_window, mean};
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period` => empty vec
/// - A non-finite intermediate value stops the series; later values are not
///   produced.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed = match mean(&closes[..period]) {
        Some(v) if v.is_finite() => v,
        _ => return Vec::new(),
    };

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(seed);

    let mut prev_ema = seed;
    for &close in &closes[period..] {
        let ema = alpha * close + (1.0 - alpha) * prev_ema;
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// EMA at the last close, `None` when it cannot be computed.
pub fn last_ema(closes: &[f64], period: usize) -> Option<f64> {
    let series = calculate_ema(closes, period);
    // A truncated series does not describe the last close.
    if series.len() != closes.len().saturating_sub(period) + 1 {
        return None;
    }
    series.last().copied()
}

/// EMA at the last sample of `series`.
pub fn ema(series: &TimeSeries, window: usize) -> Result<IndicatorResult, InsightError> {
    ensure_window("ema.window", window)?;
    let closes = series.closes().present();
    if let Some(short) = require(window, closes.len()) {
        return Ok(short);
    }
    Ok(last_ema(&closes, window).map_or_else(
        || IndicatorResult::unavailable("exponential average diverged"),
        IndicatorResult::number,
    ))
}
