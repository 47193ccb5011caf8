// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(close_{t-period+1} .. close_t)
//
// Each window mean is computed independently (no running-sum subtraction), so
// a flat price series produces exactly that price.
// =============================================================================

use crate::error::InsightError;
use crate::indicators::{ensure_window, mean};
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

/// Compute the SMA series for `closes` and look-back `period`.
///
/// Each output element corresponds to a close starting at index `period - 1`.
/// Returns an empty `Vec` when `period == 0` or the input is too short.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    closes.windows(period).filter_map(mean).collect()
}

/// SMA of the trailing `period` closes.
pub fn last_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    calculate_sma(&closes[closes.len() - period..], period).pop()
}

/// SMA at the last sample of `series`.
pub fn sma(series: &TimeSeries, window: usize) -> Result<IndicatorResult, InsightError> {
    ensure_window("sma.window", window)?;
    let closes = series.closes().present();
    if let Some(short) = require(window, closes.len()) {
        return Ok(short);
    }
    Ok(last_sma(&closes, window).map_or_else(
        || IndicatorResult::unavailable("moving average undefined"),
        IndicatorResult::number,
    ))
}
