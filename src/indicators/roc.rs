// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward. A zero
// base close yields a non-finite value, which the bundle sanitizer nulls.

use crate::error::InsightError;
use crate::indicators::ensure_window;
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

/// Calculate the Rate of Change (ROC) for the given closing prices and period.
///
/// Returns a vector of ROC values, one per close starting at index `period`.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    (period..closes.len())
        .map(|i| {
            let prev = closes[i - period];
            ((closes[i] - prev) / prev) * 100.0
        })
        .collect()
}

/// Return the most recent ROC value.
pub fn current_roc(closes: &[f64], period: usize) -> Option<f64> {
    calculate_roc(closes, period).last().copied()
}

/// ROC at the last sample of `series`.
pub fn rate_of_change(series: &TimeSeries, period: usize) -> Result<IndicatorResult, InsightError> {
    ensure_window("roc.period", period)?;
    let closes = series.closes().present();
    if let Some(short) = require(period.saturating_add(1), closes.len()) {
        return Ok(short);
    }
    Ok(current_roc(&closes, period).map_or_else(
        || IndicatorResult::unavailable("rate of change undefined"),
        IndicatorResult::number,
    ))
}
