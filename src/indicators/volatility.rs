// =============================================================================
// Volatility — dispersion of period-over-period returns
// =============================================================================
//
//   r_t        = (close_t - close_{t-1}) / close_{t-1}
//   volatility = population standard deviation of r over the whole series,
//                or over the trailing `window` returns when one is given.
//
// Returns are fractions (0.01 == 1%). A return whose base close is zero is
// undefined and skipped.
// =============================================================================

use chrono::{DateTime, Utc};

use crate::error::InsightError;
use crate::indicators::{ensure_window, population_std};
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

/// Consecutive percentage returns of `closes`.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Returns paired with the timestamp of the sample that closes each one.
pub fn pct_return_points(points: &[(DateTime<Utc>, f64)]) -> Vec<(DateTime<Utc>, f64)> {
    points
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| (w[1].0, (w[1].1 - w[0].1) / w[0].1))
        .collect()
}

/// Population standard deviation of `returns`, `None` when empty.
pub fn calculate_volatility(returns: &[f64]) -> Option<f64> {
    population_std(returns)
}

/// Volatility of `series`, over all returns or the trailing `window`.
pub fn volatility(
    series: &TimeSeries,
    window: Option<usize>,
) -> Result<IndicatorResult, InsightError> {
    if let Some(w) = window {
        ensure_window("volatility.window", w)?;
    }
    let closes = series.closes().present();
    let required = window.map_or(2, |w| w.saturating_add(1));
    if let Some(short) = require(required, closes.len()) {
        return Ok(short);
    }

    let returns = pct_returns(&closes);
    let tail = match window {
        Some(w) => &returns[returns.len().saturating_sub(w)..],
        None => &returns[..],
    };

    Ok(calculate_volatility(tail).map_or_else(
        || IndicatorResult::unavailable("no defined returns (zero base prices)"),
        IndicatorResult::number,
    ))
}
