// =============================================================================
// Return Anomaly Detector — trailing z-score
// =============================================================================
//
// For every return r_t that has `lookback` predecessors:
//
//   mu    = mean(r_{t-lookback} .. r_{t-1})
//   sigma = population std of the same window
//   z_t   = (r_t - mu) / sigma
//
// r_t is anomalous when |z_t| > multiplier. Windows with zero dispersion are
// skipped (the z-score is undefined there).
// =============================================================================

use crate::error::InsightError;
use crate::indicators::volatility::pct_return_points;
use crate::indicators::{ensure_non_negative, ensure_window, mean, population_std};
use crate::insights::{require, IndicatorResult, Value};
use crate::market_data::TimeSeries;

/// Parameters for [`anomalies`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyParams {
    pub multiplier: f64,
    pub lookback: usize,
}

impl AnomalyParams {
    pub fn validate(&self) -> Result<(), InsightError> {
        ensure_window("anomaly.lookback", self.lookback)?;
        ensure_non_negative("anomaly.multiplier", self.multiplier)
    }

    /// Samples needed before the first return can be scored.
    pub fn required_samples(&self) -> usize {
        self.lookback.saturating_add(2)
    }
}

/// Z-score of every scorable return, keyed by its index in `returns`.
pub fn trailing_z_scores(returns: &[f64], lookback: usize) -> Vec<(usize, f64)> {
    if lookback == 0 || returns.len() <= lookback {
        return Vec::new();
    }
    (lookback..returns.len())
        .filter_map(|t| {
            let window = &returns[t - lookback..t];
            let mu = mean(window)?;
            let sigma = population_std(window)?;
            if sigma < f64::EPSILON {
                return None;
            }
            let z = (returns[t] - mu) / sigma;
            z.is_finite().then_some((t, z))
        })
        .collect()
}

/// Indices of returns whose |z| exceeds `multiplier`, in order.
pub fn detect_anomalies(returns: &[f64], lookback: usize, multiplier: f64) -> Vec<usize> {
    trailing_z_scores(returns, lookback)
        .into_iter()
        .filter(|(_, z)| z.abs() > multiplier)
        .map(|(t, _)| t)
        .collect()
}

/// Ordered timestamps of anomalous samples in `series`. An empty list means
/// "scored, nothing found".
pub fn anomalies(
    series: &TimeSeries,
    params: &AnomalyParams,
) -> Result<IndicatorResult, InsightError> {
    params.validate()?;
    let points = series.close_points();
    if let Some(short) = require(params.required_samples(), points.len()) {
        return Ok(short);
    }

    let returns = pct_return_points(&points);
    let values: Vec<f64> = returns.iter().map(|(_, r)| *r).collect();
    let flagged = detect_anomalies(&values, params.lookback, params.multiplier)
        .into_iter()
        .map(|t| Value::Timestamp(returns[t].0))
        .collect();

    Ok(IndicatorResult::value(Value::List(flagged)))
}
