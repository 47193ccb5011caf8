// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators that make up an
// insight bundle. Each module exposes two layers:
//   - slice functions over `&[f64]` returning `Vec`/`Option` (no allocation of
//     result types, easy to test against hand-computed values)
//   - series functions over a `TimeSeries` returning an `IndicatorResult`,
//     which turn short input into an explicit "insufficient data" marker.
//
// Series functions read the compacted close column: absent closes are
// skipped, never treated as zero.

pub mod anomaly;
pub mod ema;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod summary;
pub mod trend;
pub mod volatility;

use crate::error::InsightError;

/// Reject a zero window before computation.
pub(crate) fn ensure_window(name: &str, window: usize) -> Result<(), InsightError> {
    if window == 0 {
        return Err(InsightError::invalid(name, "window must be greater than zero"));
    }
    Ok(())
}

/// Reject negative or non-finite thresholds before computation.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), InsightError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InsightError::invalid(
            name,
            format!("must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

/// Arithmetic mean using the incremental update `m += (x - m) / k`.
///
/// A constant input yields that constant exactly.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut m = 0.0_f64;
    for (k, &x) in values.iter().enumerate() {
        m += (x - m) / (k + 1) as f64;
    }
    Some(m)
}

/// Population standard deviation.
pub(crate) fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
