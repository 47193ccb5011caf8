// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Average gain / average loss over the look-back window, either as
//          a plain mean of the trailing `period` deltas (`Simple`, default)
//          or with Wilder's exponential smoothing (`Wilder`):
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::indicators::ensure_window;
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

/// How average gain / loss are formed over the look-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Plain mean of the trailing `period` deltas.
    #[default]
    Simple,
    /// Wilder's recursive smoothing seeded with the first simple average.
    Wilder,
}

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` closes are consumed to seed the averages).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - If average loss is zero (no down moves), RSI is 100.0; if both averages
///   are zero, RSI is 50.0.
/// - Non-finite results truncate the series.
pub fn calculate_rsi(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);

    match smoothing {
        RsiSmoothing::Simple => {
            for window in deltas.windows(period) {
                let (sum_gain, sum_loss) = gain_loss_sums(window);
                match rsi_from_averages(sum_gain / period_f, sum_loss / period_f) {
                    Some(rsi) => result.push(rsi),
                    None => break,
                }
            }
        }
        RsiSmoothing::Wilder => {
            let (sum_gain, sum_loss) = gain_loss_sums(&deltas[..period]);
            let mut avg_gain = sum_gain / period_f;
            let mut avg_loss = sum_loss / period_f;

            match rsi_from_averages(avg_gain, avg_loss) {
                Some(rsi) => result.push(rsi),
                None => return Vec::new(),
            }

            for &delta in &deltas[period..] {
                let gain = if delta > 0.0 { delta } else { 0.0 };
                let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

                avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
                avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

                match rsi_from_averages(avg_gain, avg_loss) {
                    Some(rsi) => result.push(rsi),
                    None => break,
                }
            }
        }
    }

    result
}

/// Human-readable zone for an RSI value.
pub fn rsi_label(value: f64) -> &'static str {
    if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

/// Convenience function: return the most recent RSI value together with a
/// human-readable label.
///
/// Returns `None` when there is insufficient data or the calculation produces
/// a non-finite result.
pub fn current_rsi(
    closes: &[f64],
    period: usize,
    smoothing: RsiSmoothing,
) -> Option<(f64, &'static str)> {
    let series = calculate_rsi(closes, period, smoothing);
    // A truncated series does not describe the last close.
    if series.len() != closes.len().saturating_sub(period) {
        return None;
    }
    let value = *series.last()?;
    Some((value, rsi_label(value)))
}

/// RSI at the last sample of `series`.
pub fn rsi(
    series: &TimeSeries,
    lookback: usize,
    smoothing: RsiSmoothing,
) -> Result<IndicatorResult, InsightError> {
    ensure_window("rsi.lookback", lookback)?;
    let closes = series.closes().present();
    if let Some(short) = require(lookback.saturating_add(1), closes.len()) {
        return Ok(short);
    }
    Ok(current_rsi(&closes, lookback, smoothing).map_or_else(
        || IndicatorResult::unavailable("rsi undefined for this input"),
        |(value, _)| IndicatorResult::number(value),
    ))
}

// =============================================================================
// Internal helpers
// =============================================================================

fn gain_loss_sums(deltas: &[f64]) -> (f64, f64) {
    deltas.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    })
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
