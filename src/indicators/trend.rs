// =============================================================================
// Trend Direction — short vs long moving average
// =============================================================================
//
//   spread = (MA_short - MA_long) / |MA_long|
//   up    if spread >  threshold
//   down  if spread < -threshold
//   flat  otherwise
//
// Both averages are taken at the last close. The averaging kind (simple or
// exponential) is configurable; the default is exponential 12 / 26.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::indicators::ema::last_ema;
use crate::indicators::sma::last_sma;
use crate::indicators::{ensure_non_negative, ensure_window};
use crate::insights::{require, IndicatorResult};
use crate::market_data::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverageKind {
    Simple,
    #[default]
    Exponential,
}

/// Parameters for [`trend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    pub short_window: usize,
    pub long_window: usize,
    pub threshold: f64,
    pub average: MovingAverageKind,
}

impl TrendParams {
    pub fn validate(&self) -> Result<(), InsightError> {
        ensure_window("trend.short_window", self.short_window)?;
        ensure_window("trend.long_window", self.long_window)?;
        ensure_non_negative("trend.threshold", self.threshold)?;
        if self.short_window >= self.long_window {
            return Err(InsightError::invalid(
                "trend.short_window",
                format!(
                    "short window {} must be smaller than long window {}",
                    self.short_window, self.long_window
                ),
            ));
        }
        Ok(())
    }
}

/// Classify the relation between a short and a long average.
pub fn classify_trend(short: f64, long: f64, threshold: f64) -> Trend {
    if long == 0.0 {
        return if short > 0.0 { Trend::Up } else { Trend::Flat };
    }
    let spread = (short - long) / long.abs();
    if spread > threshold {
        Trend::Up
    } else if spread < -threshold {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Trend of `closes` under `params`; `None` when an average is undefined.
pub fn current_trend(closes: &[f64], params: &TrendParams) -> Option<Trend> {
    let (short, long) = match params.average {
        MovingAverageKind::Simple => (
            last_sma(closes, params.short_window)?,
            last_sma(closes, params.long_window)?,
        ),
        MovingAverageKind::Exponential => (
            last_ema(closes, params.short_window)?,
            last_ema(closes, params.long_window)?,
        ),
    };
    Some(classify_trend(short, long, params.threshold))
}

/// Trend category at the last sample of `series`.
pub fn trend(series: &TimeSeries, params: &TrendParams) -> Result<IndicatorResult, InsightError> {
    params.validate()?;
    let closes = series.closes().present();
    if let Some(short) = require(params.long_window, closes.len()) {
        return Ok(short);
    }
    Ok(current_trend(&closes, params).map_or_else(
        || IndicatorResult::unavailable("moving averages undefined"),
        |t| IndicatorResult::category(t.as_str()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::Value;
    use crate::market_data::series::tests::daily_series;

    fn params(average: MovingAverageKind) -> TrendParams {
        TrendParams {
            short_window: 5,
            long_window: 10,
            threshold: 0.01,
            average,
        }
    }

    /// Rebuild prices from `returns` starting at `start`.
    fn from_returns(start: f64, returns: &[f64]) -> Vec<f64> {
        let mut prices = vec![start];
        for r in returns {
            let last = *prices.last().unwrap();
            prices.push(last * (1.0 + r));
        }
        prices
    }

    fn category(result: IndicatorResult) -> String {
        match result.as_value() {
            Some(Value::Category(c)) => c.clone(),
            other => panic!("expected category, got {other:?}"),
        }
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify_trend(102.0, 100.0, 0.01), Trend::Up);
        assert_eq!(classify_trend(98.0, 100.0, 0.01), Trend::Down);
        assert_eq!(classify_trend(100.5, 100.0, 0.01), Trend::Flat);
        assert_eq!(classify_trend(0.0, 0.0, 0.01), Trend::Flat);
    }

    #[test]
    fn rising_series_is_up_for_both_kinds() {
        let closes: Vec<f64> = (1..=40).map(|x| 100.0 + 2.0 * x as f64).collect();
        for kind in [MovingAverageKind::Simple, MovingAverageKind::Exponential] {
            let result = trend(&daily_series(&closes), &params(kind)).unwrap();
            assert_eq!(category(result), "up");
        }
    }

    #[test]
    fn reversing_returns_flips_direction() {
        let returns: Vec<f64> = (0..30).map(|i| 0.01 + 0.001 * (i % 3) as f64).collect();
        let negated: Vec<f64> = returns.iter().map(|r| -r).collect();

        for kind in [MovingAverageKind::Simple, MovingAverageKind::Exponential] {
            let up = trend(&daily_series(&from_returns(100.0, &returns)), &params(kind)).unwrap();
            let down =
                trend(&daily_series(&from_returns(100.0, &negated)), &params(kind)).unwrap();
            assert_eq!(category(up), "up");
            assert_eq!(category(down), "down");
        }
    }

    #[test]
    fn tiny_drift_stays_flat() {
        let returns = vec![0.0001; 30];
        let negated = vec![-0.0001; 30];
        let p = params(MovingAverageKind::Exponential);
        let a = trend(&daily_series(&from_returns(100.0, &returns)), &p).unwrap();
        let b = trend(&daily_series(&from_returns(100.0, &negated)), &p).unwrap();
        assert_eq!(category(a), "flat");
        assert_eq!(category(b), "flat");
    }

    #[test]
    fn insufficient_below_long_window() {
        let result = trend(&daily_series(&[1.0; 9]), &params(MovingAverageKind::Simple)).unwrap();
        assert_eq!(result, IndicatorResult::insufficient(10, 9));
    }

    #[test]
    fn short_window_must_be_smaller() {
        let mut p = params(MovingAverageKind::Simple);
        p.short_window = 10;
        assert!(trend(&daily_series(&[1.0; 20]), &p).is_err());
    }
}
