// =============================================================================
// Price Summary — headline figures for the requested span
// =============================================================================

use crate::error::InsightError;
use crate::indicators::mean;
use crate::insights::{require, IndicatorResult, Value};
use crate::market_data::TimeSeries;

/// Latest close, opening price of the span, change over the span, span
/// high/low, average volume and sample/gap counts.
///
/// Highs and lows fall back to closes when the high/low columns are empty.
pub fn price_summary(series: &TimeSeries) -> Result<IndicatorResult, InsightError> {
    let closes = series.closes();
    let present = closes.present();
    if let Some(short) = require(1, present.len()) {
        return Ok(short);
    }

    let first = present[0];
    let last = present[present.len() - 1];
    let change_pct = (last - first) * 100.0 / first;

    let highs = match series.highs().present() {
        h if h.is_empty() => present.clone(),
        h => h,
    };
    let lows = match series.lows().present() {
        l if l.is_empty() => present.clone(),
        l => l,
    };
    let high = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = lows.iter().copied().fold(f64::INFINITY, f64::min);

    let average_volume = mean(&series.volumes().present());
    let period_open = series.opens().present().first().copied().unwrap_or(first);

    Ok(IndicatorResult::value(Value::map([
        ("latest_close", Value::Number(last)),
        ("first_close", Value::Number(first)),
        ("period_open", Value::Number(period_open)),
        ("change_pct", Value::Number(change_pct)),
        ("period_high", Value::Number(high)),
        ("period_low", Value::Number(low)),
        ("average_volume", Value::optional(average_volume)),
        ("samples", Value::Integer(series.len() as i64)),
        ("missing_closes", Value::Integer(closes.gaps() as i64)),
    ])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::series::tests::{daily_series, day};
    use crate::market_data::{Interval, Period, Sample};

    #[test]
    fn summary_of_close_only_series() {
        let result = price_summary(&daily_series(&[100.0, 90.0, 120.0])).unwrap();
        let value = result.as_value().unwrap();
        assert_eq!(value.get("latest_close").and_then(Value::as_f64), Some(120.0));
        assert_eq!(value.get("change_pct").and_then(Value::as_f64), Some(20.0));
        assert_eq!(value.get("period_high").and_then(Value::as_f64), Some(120.0));
        assert_eq!(value.get("period_low").and_then(Value::as_f64), Some(90.0));
        assert_eq!(value.get("average_volume"), Some(&Value::Null));
        // No open column: falls back to the first close.
        assert_eq!(value.get("period_open").and_then(Value::as_f64), Some(100.0));
    }

    #[test]
    fn summary_uses_ohlcv_columns() {
        let samples = vec![
            Sample {
                timestamp: day(0),
                open: Some(10.0),
                high: Some(12.0),
                low: Some(9.0),
                close: Some(11.0),
                volume: Some(1_000),
            },
            Sample {
                timestamp: day(1),
                open: None,
                high: None,
                low: None,
                close: None,
                volume: None,
            },
            Sample {
                timestamp: day(2),
                open: Some(11.0),
                high: Some(15.0),
                low: Some(10.5),
                close: Some(14.0),
                volume: Some(3_000),
            },
        ];
        let series = TimeSeries::new("ABC", Period::Month1, Interval::Day1, samples).unwrap();
        let value = price_summary(&series).unwrap().sanitized();
        let value = value.as_value().unwrap();
        assert_eq!(value.get("period_open").and_then(Value::as_f64), Some(10.0));
        assert_eq!(value.get("period_high").and_then(Value::as_f64), Some(15.0));
        assert_eq!(value.get("period_low").and_then(Value::as_f64), Some(9.0));
        assert_eq!(value.get("average_volume").and_then(Value::as_f64), Some(2_000.0));
        assert_eq!(value.get("samples"), Some(&Value::Number(3.0)));
        assert_eq!(value.get("missing_closes"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let series = TimeSeries::empty("ABC", Period::Month1, Interval::Day1);
        assert_eq!(price_summary(&series).unwrap(), IndicatorResult::insufficient(1, 0));
    }
}
