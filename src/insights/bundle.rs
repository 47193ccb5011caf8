use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::insights::IndicatorResult;
use crate::market_data::{Interval, Period, TimeSeries};

/// First and last timestamp a bundle was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Immutable set of indicator results for one symbol/period.
///
/// Indicators are keyed in a `BTreeMap`, so serialization order is stable and
/// identical inputs serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightBundle {
    symbol: String,
    period: Period,
    interval: Interval,
    span: Option<Span>,
    sample_count: usize,
    indicators: BTreeMap<String, IndicatorResult>,
}

impl InsightBundle {
    pub(crate) fn new(series: &TimeSeries, indicators: BTreeMap<String, IndicatorResult>) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            period: series.period(),
            interval: series.interval(),
            span: series.span().map(|(start, end)| Span { start, end }),
            sample_count: series.len(),
            indicators,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn indicators(&self) -> &BTreeMap<String, IndicatorResult> {
        &self.indicators
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorResult> {
        self.indicators.get(name)
    }

    /// True when every value payload passed the sanitization pass.
    pub fn is_sanitized(&self) -> bool {
        self.indicators
            .values()
            .filter_map(IndicatorResult::as_value)
            .all(|v| v.is_sanitized())
    }
}
