use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::market_data::{Interval, Period};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV sample. Absent fields are `None`, never zero, so that "no
/// trade" stays distinguishable from "zero price".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl Sample {
    fn prices(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }
}

/// One extracted column. Gaps (absent values) are kept in place as `None` so
/// positions still line up with the sample index.
#[derive(Debug, Clone, PartialEq)]
pub struct Column(Vec<Option<f64>>);

impl Column {
    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }

    /// Number of absent entries.
    pub fn gaps(&self) -> usize {
        self.values().iter().filter(|v| v.is_none()).count()
    }

    /// Present values only, in order.
    pub fn present(&self) -> Vec<f64> {
        self.values().iter().flatten().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// TimeSeries
// ---------------------------------------------------------------------------

/// Validated, read-only OHLCV series for one symbol.
///
/// Samples are strictly ascending by timestamp. An empty series is valid and
/// means "symbol resolved, no data in range".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    symbol: String,
    period: Period,
    interval: Interval,
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps and
    /// negative or non-finite prices.
    pub fn new(
        symbol: impl Into<String>,
        period: Period,
        interval: Interval,
        samples: Vec<Sample>,
    ) -> Result<Self, InsightError> {
        for (index, sample) in samples.iter().enumerate() {
            for (field, value) in sample.prices() {
                if let Some(v) = value {
                    if !v.is_finite() || v < 0.0 {
                        return Err(InsightError::malformed(
                            index,
                            format!("{field} must be a finite non-negative price, got {v}"),
                        ));
                    }
                }
            }
        }

        for (i, pair) in samples.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.timestamp == prev.timestamp {
                return Err(InsightError::malformed(
                    i + 1,
                    format!("duplicate timestamp {}", next.timestamp.to_rfc3339()),
                ));
            }
            if next.timestamp < prev.timestamp {
                return Err(InsightError::malformed(
                    i + 1,
                    format!(
                        "timestamp {} precedes {}",
                        next.timestamp.to_rfc3339(),
                        prev.timestamp.to_rfc3339()
                    ),
                ));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            period,
            interval,
            samples,
        })
    }

    /// Empty series for a resolved symbol.
    pub fn empty(symbol: impl Into<String>, period: Period, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            interval,
            samples: Vec::new(),
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

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First and last timestamps, `None` when empty.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.samples.first()?.timestamp, self.samples.last()?.timestamp))
    }

    /// Sub-series over `range`, clamped to the available samples.
    pub fn window(&self, range: Range<usize>) -> TimeSeries {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        TimeSeries {
            symbol: self.symbol.clone(),
            period: self.period,
            interval: self.interval,
            samples: self.samples[start..end].to_vec(),
        }
    }

    /// The trailing `n` samples.
    pub fn tail(&self, n: usize) -> TimeSeries {
        let len = self.samples.len();
        self.window(len.saturating_sub(n)..len)
    }

    pub fn opens(&self) -> Column {
        Column(self.samples.iter().map(|s| s.open).collect())
    }

    pub fn highs(&self) -> Column {
        Column(self.samples.iter().map(|s| s.high).collect())
    }

    pub fn lows(&self) -> Column {
        Column(self.samples.iter().map(|s| s.low).collect())
    }

    pub fn closes(&self) -> Column {
        Column(self.samples.iter().map(|s| s.close).collect())
    }

    pub fn volumes(&self) -> Column {
        Column(
            self.samples
                .iter()
                .map(|s| s.volume.map(|v| v as f64))
                .collect(),
        )
    }

    /// `(timestamp, close)` for every sample that has a close.
    pub fn close_points(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.samples
            .iter()
            .filter_map(|s| s.close.map(|c| (s.timestamp, c)))
            .collect()
    }

    /// Check that a non-empty series lies within its requested period (ending
    /// at `as_of`) give or take one interval.
    pub fn check_span(&self, as_of: DateTime<Utc>) -> Result<(), InsightError> {
        let Some((first, last)) = self.span() else {
            return Ok(());
        };
        let slack = self.interval.duration();

        if let Some(start) = self.period.start(as_of) {
            if first < start - slack {
                return Err(InsightError::malformed(
                    0,
                    format!(
                        "first sample {} predates {} period starting {}",
                        first.to_rfc3339(),
                        self.period,
                        start.to_rfc3339()
                    ),
                ));
            }
        }
        if last > as_of + slack {
            return Err(InsightError::malformed(
                self.samples.len() - 1,
                format!(
                    "last sample {} is after {}",
                    last.to_rfc3339(),
                    as_of.to_rfc3339()
                ),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
