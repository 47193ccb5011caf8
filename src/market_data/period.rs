// =============================================================================
// Period / Interval — requested span and granularity of a series
// =============================================================================
//
// Both parse from the short wire strings used by the equities chart API
// ("6mo", "1d", ...). Period lookbacks are calendar durations that include
// slack for weekends and market holidays, so a "5d" request that returns the
// last five trading days still satisfies the span invariant.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// Requested span of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    YearToDate,
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::Day1,
        Period::Day5,
        Period::Month1,
        Period::Month3,
        Period::Month6,
        Period::Year1,
        Period::Year2,
        Period::Year5,
        Period::Year10,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
            Self::Month6 => "6mo",
            Self::Year1 => "1y",
            Self::Year2 => "2y",
            Self::Year5 => "5y",
            Self::Year10 => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }

    /// Earliest instant a sample may carry for a series ending at `as_of`.
    ///
    /// `None` means the period is unbounded (`max`).
    pub fn start(&self, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::Day1 => 4,
            Self::Day5 => 9,
            Self::Month1 => 35,
            Self::Month3 => 95,
            Self::Month6 => 186,
            Self::Year1 => 368,
            Self::Year2 => 733,
            Self::Year5 => 1_830,
            Self::Year10 => 3_655,
            Self::YearToDate => {
                // Jan 1st of the current year, minus holiday slack.
                let jan1 = Utc
                    .with_ymd_and_hms(as_of.year(), 1, 1, 0, 0, 0)
                    .single()?;
                return Some(jan1 - Duration::days(4));
            }
            Self::Max => return None,
        };
        Some(as_of - Duration::days(days))
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::Month6
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| InsightError::invalid("period", format!("unsupported period '{s}'")))
    }
}

impl TryFrom<String> for Period {
    type Error = InsightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.as_str().to_string()
    }
}

/// Sampling granularity of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    Min1,
    Min2,
    Min5,
    Min15,
    Min30,
    Min60,
    Min90,
    Hour1,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::Min1,
        Interval::Min2,
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Min60,
        Interval::Min90,
        Interval::Hour1,
        Interval::Day1,
        Interval::Day5,
        Interval::Week1,
        Interval::Month1,
        Interval::Month3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min2 => "2m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Min60 => "60m",
            Self::Min90 => "90m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Week1 => "1wk",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
        }
    }

    /// Nominal length of one bar. Calendar months are rounded up.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Min1 => Duration::minutes(1),
            Self::Min2 => Duration::minutes(2),
            Self::Min5 => Duration::minutes(5),
            Self::Min15 => Duration::minutes(15),
            Self::Min30 => Duration::minutes(30),
            Self::Min60 | Self::Hour1 => Duration::hours(1),
            Self::Min90 => Duration::minutes(90),
            Self::Day1 => Duration::days(1),
            Self::Day5 => Duration::days(5),
            Self::Week1 => Duration::weeks(1),
            Self::Month1 => Duration::days(31),
            Self::Month3 => Duration::days(92),
        }
    }

    /// Bar length in seconds, as used by OHLC endpoints that take a `step`.
    pub fn seconds(&self) -> i64 {
        self.duration().num_seconds()
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Day1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| {
                InsightError::invalid("interval", format!("unsupported interval '{s}'"))
            })
    }
}

impl TryFrom<String> for Interval {
    type Error = InsightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parses_wire_strings() {
        assert_eq!("6mo".parse::<Period>().unwrap(), Period::Month6);
        assert_eq!("YTD".parse::<Period>().unwrap(), Period::YearToDate);
        assert!("7w".parse::<Period>().is_err());
    }

    #[test]
    fn interval_parses_wire_strings() {
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Week1);
        assert_eq!(" 15m ".parse::<Interval>().unwrap(), Interval::Min15);
        assert!("3s".parse::<Interval>().is_err());
    }

    #[test]
    fn max_period_is_unbounded() {
        assert!(Period::Max.start(Utc::now()).is_none());
    }

    #[test]
    fn ytd_starts_before_new_year() {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let start = Period::YearToDate.start(as_of).unwrap();
        assert_eq!(start.year(), 2025);
        assert_eq!(start.month(), 12);
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&Interval::Day1).unwrap();
        assert_eq!(json, "\"1d\"");
        let period: Period = serde_json::from_str("\"1y\"").unwrap();
        assert_eq!(period, Period::Year1);
        assert!(serde_json::from_str::<Period>("\"forever\"").is_err());
    }
}
