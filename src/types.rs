// =============================================================================
// Shared types used across the market insight service
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// How often a scheduled report is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    /// Mondays only.
    Weekly,
}

impl Default for ReportFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl std::fmt::Display for ReportFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
        }
    }
}

impl FromStr for ReportFrequency {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(InsightError::invalid(
                "frequency",
                format!("unknown frequency '{other}' (expected daily or weekly)"),
            )),
        }
    }
}

/// Which HTML layout a report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Headline price figures plus the trend.
    Summary,
    /// Every indicator in the bundle.
    Detailed,
    /// The indicators chosen in the request.
    Custom,
}

impl Default for ReportType {
    fn default() -> Self {
        Self::Summary
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Detailed => write!(f, "detailed"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<ReportFrequency>().unwrap(), ReportFrequency::Weekly);
        assert_eq!(" daily ".parse::<ReportFrequency>().unwrap(), ReportFrequency::Daily);
        assert!("hourly".parse::<ReportFrequency>().is_err());
    }

    #[test]
    fn report_type_serde_is_lowercase() {
        let json = serde_json::to_string(&ReportType::Detailed).unwrap();
        assert_eq!(json, "\"detailed\"");
        let parsed: ReportType = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(parsed, ReportType::Custom);
        assert_eq!(ReportType::default(), ReportType::Summary);
    }
}
