// =============================================================================
// Insight Configuration — indicator selection + per-indicator parameters
// =============================================================================
//
// Every field carries a serde default so a partial JSON object (from the
// runtime config file or an API request) fills in the documented defaults.
// `validate` is the single gate that rejects bad parameters before any
// computation starts.
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::indicators::anomaly::AnomalyParams;
use crate::indicators::rsi::RsiSmoothing;
use crate::indicators::trend::{MovingAverageKind, TrendParams};
use crate::indicators::{ensure_non_negative, ensure_window};

// =============================================================================
// IndicatorKind
// =============================================================================

/// The built-in indicators. The snake_case name doubles as the bundle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    PriceSummary,
    Sma,
    EmaShort,
    EmaLong,
    Volatility,
    Rsi,
    Trend,
    Anomalies,
    RateOfChange,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 9] = [
        IndicatorKind::PriceSummary,
        IndicatorKind::Sma,
        IndicatorKind::EmaShort,
        IndicatorKind::EmaLong,
        IndicatorKind::Volatility,
        IndicatorKind::Rsi,
        IndicatorKind::Trend,
        IndicatorKind::Anomalies,
        IndicatorKind::RateOfChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceSummary => "price_summary",
            Self::Sma => "sma",
            Self::EmaShort => "ema_short",
            Self::EmaLong => "ema_long",
            Self::Volatility => "volatility",
            Self::Rsi => "rsi",
            Self::Trend => "trend",
            Self::Anomalies => "anomalies",
            Self::RateOfChange => "rate_of_change",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| InsightError::invalid("indicators", format!("unknown indicator '{s}'")))
    }
}

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_indicators() -> BTreeSet<IndicatorKind> {
    IndicatorKind::ALL.into_iter().collect()
}

fn default_sma_window() -> usize {
    20
}

fn default_ema_short_window() -> usize {
    12
}

fn default_ema_long_window() -> usize {
    26
}

fn default_rsi_lookback() -> usize {
    14
}

fn default_trend_threshold() -> f64 {
    0.01
}

fn default_anomaly_multiplier() -> f64 {
    2.5
}

fn default_anomaly_lookback() -> usize {
    20
}

fn default_roc_period() -> usize {
    10
}

// =============================================================================
// InsightConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightConfig {
    /// Which indicators to compute.
    #[serde(default = "default_indicators")]
    pub indicators: BTreeSet<IndicatorKind>,

    #[serde(default = "default_sma_window")]
    pub sma_window: usize,

    /// Short EMA window; also the short leg of the trend comparison.
    #[serde(default = "default_ema_short_window")]
    pub ema_short_window: usize,

    /// Long EMA window; also the long leg of the trend comparison.
    #[serde(default = "default_ema_long_window")]
    pub ema_long_window: usize,

    /// Trailing window of returns for volatility; `None` = whole series.
    #[serde(default)]
    pub volatility_window: Option<usize>,

    #[serde(default = "default_rsi_lookback")]
    pub rsi_lookback: usize,

    #[serde(default)]
    pub rsi_smoothing: RsiSmoothing,

    /// Minimum relative spread between the averages to call a trend.
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,

    #[serde(default)]
    pub trend_average: MovingAverageKind,

    /// |z| above which a return is anomalous.
    #[serde(default = "default_anomaly_multiplier")]
    pub anomaly_multiplier: f64,

    /// Trailing returns used for the anomaly z-score.
    #[serde(default = "default_anomaly_lookback")]
    pub anomaly_lookback: usize,

    #[serde(default = "default_roc_period")]
    pub roc_period: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            indicators: default_indicators(),
            sma_window: default_sma_window(),
            ema_short_window: default_ema_short_window(),
            ema_long_window: default_ema_long_window(),
            volatility_window: None,
            rsi_lookback: default_rsi_lookback(),
            rsi_smoothing: RsiSmoothing::default(),
            trend_threshold: default_trend_threshold(),
            trend_average: MovingAverageKind::default(),
            anomaly_multiplier: default_anomaly_multiplier(),
            anomaly_lookback: default_anomaly_lookback(),
            roc_period: default_roc_period(),
        }
    }
}

impl InsightConfig {
    pub fn trend_params(&self) -> TrendParams {
        TrendParams {
            short_window: self.ema_short_window,
            long_window: self.ema_long_window,
            threshold: self.trend_threshold,
            average: self.trend_average,
        }
    }

    pub fn anomaly_params(&self) -> AnomalyParams {
        AnomalyParams {
            multiplier: self.anomaly_multiplier,
            lookback: self.anomaly_lookback,
        }
    }

    /// Same parameters, restricted to `kinds`.
    pub fn with_indicators(&self, kinds: impl IntoIterator<Item = IndicatorKind>) -> Self {
        Self {
            indicators: kinds.into_iter().collect(),
            ..self.clone()
        }
    }

    /// Reject zero windows and negative or non-finite thresholds.
    pub fn validate(&self) -> Result<(), InsightError> {
        ensure_window("sma_window", self.sma_window)?;
        ensure_window("ema_short_window", self.ema_short_window)?;
        ensure_window("ema_long_window", self.ema_long_window)?;
        if let Some(w) = self.volatility_window {
            ensure_window("volatility_window", w)?;
        }
        ensure_window("rsi_lookback", self.rsi_lookback)?;
        ensure_non_negative("trend_threshold", self.trend_threshold)?;
        ensure_window("roc_period", self.roc_period)?;
        self.anomaly_params().validate()?;
        if self.indicators.contains(&IndicatorKind::Trend) {
            self.trend_params().validate()?;
        }
        Ok(())
    }
}
