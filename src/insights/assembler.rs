// =============================================================================
// Insight Assembler — run the indicator set over one series
// =============================================================================
//
// Indicators are independent, so they run on the rayon pool in any order.
// The assembler's only coordination duty is isolation: an indicator that
// returns an error or panics is recorded as `Unavailable` and every other
// indicator still lands in the bundle. After collection each result goes
// through the sanitization pass.
//
// Configuration errors are raised by `from_config`, before any series is
// touched.
// =============================================================================

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{IndicatorFailure, InsightError};
use crate::indicators::{anomaly, ema, roc, rsi, sma, summary, trend, volatility};
use crate::insights::{IndicatorKind, IndicatorResult, InsightBundle, InsightConfig};
use crate::market_data::TimeSeries;

/// One named computation over a series.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    fn compute(&self, series: &TimeSeries) -> Result<IndicatorResult, IndicatorFailure>;
}

/// A built-in indicator bound to a validated configuration.
struct Builtin {
    kind: IndicatorKind,
    config: InsightConfig,
}

impl Indicator for Builtin {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn compute(&self, series: &TimeSeries) -> Result<IndicatorResult, IndicatorFailure> {
        let cfg = &self.config;
        let result = match self.kind {
            IndicatorKind::PriceSummary => summary::price_summary(series),
            IndicatorKind::Sma => sma::sma(series, cfg.sma_window),
            IndicatorKind::EmaShort => ema::ema(series, cfg.ema_short_window),
            IndicatorKind::EmaLong => ema::ema(series, cfg.ema_long_window),
            IndicatorKind::Volatility => volatility::volatility(series, cfg.volatility_window),
            IndicatorKind::Rsi => rsi::rsi(series, cfg.rsi_lookback, cfg.rsi_smoothing),
            IndicatorKind::Trend => trend::trend(series, &cfg.trend_params()),
            IndicatorKind::Anomalies => anomaly::anomalies(series, &cfg.anomaly_params()),
            IndicatorKind::RateOfChange => roc::rate_of_change(series, cfg.roc_period),
        };
        result.map_err(|e| IndicatorFailure::new(self.kind.as_str(), e.to_string()))
    }
}

/// Runs a fixed set of indicators and merges their results into a bundle.
pub struct InsightAssembler {
    indicators: Vec<Box<dyn Indicator>>,
}

impl InsightAssembler {
    /// Validate `config` and bind one built-in indicator per selected kind.
    pub fn from_config(config: &InsightConfig) -> Result<Self, InsightError> {
        config.validate()?;
        let assembler = config.indicators.iter().fold(
            Self {
                indicators: Vec::with_capacity(config.indicators.len()),
            },
            |assembler, &kind| {
                assembler.with_indicator(Box::new(Builtin {
                    kind,
                    config: config.clone(),
                }))
            },
        );
        debug!(indicators = ?assembler.indicator_names(), "assembler ready");
        Ok(assembler)
    }

    /// Add a custom indicator. A later indicator with the same name replaces
    /// the earlier result.
    pub fn with_indicator(mut self, indicator: Box<dyn Indicator>) -> Self {
        self.indicators.push(indicator);
        self
    }

    pub fn indicator_names(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.name()).collect()
    }

    /// Compute every indicator over `series`. Never fails: per-indicator
    /// problems surface as markers inside the bundle.
    pub fn assemble(&self, series: &TimeSeries) -> InsightBundle {
        let computed: Vec<(String, IndicatorResult)> = self
            .indicators
            .par_iter()
            .map(|indicator| {
                let result = run_isolated(indicator.as_ref(), series).sanitized();
                (indicator.name().to_string(), result)
            })
            .collect();

        let results: BTreeMap<String, IndicatorResult> = computed.into_iter().collect();
        let bundle = InsightBundle::new(series, results);
        debug_assert!(bundle.is_sanitized());

        let results = bundle.indicators().values();
        let insufficient = results.clone().filter(|r| r.is_insufficient()).count();
        let unavailable = results.filter(|r| r.is_unavailable()).count();

        debug!(
            symbol = %series.symbol(),
            samples = series.len(),
            indicators = bundle.indicators().len(),
            insufficient,
            unavailable,
            "insight bundle assembled"
        );
        bundle
    }
}

/// Validate `config`, then assemble a bundle for `series`.
pub fn generate_insights(
    series: &TimeSeries,
    config: &InsightConfig,
) -> Result<InsightBundle, InsightError> {
    Ok(InsightAssembler::from_config(config)?.assemble(series))
}

/// Run one indicator, converting errors and panics into `Unavailable`.
fn run_isolated(indicator: &dyn Indicator, series: &TimeSeries) -> IndicatorResult {
    match panic::catch_unwind(AssertUnwindSafe(|| indicator.compute(series))) {
        Ok(Ok(result)) => result,
        Ok(Err(failure)) => {
            warn!(
                indicator = %indicator.name(),
                symbol = %series.symbol(),
                error = %failure,
                "indicator failed"
            );
            IndicatorResult::unavailable(failure.reason)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(
                indicator = %indicator.name(),
                symbol = %series.symbol(),
                reason = %reason,
                "indicator panicked"
            );
            IndicatorResult::unavailable(format!("internal fault: {reason}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
