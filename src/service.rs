// =============================================================================
// Insight Service — collect a series, then assemble insights off the runtime
// =============================================================================
//
// Glue between the async collaborators and the synchronous engine. The
// engine is CPU-bound (rayon inside), so assembly runs on the blocking pool.
// Collection and assembly share a single deadline.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::collector::{Collected, DataCollector};
use crate::error::ServiceError;
use crate::insights::{generate_insights, InsightBundle, InsightConfig};
use crate::market_data::{Interval, Period, TimeSeries};

/// Series plus the insights computed over it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: TimeSeries,
    pub bundle: InsightBundle,
}

#[derive(Clone)]
pub struct InsightService {
    collector: Arc<dyn DataCollector>,
    timeout: Duration,
}

impl InsightService {
    pub fn new(collector: Arc<dyn DataCollector>, timeout: Duration) -> Self {
        Self { collector, timeout }
    }

    pub fn collector(&self) -> &Arc<dyn DataCollector> {
        &self.collector
    }

    /// Fetch a series; an unknown symbol is `ServiceError::NotFound`.
    #[instrument(skip(self), name = "service::series")]
    pub async fn series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<TimeSeries, ServiceError> {
        tokio::time::timeout(self.timeout, self.collect(symbol, period, interval))
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))?
    }

    /// Fetch a series and run the configured indicators over it.
    #[instrument(skip(self, config), name = "service::analyze")]
    pub async fn analyze(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
        config: &InsightConfig,
    ) -> Result<Analysis, ServiceError> {
        // Reject bad parameters before spending a network round-trip.
        config.validate()?;

        let work = async {
            let series = self.collect(symbol, period, interval).await?;
            let input = series.clone();
            let config = config.clone();
            let bundle = tokio::task::spawn_blocking(move || generate_insights(&input, &config))
                .await
                .map_err(|e| ServiceError::Internal(format!("insight task failed: {e}")))??;
            Ok::<_, ServiceError>(Analysis { series, bundle })
        };

        let analysis = tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))??;

        info!(
            symbol,
            samples = analysis.bundle.sample_count(),
            indicators = analysis.bundle.indicators().len(),
            "insights generated"
        );
        Ok(analysis)
    }

    async fn collect(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<TimeSeries, ServiceError> {
        match self
            .collector
            .fetch_series(symbol, period, interval)
            .await
            .map_err(ServiceError::from_collector)?
        {
            Collected::Found(series) => {
                debug!(symbol, samples = series.len(), "series ready");
                Ok(series)
            }
            Collected::NotFound => Err(ServiceError::not_found(symbol)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::collector::CryptoTicker;
    use crate::error::InsightError;
    use crate::market_data::series::tests::daily_series;
    use async_trait::async_trait;

    /// In-memory collector: "MISSING" is unknown, "SLOW" never answers in
    /// time, "BROKEN" fails upstream, everything else gets a rising series.
    pub(crate) struct StubCollector {
        pub closes: Vec<f64>,
    }

    impl Default for StubCollector {
        fn default() -> Self {
            Self {
                closes: (0..30).map(|i| 100.0 + i as f64).collect(),
            }
        }
    }

    #[async_trait]
    impl DataCollector for StubCollector {
        async fn fetch_series(
            &self,
            symbol: &str,
            period: Period,
            interval: Interval,
        ) -> anyhow::Result<Collected> {
            match symbol {
                "MISSING" => Ok(Collected::NotFound),
                "SLOW" => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Collected::NotFound)
                }
                "BROKEN" => anyhow::bail!("upstream returned 503"),
                _ => {
                    let base = daily_series(&self.closes);
                    let series =
                        TimeSeries::new(symbol, period, interval, base.samples().to_vec())?;
                    Ok(Collected::Found(series))
                }
            }
        }

        async fn fetch_crypto_ticker(&self, symbol: &str) -> anyhow::Result<Option<CryptoTicker>> {
            if symbol != "btcusd" {
                return Ok(None);
            }
            Ok(Some(CryptoTicker {
                symbol: symbol.to_string(),
                timestamp: crate::market_data::series::tests::day(0),
                last: 88_100.25,
                open: Some(87_000.0),
                high: None,
                low: None,
                bid: None,
                ask: None,
                vwap: None,
                volume: Some(1_534.2),
                percent_change_24h: Some(1.38),
            }))
        }
    }

    fn service(timeout: Duration) -> InsightService {
        InsightService::new(Arc::new(StubCollector::default()), timeout)
    }

    #[tokio::test]
    async fn analyze_returns_series_and_bundle() {
        let svc = service(Duration::from_secs(5));
        let analysis = svc
            .analyze("AAPL", Period::Month6, Interval::Day1, &InsightConfig::default())
            .await
            .unwrap();
        assert_eq!(analysis.series.len(), 30);
        assert_eq!(analysis.bundle.symbol(), "AAPL");
        assert!(analysis.bundle.get("sma").is_some());
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let err = service(Duration::from_secs(5))
            .series("MISSING", Period::Month1, Interval::Day1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let err = service(Duration::from_secs(5))
            .series("BROKEN", Period::Month1, Interval::Day1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[tokio::test]
    async fn slow_collector_times_out() {
        let err = service(Duration::from_millis(20))
            .analyze("SLOW", Period::Month1, Interval::Day1, &InsightConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout(_)));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_collecting() {
        let config = InsightConfig {
            rsi_lookback: 0,
            ..InsightConfig::default()
        };
        let err = service(Duration::from_secs(5))
            .analyze("SLOW", Period::Month1, Interval::Day1, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Insight(InsightError::InvalidParameter { .. })
        ));
    }
}
