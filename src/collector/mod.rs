// =============================================================================
// Data Collector — supplies time series to the insight engine
// =============================================================================
//
// The engine never performs I/O itself. Everything network-facing lives
// behind `DataCollector`, so the HTTP layer and the report scheduler can be
// driven by a stub in tests.
//
// Routing: compact lowercase pairs with a fiat/stable quote ("btcusd",
// "etheur") go to the crypto API; everything else ("AAPL", "BTC-USD",
// "^GSPC") goes to the equities chart API, which also lists the major coins.
// =============================================================================

pub mod bitstamp;
pub mod yahoo;

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::market_data::{Interval, Period, TimeSeries};

pub use bitstamp::CryptoTicker;

/// Quote currencies recognised in compact crypto pair names.
const CRYPTO_QUOTES: &[&str] = &["usdt", "usdc", "usd", "eur", "gbp"];

/// What a collector found for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    /// Symbol resolved; the series may be empty.
    Found(TimeSeries),
    /// Symbol does not exist at the source.
    NotFound,
}

#[async_trait]
pub trait DataCollector: Send + Sync {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Collected>;

    async fn fetch_crypto_ticker(&self, symbol: &str) -> Result<Option<CryptoTicker>>;
}

/// Whether `symbol` is a compact crypto pair such as "btcusd".
pub fn is_crypto_pair(symbol: &str) -> bool {
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    CRYPTO_QUOTES.iter().any(|quote| {
        symbol
            .strip_suffix(quote)
            .is_some_and(|base| (2..=5).contains(&base.len()))
    })
}

/// Collector backed by the public equities chart API and the Bitstamp API.
#[derive(Clone)]
pub struct HttpCollector {
    client: reqwest::Client,
    equities_base_url: String,
    crypto_base_url: String,
}

impl HttpCollector {
    pub fn new(
        equities_base_url: impl Into<String>,
        crypto_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("market-insight/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            equities_base_url: equities_base_url.into(),
            crypto_base_url: crypto_base_url.into(),
        })
    }
}

#[async_trait]
impl DataCollector for HttpCollector {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Collected> {
        let collected = if is_crypto_pair(symbol) {
            bitstamp::fetch_ohlc(&self.client, &self.crypto_base_url, symbol, period, interval)
                .await?
        } else {
            yahoo::fetch_chart(&self.client, &self.equities_base_url, symbol, period, interval)
                .await?
        };

        if let Collected::Found(series) = &collected {
            if let Err(e) = series.check_span(Utc::now()) {
                warn!(symbol, error = %e, "collected series falls outside the requested period");
                return Err(e.into());
            }
            debug!(symbol, samples = series.len(), "series collected");
        }
        Ok(collected)
    }

    async fn fetch_crypto_ticker(&self, symbol: &str) -> Result<Option<CryptoTicker>> {
        bitstamp::fetch_ticker(&self.client, &self.crypto_base_url, symbol).await
    }
}
