// =============================================================================
// Crypto — Bitstamp public v2 API
// =============================================================================
//
// Ticker: GET {base}/api/v2/ticker/{pair}/
// OHLC:   GET {base}/api/v2/ohlc/{pair}/?step={secs}&limit={n}&end={unix}
//
// An OHLC page holds at most 1000 bars ending at `end`. Periods longer than
// that are fetched as consecutive pages walking back from now, so the most
// recent bars are always present; past `MAX_OHLC_PAGES` the oldest bars are
// dropped.
//
// Bitstamp sends every numeric field as a JSON string. Unknown pairs answer
// HTTP 404. Base-asset volume is fractional and is rounded to whole units for
// the sample's integer volume.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, instrument};

use crate::collector::Collected;
use crate::error::InsightError;
use crate::market_data::{Interval, Period, Sample, TimeSeries};

/// Upper bound on bars per OHLC request.
const MAX_OHLC_LIMIT: i64 = 1000;

/// Upper bound on OHLC requests per series.
const MAX_OHLC_PAGES: usize = 16;

/// One OHLC request: up to `limit` bars ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OhlcPage {
    pub end: i64,
    pub limit: i64,
}

impl OhlcPage {
    fn query(&self, step: i64) -> [(&'static str, String); 3] {
        [
            ("step", step.to_string()),
            ("limit", self.limit.to_string()),
            ("end", self.end.to_string()),
        ]
    }
}

/// Pages covering `period` at `step` seconds, newest first.
pub fn ohlc_pages(period: Period, step: i64, now: DateTime<Utc>) -> Vec<OhlcPage> {
    let end = now.timestamp();
    let Some(start) = period.start(now) else {
        return vec![OhlcPage {
            end,
            limit: MAX_OHLC_LIMIT,
        }];
    };

    // Bars with timestamps in [start, now].
    let mut remaining = ((end - start.timestamp()).max(0) / step) + 1;
    let mut pages = Vec::new();
    let mut page_end = end;
    while remaining > 0 && pages.len() < MAX_OHLC_PAGES {
        let limit = remaining.min(MAX_OHLC_LIMIT);
        pages.push(OhlcPage {
            end: page_end,
            limit,
        });
        remaining -= limit;
        page_end -= limit * step;
    }
    pages
}

/// Latest 24h ticker for a crypto pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CryptoTicker {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub last: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub vwap: Option<f64>,
    pub volume: Option<f64>,
    pub percent_change_24h: Option<f64>,
}

/// OHLC step for an interval; Bitstamp supports a fixed set of steps.
pub fn step_for(interval: Interval) -> Result<i64, InsightError> {
    match interval {
        Interval::Min1 => Ok(60),
        Interval::Min5 => Ok(300),
        Interval::Min15 => Ok(900),
        Interval::Min30 => Ok(1_800),
        Interval::Min60 | Interval::Hour1 => Ok(3_600),
        Interval::Day1 => Ok(86_400),
        other => Err(InsightError::invalid(
            "interval",
            format!("interval '{other}' is not available for crypto pairs"),
        )),
    }
}

/// Normalise user input ("BTC-USD", "btc/usd", "BTCUSD") to a Bitstamp pair.
pub fn pair_name(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[instrument(skip(client, base_url), name = "bitstamp::fetch_ticker")]
pub async fn fetch_ticker(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> Result<Option<CryptoTicker>> {
    let pair = pair_name(symbol);
    let url = format!("{base_url}/api/v2/ticker/{pair}/");

    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {url} request failed"))?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        debug!(pair = %pair, "ticker API reports unknown pair");
        return Ok(None);
    }
    let body: Json = resp.json().await.context("failed to parse ticker response")?;
    if !status.is_success() {
        anyhow::bail!("ticker API returned {status}: {body}");
    }

    parse_ticker(&pair, &body).map(Some)
}

#[instrument(skip(client, base_url), name = "bitstamp::fetch_ohlc")]
pub async fn fetch_ohlc(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<Collected> {
    let step = step_for(interval)?;
    let pair = pair_name(symbol);
    let url = format!("{base_url}/api/v2/ohlc/{pair}/");
    let now = Utc::now();
    let pages = ohlc_pages(period, step, now);

    let mut samples = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        let resp = client
            .get(&url)
            .query(&page.query(step))
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND && i == 0 {
            return Ok(Collected::NotFound);
        }
        let body: Json = resp.json().await.context("failed to parse ohlc response")?;
        if !status.is_success() {
            anyhow::bail!("ohlc API returned {status}: {body}");
        }

        let bars = parse_bars(&body)?;
        let exhausted = (bars.len() as i64) < page.limit;
        samples.extend(bars);
        if exhausted {
            debug!(pair = %pair, page = i, "ohlc history exhausted");
            break;
        }
    }

    if let Some(start) = period.start(now) {
        samples.retain(|s| s.timestamp >= start);
    }
    samples.sort_by_key(|s| s.timestamp);
    samples.dedup_by_key(|s| s.timestamp);
    debug!(pair = %pair, pages = pages.len(), bars = samples.len(), "ohlc collected");

    Ok(Collected::Found(TimeSeries::new(
        symbol, period, interval, samples,
    )?))
}

/// Parse a ticker payload.
pub fn parse_ticker(pair: &str, body: &Json) -> Result<CryptoTicker> {
    let secs = string_i64(&body["timestamp"]).context("missing field timestamp")?;
    let timestamp = Utc
        .timestamp_opt(secs, 0)
        .single()
        .with_context(|| format!("timestamp out of range: {secs}"))?;

    Ok(CryptoTicker {
        symbol: pair.to_string(),
        timestamp,
        last: string_f64(&body["last"]).context("missing field last")?,
        open: string_f64(&body["open"]),
        high: string_f64(&body["high"]),
        low: string_f64(&body["low"]),
        bid: string_f64(&body["bid"]),
        ask: string_f64(&body["ask"]),
        vwap: string_f64(&body["vwap"]),
        volume: string_f64(&body["volume"]),
        percent_change_24h: string_f64(&body["percent_change_24"]),
    })
}

/// Parse the bars of an OHLC payload, in payload order.
fn parse_bars(body: &Json) -> Result<Vec<Sample>> {
    let bars = body
        .pointer("/data/ohlc")
        .and_then(Json::as_array)
        .context("missing field data.ohlc")?;

    let mut samples = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let secs = string_i64(&bar["timestamp"])
            .with_context(|| format!("ohlc[{i}] missing timestamp"))?;
        let timestamp = Utc
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("ohlc[{i}] timestamp out of range: {secs}"))?;
        samples.push(Sample {
            timestamp,
            open: string_f64(&bar["open"]),
            high: string_f64(&bar["high"]),
            low: string_f64(&bar["low"]),
            close: string_f64(&bar["close"]),
            volume: string_f64(&bar["volume"])
                .filter(|v| *v >= 0.0)
                .map(|v| v.round() as u64),
        });
    }
    Ok(samples)
}

/// Bitstamp numbers arrive as strings; accept plain numbers too.
fn string_f64(val: &Json) -> Option<f64> {
    match val {
        Json::String(s) => s.parse().ok(),
        Json::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn string_i64(val: &Json) -> Option<i64> {
    match val {
        Json::String(s) => s.parse().ok(),
        Json::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_name_normalises_symbols() {
        assert_eq!(pair_name("BTC-USD"), "btcusd");
        assert_eq!(pair_name("eth/eur"), "etheur");
        assert_eq!(pair_name("btcusd"), "btcusd");
    }

    #[test]
    fn unsupported_step_is_invalid_parameter() {
        assert_eq!(step_for(Interval::Day1).unwrap(), 86_400);
        assert!(matches!(
            step_for(Interval::Week1),
            Err(InsightError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn short_period_is_one_page_ending_now() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let pages = ohlc_pages(Period::Month3, 86_400, now);
        // 95 days of slack-padded history, inclusive of today.
        assert_eq!(pages, vec![OhlcPage { end: now.timestamp(), limit: 96 }]);
    }

    #[test]
    fn long_period_walks_back_from_now() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let step = 900;
        let pages = ohlc_pages(Period::Month1, step, now);
        // 35 days at 15m: 3361 bars in four pages.
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0], OhlcPage { end: now.timestamp(), limit: 1000 });
        assert_eq!(pages[1].end, now.timestamp() - 1000 * step);
        assert_eq!(pages[3].limit, 361);
        assert_eq!(pages.iter().map(|p| p.limit).sum::<i64>(), 3361);

        let oldest = pages[3].end - (pages[3].limit - 1) * step;
        assert_eq!(oldest, Period::Month1.start(now).unwrap().timestamp());
    }

    #[test]
    fn page_count_is_capped_keeping_recent_bars() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let pages = ohlc_pages(Period::Month1, 60, now);
        assert_eq!(pages.len(), MAX_OHLC_PAGES);
        assert_eq!(pages[0].end, now.timestamp());
    }

    #[test]
    fn unbounded_period_is_latest_page() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let pages = ohlc_pages(Period::Max, 86_400, now);
        assert_eq!(pages, vec![OhlcPage { end: now.timestamp(), limit: 1000 }]);
        let query = pages[0].query(86_400);
        assert_eq!(query[2], ("end", now.timestamp().to_string()));
    }

    #[test]
    fn parse_ticker_ok() {
        let body: Json = serde_json::from_str(
            r#"{
                "timestamp": "1767225600", "open": "87000", "high": "88950.5",
                "low": "86500", "last": "88100.25", "volume": "1534.2",
                "vwap": "87800.1", "bid": "88099", "ask": "88101",
                "open_24": "86900", "percent_change_24": "1.38"
            }"#,
        )
        .unwrap();
        let ticker = parse_ticker("btcusd", &body).unwrap();
        assert_eq!(ticker.symbol, "btcusd");
        assert!((ticker.last - 88_100.25).abs() < f64::EPSILON);
        assert_eq!(ticker.percent_change_24h, Some(1.38));
    }

    #[test]
    fn parse_ticker_requires_last_price() {
        let body: Json = serde_json::from_str(r#"{ "timestamp": "1767225600" }"#).unwrap();
        assert!(parse_ticker("btcusd", &body).is_err());
    }

    #[test]
    fn parse_ohlc_ok() {
        let body: Json = serde_json::from_str(
            r#"{"data":{"pair":"BTC/USD","ohlc":[
                {"timestamp":"1767225600","open":"87000","high":"88000","low":"86000","close":"87500","volume":"12.6"},
                {"timestamp":"1767312000","open":"87500","high":"89000","low":"87000","close":"88800","volume":"9.2"}
            ]}}"#,
        )
        .unwrap();
        let samples = parse_bars(&body).unwrap();
        let series = TimeSeries::new("btcusd", Period::Month1, Interval::Day1, samples).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes().present(), vec![87_500.0, 88_800.0]);
        assert_eq!(series.samples()[0].volume, Some(13));
    }

    #[test]
    fn parse_ohlc_empty_has_no_bars() {
        let body: Json =
            serde_json::from_str(r#"{"data":{"pair":"BTC/USD","ohlc":[]}}"#).unwrap();
        assert!(parse_bars(&body).unwrap().is_empty());
    }
}
