// =============================================================================
// Equities — Yahoo Finance chart API
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={period}&interval={interval}
//
// Quote arrays contain `null` where the exchange reported nothing for a bar;
// those become absent sample fields. A `chart.error` with code "Not Found"
// (HTTP 404) means the symbol does not exist. A result without a `timestamp`
// array means the symbol exists but has no data in range.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use serde_json::Value as Json;
use tracing::{debug, instrument};

use crate::collector::Collected;
use crate::market_data::{Interval, Period, Sample, TimeSeries};

/// Fetch and parse one chart.
#[instrument(skip(client, base_url), name = "yahoo::fetch_chart")]
pub async fn fetch_chart(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<Collected> {
    let url = format!("{base_url}/v8/finance/chart/{symbol}");

    let resp = client
        .get(&url)
        .query(&[("range", period.as_str()), ("interval", interval.as_str())])
        .send()
        .await
        .with_context(|| format!("GET {url} request failed"))?;

    let status = resp.status();
    let body: Json = resp
        .json()
        .await
        .context("failed to parse chart response")?;

    if status == reqwest::StatusCode::NOT_FOUND {
        debug!(symbol, "chart API reports unknown symbol");
        return Ok(Collected::NotFound);
    }
    if !status.is_success() {
        anyhow::bail!("chart API returned {status}: {body}");
    }

    parse_chart(symbol, period, interval, &body)
}

/// Parse a chart envelope into a series (or "not found").
pub fn parse_chart(
    symbol: &str,
    period: Period,
    interval: Interval,
    body: &Json,
) -> Result<Collected> {
    let chart = body.get("chart").context("missing field chart")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Json::as_str).unwrap_or_default();
        if code.eq_ignore_ascii_case("not found") {
            return Ok(Collected::NotFound);
        }
        anyhow::bail!("chart API error: {err}");
    }

    let Some(result) = chart
        .get("result")
        .and_then(Json::as_array)
        .and_then(|r| r.first())
    else {
        return Ok(Collected::NotFound);
    };

    let Some(timestamps) = result.get("timestamp").and_then(Json::as_array) else {
        return Ok(Collected::Found(TimeSeries::empty(symbol, period, interval)));
    };

    let quote = result
        .pointer("/indicators/quote/0")
        .context("missing field indicators.quote[0]")?;

    let column = |name: &str| -> Vec<Option<f64>> {
        let values = quote.get(name).and_then(Json::as_array);
        (0..timestamps.len())
            .map(|i| values.and_then(|v| v.get(i)).and_then(Json::as_f64))
            .collect()
    };
    let (opens, highs, lows, closes, volumes) = (
        column("open"),
        column("high"),
        column("low"),
        column("close"),
        column("volume"),
    );

    let mut samples = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let secs = ts
            .as_i64()
            .with_context(|| format!("timestamp[{i}] is not an integer"))?;
        let timestamp = Utc
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("timestamp[{i}] out of range: {secs}"))?;
        samples.push(Sample {
            timestamp,
            open: opens[i],
            high: highs[i],
            low: lows[i],
            close: closes[i],
            volume: volumes[i].filter(|v| *v >= 0.0).map(|v| v.round() as u64),
        });
    }

    let series = TimeSeries::new(symbol, period, interval, samples)?;
    Ok(Collected::Found(series))
}
