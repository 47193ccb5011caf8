// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// JSON in, JSON out. Request strings (period, interval, indicator names,
// frequency) are parsed here so every bad value surfaces as a 400 with the
// same error body. Failed requests are recorded in the state's error log.
//
// CORS is configured permissively; the API is meant to sit behind a
// dashboard served from another origin.
// =============================================================================

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::error::{InsightError, ServiceError};
use crate::insights::{IndicatorKind, InsightConfig};
use crate::market_data::{Interval, Period};
use crate::types::{ReportFrequency, ReportType};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        // ── Market data & insights ──────────────────────────────────
        .route("/api/stock/data", post(stock_data))
        .route("/api/stock/analysis", post(stock_analysis))
        .route("/api/crypto/data", post(crypto_data))
        // ── Chatbot ─────────────────────────────────────────────────
        .route("/api/query", post(process_query))
        .route("/api/conversation/history", get(conversation_history))
        // ── Reports ─────────────────────────────────────────────────
        .route("/api/reports/email", post(send_email_report))
        .route("/api/reports/schedule", post(schedule_report).get(list_schedules))
        .route("/api/reports/schedule/:id", delete(cancel_schedule))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

/// Log and remember a failed request.
fn record(state: &AppState, err: impl Into<ApiError>) -> ApiError {
    let err = err.into();
    warn!(status = err.status.as_u16(), error = %err.message, "request failed");
    state.push_error(err.message.clone(), err.status.as_u16());
    err
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

// =============================================================================
// Request parsing helpers
// =============================================================================

fn parse_or<T>(value: Option<&str>, default: T) -> Result<T, InsightError>
where
    T: FromStr<Err = InsightError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse(),
        None => Ok(default),
    }
}

fn require_symbol(symbol: &str) -> Result<&str, InsightError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(InsightError::invalid("symbol", "must not be empty"));
    }
    Ok(symbol)
}

/// Server defaults, overlaid with per-request `params` and narrowed to
/// `indicators` when given.
fn request_config(
    base: &InsightConfig,
    indicators: Option<&[String]>,
    params: Option<&serde_json::Value>,
) -> Result<InsightConfig, InsightError> {
    let mut config = match params {
        Some(serde_json::Value::Object(overrides)) => {
            let mut merged = serde_json::to_value(base)
                .map_err(|e| InsightError::invalid("params", e.to_string()))?;
            if let serde_json::Value::Object(fields) = &mut merged {
                for (key, value) in overrides {
                    fields.insert(key.clone(), value.clone());
                }
            }
            serde_json::from_value(merged)
                .map_err(|e| InsightError::invalid("params", e.to_string()))?
        }
        Some(serde_json::Value::Null) | None => base.clone(),
        Some(_) => return Err(InsightError::invalid("params", "must be a JSON object")),
    };

    if let Some(names) = indicators {
        let kinds = names
            .iter()
            .map(|n| n.trim().parse::<IndicatorKind>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        config = config.with_indicators(kinds);
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// Service banner & health
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Market Insight API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health())
}

// =============================================================================
// Stock data & analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct StockRequest {
    symbol: String,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    interval: Option<String>,
    /// Data only: keep the most recent `limit` samples.
    #[serde(default)]
    limit: Option<usize>,
    /// Analysis only: restrict to these indicators.
    #[serde(default)]
    indicators: Option<Vec<String>>,
    /// Analysis only: override indicator parameters.
    #[serde(default)]
    params: Option<serde_json::Value>,
}

impl StockRequest {
    fn resolve(&self, state: &AppState) -> Result<(String, Period, Interval), InsightError> {
        let config = state.runtime_config.read();
        Ok((
            require_symbol(&self.symbol)?.to_string(),
            parse_or(self.period.as_deref(), config.default_period)?,
            parse_or(self.interval.as_deref(), config.default_interval)?,
        ))
    }
}

async fn stock_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (symbol, period, interval) = req.resolve(&state).map_err(|e| record(&state, e))?;
    if req.limit == Some(0) {
        return Err(record(
            &state,
            InsightError::invalid("limit", "must be greater than zero"),
        ));
    }

    let mut series = state
        .insights
        .series(&symbol, period, interval)
        .await
        .map_err(|e| record(&state, e))?;
    if let Some(limit) = req.limit {
        series = series.tail(limit);
    }

    info!(symbol = %symbol, samples = series.len(), "stock data served");
    Ok(Json(json!({
        "symbol": symbol,
        "timestamp": now(),
        "data": series.samples(),
    })))
}

async fn stock_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (symbol, period, interval) = req.resolve(&state).map_err(|e| record(&state, e))?;
    let base = state.runtime_config.read().insight.clone();
    let config = request_config(&base, req.indicators.as_deref(), req.params.as_ref())
        .map_err(|e| record(&state, e))?;

    let analysis = state
        .insights
        .analyze(&symbol, period, interval, &config)
        .await
        .map_err(|e| record(&state, e))?;
    state.record_analysis();

    Ok(Json(json!({
        "timestamp": now(),
        "symbol": symbol,
        "data": analysis.series.samples(),
        "insights": analysis.bundle,
    })))
}

// =============================================================================
// Crypto ticker
// =============================================================================

#[derive(Debug, Deserialize)]
struct CryptoQuery {
    #[serde(default = "default_crypto_symbol")]
    symbol: String,
}

fn default_crypto_symbol() -> String {
    "btcusd".to_string()
}

async fn crypto_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CryptoQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let symbol = require_symbol(&query.symbol)
        .map_err(|e| record(&state, e))?
        .to_string();

    let ticker = state
        .insights
        .collector()
        .fetch_crypto_ticker(&symbol)
        .await
        .map_err(|e| record(&state, ServiceError::from_collector(e)))?
        .ok_or_else(|| {
            record(
                &state,
                ApiError::not_found(format!("no data found for crypto symbol {symbol}")),
            )
        })?;

    Ok(Json(json!({
        "symbol": symbol,
        "timestamp": now(),
        "data": ticker,
    })))
}

// =============================================================================
// Chatbot
// =============================================================================

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    symbol: String,
    #[serde(default)]
    period: Option<String>,
}

async fn process_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (symbol, period, interval, base) = {
        let config = state.runtime_config.read();
        let symbol = require_symbol(&req.symbol).map(str::to_string);
        let period = parse_or(req.period.as_deref(), config.default_period);
        (symbol, period, config.default_interval, config.insight.clone())
    };
    let symbol = symbol.map_err(|e| record(&state, e))?;
    let period = period.map_err(|e| record(&state, e))?;

    let kinds = state.query_router.plan(&req.query, &symbol);
    let config = base.with_indicators(kinds.iter().copied());

    let analysis = match state.insights.analyze(&symbol, period, interval, &config).await {
        Ok(analysis) => analysis,
        Err(e) => {
            let reply = match &e {
                ServiceError::NotFound { .. } => format!("I couldn't find any data for {symbol}."),
                other => format!("Sorry, I couldn't analyse {symbol} right now ({other})."),
            };
            state.query_router.respond_text(&symbol, reply);
            return Err(record(&state, e));
        }
    };
    state.record_analysis();

    let response = state.query_router.respond(&analysis.bundle, &config);
    Ok(Json(json!({
        "timestamp": now(),
        "query": req.query,
        "response": response,
        "symbol": symbol,
        "indicators": kinds.iter().map(IndicatorKind::as_str).collect::<Vec<_>>(),
    })))
}

async fn conversation_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history: Vec<String> = state
        .query_router
        .conversation()
        .history()
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(json!({ "timestamp": now(), "history": history }))
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Deserialize)]
struct EmailReportRequest {
    email: String,
    symbol: String,
    #[serde(default = "default_report_period")]
    period: String,
    #[serde(default)]
    report_type: Option<String>,
    /// Custom reports: indicators to include.
    #[serde(default)]
    indicators: Option<Vec<String>>,
}

fn default_report_period() -> String {
    "1d".to_string()
}

fn parse_report_type(value: Option<&str>) -> Result<ReportType, InsightError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("summary") => Ok(ReportType::Summary),
        Some("detailed") => Ok(ReportType::Detailed),
        Some("custom") => Ok(ReportType::Custom),
        Some(other) => Err(InsightError::invalid(
            "report_type",
            format!("unknown report type '{other}' (expected summary, detailed or custom)"),
        )),
    }
}

async fn send_email_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let base = state.runtime_config.read().insight.clone();
    let parsed = (|| {
        let symbol = require_symbol(&req.symbol)?.to_string();
        let period: Period = req.period.trim().parse()?;
        let report_type = parse_report_type(req.report_type.as_deref())?;
        let config = request_config(&base, req.indicators.as_deref(), None)?;
        Ok::<_, InsightError>((symbol, period, report_type, config))
    })();
    let (symbol, period, report_type, config) = parsed.map_err(|e| record(&state, e))?;

    state
        .reports
        .send_report_with(&req.email, &symbol, Some(period), report_type, &config)
        .await
        .map_err(|e| record(&state, e))?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Report sent to {}", req.email),
    })))
}

#[derive(Debug, Deserialize)]
struct ScheduleReportRequest {
    email: String,
    symbol: String,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default = "default_report_time")]
    time: String,
}

fn default_report_time() -> String {
    "16:30".to_string()
}

#[derive(Serialize)]
struct ScheduleResponse {
    status: &'static str,
    message: String,
    schedule: crate::reports::ReportSchedule,
}

async fn schedule_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let frequency = parse_or(req.frequency.as_deref(), ReportFrequency::Daily)
        .map_err(|e| record(&state, e))?;

    let schedule = state
        .scheduler
        .add(&req.email, &req.symbol, frequency, &req.time, Utc::now())
        .map_err(|e| record(&state, e))?;

    let message = format!(
        "Scheduled {} report for {} at {}",
        schedule.frequency,
        schedule.symbol,
        schedule.time.format("%H:%M")
    );
    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse {
            status: "success",
            message,
            schedule,
        }),
    ))
}

async fn list_schedules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "timestamp": now(), "schedules": state.scheduler.list() }))
}

async fn cancel_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.scheduler.remove(id) {
        return Err(record(&state, ApiError::not_found(format!("no schedule with id {id}"))));
    }
    info!(%id, "report schedule cancelled");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::mailer::tests::RecordingMailer;
    use crate::runtime_config::RuntimeConfig;
    use crate::service::tests::StubCollector;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value as Json;
    use tower::ServiceExt;

    fn app_with(mailer: Arc<RecordingMailer>) -> (Router, Arc<AppState>) {
        let mut config = RuntimeConfig::default();
        config.analysis_timeout_ms = 200;
        let state = Arc::new(AppState::new(
            config,
            Arc::new(StubCollector::default()),
            mailer,
        ));
        (router(state.clone()), state)
    }

    fn app() -> Router {
        app_with(Arc::new(RecordingMailer::default())).0
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(b) => {
                builder = builder.header("content-type", "application/json");
                Body::from(b.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Json::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn banner_and_health() {
        let (status, body) = call(app(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        let (status, body) = call(app(), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn stock_data_returns_samples() {
        let (status, body) =
            call(app(), "POST", "/api/stock/data", Some(json!({ "symbol": "AAPL" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "AAPL");
        assert_eq!(body["data"].as_array().unwrap().len(), 30);
        assert_eq!(body["data"][29]["close"], 129.0);
    }

    #[tokio::test]
    async fn stock_data_limit_keeps_latest_samples() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/data",
            Some(json!({ "symbol": "AAPL", "limit": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["close"], 127.0);
        assert_eq!(data[2]["close"], 129.0);

        let (status, _) = call(
            app(),
            "POST",
            "/api/stock/data",
            Some(json!({ "symbol": "AAPL", "limit": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analysis_returns_bundle() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "period": "1mo" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let insights = &body["insights"]["indicators"];
        assert_eq!(insights["sma"]["status"], "value");
        assert_eq!(insights["rsi"]["value"], 100.0);
        assert_eq!(insights["trend"]["value"], "up");
        assert_eq!(insights["anomalies"]["value"], json!([]));
    }

    #[tokio::test]
    async fn analysis_honours_selection_and_params() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({
                "symbol": "AAPL",
                "indicators": ["sma"],
                "params": { "sma_window": 5 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let insights = body["insights"]["indicators"].as_object().unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights["sma"]["value"], 127.0);
    }

    #[tokio::test]
    async fn bad_parameters_are_400() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "period": "7w" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("period"));

        let (status, _) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "params": { "rsi_lookback": 0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "indicators": ["macd"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn misspelled_param_is_400() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "params": { "rsi_period": 7 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("rsi_period"));
    }

    #[tokio::test]
    async fn huge_lookback_reports_insufficient_data() {
        let (status, body) = call(
            app(),
            "POST",
            "/api/stock/analysis",
            Some(json!({ "symbol": "AAPL", "params": { "rsi_lookback": u64::MAX } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rsi = &body["insights"]["indicators"]["rsi"];
        assert_eq!(rsi["status"], "insufficient_data");
        assert_eq!(rsi["available"], 30);
    }

    #[tokio::test]
    async fn collector_outcomes_map_to_statuses() {
        let (status, _) =
            call(app(), "POST", "/api/stock/data", Some(json!({ "symbol": "MISSING" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            call(app(), "POST", "/api/stock/data", Some(json!({ "symbol": "BROKEN" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) =
            call(app(), "POST", "/api/stock/analysis", Some(json!({ "symbol": "SLOW" }))).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn failures_land_in_health_error_log() {
        let (app, state) = app_with(Arc::new(RecordingMailer::default()));
        let (status, _) =
            call(app, "POST", "/api/stock/data", Some(json!({ "symbol": "MISSING" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let health = state.health();
        assert_eq!(health.recent_errors.len(), 1);
        assert_eq!(health.recent_errors[0].status, 404);
    }

    #[tokio::test]
    async fn crypto_ticker() {
        let (status, body) = call(app(), "POST", "/api/crypto/data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "btcusd");
        assert_eq!(body["data"]["last"], 88_100.25);

        let (status, _) = call(app(), "POST", "/api/crypto/data?symbol=dogeeur", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn query_answers_and_records_history() {
        let (app, _state) = app_with(Arc::new(RecordingMailer::default()));
        let (status, body) = call(
            app.clone(),
            "POST",
            "/api/query",
            Some(json!({ "query": "Is it overbought?", "symbol": "AAPL" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicators"], json!(["rsi"]));
        assert!(body["response"].as_str().unwrap().contains("overbought"));

        let (status, body) = call(app, "GET", "/api/conversation/history", None).await;
        assert_eq!(status, StatusCode::OK);
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].as_str().unwrap().contains("user: Is it overbought?"));
    }

    #[tokio::test]
    async fn query_for_unknown_symbol_still_replies() {
        let (app, state) = app_with(Arc::new(RecordingMailer::default()));
        let (status, _) = call(
            app,
            "POST",
            "/api/query",
            Some(json!({ "query": "trend?", "symbol": "MISSING" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let history = state.query_router.conversation().history();
        assert_eq!(history.len(), 2);
        assert!(history[1].content.contains("couldn't find any data for MISSING"));
    }

    #[tokio::test]
    async fn email_report_is_sent() {
        let mailer = Arc::new(RecordingMailer::default());
        let (app, _) = app_with(mailer.clone());
        let (status, body) = call(
            app,
            "POST",
            "/api/reports/email",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL", "report_type": "detailed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Report sent to ana@example.com");
        assert_eq!(mailer.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn email_report_failures() {
        let (status, _) = call(
            app(),
            "POST",
            "/api/reports/email",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL", "report_type": "weekly" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let failing = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let (app, _) = app_with(failing);
        let (status, _) = call(
            app,
            "POST",
            "/api/reports/email",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn schedules_can_be_created_listed_and_cancelled() {
        let (app, _) = app_with(Arc::new(RecordingMailer::default()));
        let (status, body) = call(
            app.clone(),
            "POST",
            "/api/reports/schedule",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL", "frequency": "weekly", "time": "08:15" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Scheduled weekly report for AAPL at 08:15");
        let id = body["schedule"]["id"].as_str().unwrap().to_string();

        let (_, body) = call(app.clone(), "GET", "/api/reports/schedule", None).await;
        assert_eq!(body["schedules"].as_array().unwrap().len(), 1);

        let uri = format!("/api/reports/schedule/{id}");
        let (status, _) = call(app.clone(), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn schedule_validation() {
        let (status, _) = call(
            app(),
            "POST",
            "/api/reports/schedule",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL", "time": "25:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            app(),
            "POST",
            "/api/reports/schedule",
            Some(json!({ "email": "ana@example.com", "symbol": "AAPL", "frequency": "hourly" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
