// =============================================================================
// Market Insight Service — Main Entry Point
// =============================================================================
//
// Loads config, wires the collector, mailer and report scheduler into the
// shared state, then serves the REST API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chatbot;
mod collector;
mod error;
mod indicators;
mod insights;
mod market_data;
mod reports;
mod runtime_config;
mod service;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::collector::HttpCollector;
use crate::reports::mailer_from_settings;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "insight_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Market Insight Service starting up");

    let mut config = RuntimeConfig::load_or_default(CONFIG_PATH);
    config.apply_env_overrides();

    info!(
        bind_addr = %config.bind_addr,
        default_period = %config.default_period,
        default_interval = %config.default_interval,
        mail_enabled = config.mail.api_key.is_some(),
        "configuration resolved"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let collector = HttpCollector::new(
        config.equities_base_url.clone(),
        config.crypto_base_url.clone(),
        config.collector_timeout(),
    )?;
    let mailer = mailer_from_settings(&config.mail, config.collector_timeout())?;
    if config.mail.api_key.is_none() {
        warn!("no mail API key configured, reports will be logged instead of sent");
    }

    let bind_addr = config.bind_addr.clone();
    let tick = config.scheduler_tick();
    let state = Arc::new(AppState::new(config, Arc::new(collector), mailer));

    // ── 3. Report scheduler ──────────────────────────────────────────────
    let scheduler = state
        .scheduler
        .clone()
        .spawn(state.reports.clone(), tick);
    info!(tick_secs = tick.as_secs(), "report scheduler running");

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("shutdown signal received, stopping gracefully");
        })
        .await
        .context("API server failed")?;

    // ── 5. Shutdown ──────────────────────────────────────────────────────
    scheduler.abort();
    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "failed to save runtime config on shutdown");
    }

    info!("Market Insight Service shut down complete");
    Ok(())
}
