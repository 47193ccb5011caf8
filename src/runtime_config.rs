// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Every tunable of the service lives here: bind address, request defaults,
// indicator parameters, upstream endpoints and mail delivery.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file. Secrets (the mail API key) are
// only ever read from the environment and are never written back.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::insights::InsightConfig;
use crate::market_data::{Interval, Period};

pub const ENV_BIND_ADDR: &str = "INSIGHT_BIND_ADDR";
pub const ENV_MAIL_API_URL: &str = "INSIGHT_MAIL_API_URL";
pub const ENV_MAIL_API_KEY: &str = "INSIGHT_MAIL_API_KEY";
pub const ENV_MAIL_FROM: &str = "INSIGHT_MAIL_FROM";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_analysis_timeout_ms() -> u64 {
    5_000
}

fn default_collector_timeout_ms() -> u64 {
    10_000
}

fn default_max_conversation_history() -> usize {
    100
}

fn default_scheduler_tick_secs() -> u64 {
    30
}

fn default_equities_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_crypto_base_url() -> String {
    "https://www.bitstamp.net".to_string()
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_mail_from() -> String {
    "Market Insight <reports@localhost>".to_string()
}

// =============================================================================
// MailSettings
// =============================================================================

/// Outbound mail delivery through a transactional-mail HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    /// Bearer key. When absent, reports are logged instead of sent.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Sender address shown to recipients.
    #[serde(default = "default_mail_from")]
    pub from: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_url: default_mail_api_url(),
            api_key: None,
            from: default_mail_from(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Server -------------------------------------------------------------

    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Upper bound on one analysis (collect + assemble) in milliseconds.
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,

    // --- Request defaults ---------------------------------------------------

    #[serde(default)]
    pub default_period: Period,

    #[serde(default)]
    pub default_interval: Interval,

    /// Indicator selection and parameters used when a request gives none.
    #[serde(default)]
    pub insight: InsightConfig,

    // --- Chatbot & reports --------------------------------------------------

    /// Number of messages kept in the conversation history.
    #[serde(default = "default_max_conversation_history")]
    pub max_conversation_history: usize,

    /// How often the report scheduler checks for due schedules.
    #[serde(default = "default_scheduler_tick_secs")]
    pub scheduler_tick_secs: u64,

    #[serde(default)]
    pub mail: MailSettings,

    // --- Upstream data sources ----------------------------------------------

    #[serde(default = "default_equities_base_url")]
    pub equities_base_url: String,

    #[serde(default = "default_crypto_base_url")]
    pub crypto_base_url: String,

    /// Per-request timeout for upstream market data calls.
    #[serde(default = "default_collector_timeout_ms")]
    pub collector_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            default_period: Period::default(),
            default_interval: Interval::default(),
            insight: InsightConfig::default(),
            max_conversation_history: default_max_conversation_history(),
            scheduler_tick_secs: default_scheduler_tick_secs(),
            mail: MailSettings::default(),
            equities_base_url: default_equities_base_url(),
            crypto_base_url: default_crypto_base_url(),
            collector_timeout_ms: default_collector_timeout_ms(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .insight
            .validate()
            .with_context(|| format!("invalid insight settings in {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            default_period = %config.default_period,
            indicators = config.insight.indicators.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Load from `path`, or fall back to defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "using default runtime config");
                Self::default()
            }
        }
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `INSIGHT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get(ENV_BIND_ADDR) {
            self.bind_addr = addr;
        }
        if let Some(url) = get(ENV_MAIL_API_URL) {
            self.mail.api_url = url;
        }
        if let Some(key) = get(ENV_MAIL_API_KEY) {
            self.mail.api_key = Some(key);
        }
        if let Some(from) = get(ENV_MAIL_FROM) {
            self.mail.from = from;
        }
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_millis(self.collector_timeout_ms)
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick_secs.max(1))
    }
}
