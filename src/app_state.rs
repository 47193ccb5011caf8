// =============================================================================
// Central Application State — Market Insight Service
// =============================================================================
//
// Ties the collaborators together for the HTTP layer and the scheduler:
// the insight service (collector + engine), the query router with its
// conversation history, and the report service with its schedules.
//
// Thread safety:
//   - Atomic counters for lock-free request accounting.
//   - parking_lot::RwLock for the shared config and error log.
//   - Arc wrappers for collaborators that manage their own interior
//     mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::chatbot::QueryRouter;
use crate::collector::DataCollector;
use crate::reports::{Mailer, ReportScheduler, ReportService};
use crate::runtime_config::RuntimeConfig;
use crate::service::InsightService;

// =============================================================================
// Error Record
// =============================================================================

/// A failed request, kept for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// HTTP status the request ended with.
    pub status: u16,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

// =============================================================================
// AppState
// =============================================================================

/// Shared across all handlers and background tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Collaborators ───────────────────────────────────────────────────
    pub insights: InsightService,
    pub query_router: QueryRouter,
    pub reports: Arc<ReportService>,
    pub scheduler: Arc<ReportScheduler>,

    // ── Accounting ──────────────────────────────────────────────────────
    /// Bundles handed out by the analysis and query endpoints.
    pub analyses_served: AtomicU64,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the collaborators from `config`. The collector and mailer are
    /// injected so tests can substitute stubs.
    pub fn new(
        config: RuntimeConfig,
        collector: Arc<dyn DataCollector>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let insights = InsightService::new(collector, config.analysis_timeout());
        let reports = ReportService::new(
            insights.clone(),
            mailer,
            config.insight.clone(),
            config.default_period,
            config.default_interval,
        );

        Self {
            query_router: QueryRouter::new(config.max_conversation_history),
            insights,
            reports: Arc::new(reports),
            scheduler: Arc::new(ReportScheduler::new()),
            runtime_config: Arc::new(RwLock::new(config)),
            analyses_served: AtomicU64::new(0),
            recent_errors: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    pub fn record_analysis(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a failed request. The log is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted first.
    pub fn push_error(&self, message: String, status: u16) {
        let record = ErrorRecord {
            message,
            status,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: self.start_time.elapsed().as_secs(),
            analyses_served: self.analyses_served.load(Ordering::Relaxed),
            conversation_messages: self.query_router.conversation().len(),
            scheduled_reports: self.scheduler.list().len(),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}

/// Payload of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub analyses_served: u64,
    pub conversation_messages: usize,
    pub scheduled_reports: usize,
    pub recent_errors: Vec<ErrorRecord>,
}
