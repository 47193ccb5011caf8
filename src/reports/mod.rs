// =============================================================================
// Reports — HTML market summaries delivered by e-mail
// =============================================================================

pub mod mailer;
pub mod render;
pub mod scheduler;

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::insights::InsightConfig;
use crate::market_data::{Interval, Period};
use crate::service::InsightService;
use crate::types::ReportType;

pub use mailer::{mailer_from_settings, validate_email, EmailMessage, Mailer};
pub use render::{render_market_summary, report_subject};
pub use scheduler::{ReportSchedule, ReportScheduler};

/// Collect, analyse, render and send one report.
pub struct ReportService {
    insights: InsightService,
    mailer: Arc<dyn Mailer>,
    config: InsightConfig,
    default_period: Period,
    interval: Interval,
}

impl ReportService {
    pub fn new(
        insights: InsightService,
        mailer: Arc<dyn Mailer>,
        config: InsightConfig,
        default_period: Period,
        interval: Interval,
    ) -> Self {
        Self {
            insights,
            mailer,
            config,
            default_period,
            interval,
        }
    }

    /// Report with the service's default indicator set.
    pub async fn send_report(
        &self,
        email: &str,
        symbol: &str,
        period: Option<Period>,
        report_type: ReportType,
    ) -> Result<(), ServiceError> {
        let config = self.config.clone();
        self.send_report_with(email, symbol, period, report_type, &config)
            .await
    }

    #[instrument(skip(self, config), name = "reports::send")]
    pub async fn send_report_with(
        &self,
        email: &str,
        symbol: &str,
        period: Option<Period>,
        report_type: ReportType,
        config: &InsightConfig,
    ) -> Result<(), ServiceError> {
        validate_email(email)?;
        let period = period.unwrap_or(self.default_period);

        let analysis = self
            .insights
            .analyze(symbol, period, self.interval, config)
            .await?;

        let message = EmailMessage {
            to: email.to_string(),
            subject: report_subject(symbol),
            html: render_market_summary(&analysis.bundle, report_type),
        };
        self.mailer.send(&message).await.map_err(ServiceError::Mail)?;

        info!(symbol, report_type = %report_type, "report delivered");
        Ok(())
    }
}
