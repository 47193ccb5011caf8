// =============================================================================
// Report Scheduler — recurring e-mail reports
// =============================================================================
//
// Schedules live in memory. A tokio task ticks on a fixed interval, takes
// every schedule whose `next_run` has passed, advances it, and hands it to the
// report service. A failing report is logged and retried at its next slot,
// never on the next tick.
//
// Times are HH:MM in UTC. Weekly reports go out on Mondays.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, Utc, Weekday};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::InsightError;
use crate::reports::mailer::validate_email;
use crate::reports::ReportService;
use crate::types::{ReportFrequency, ReportType};

/// Parse "HH:MM" (24h).
pub fn parse_time(text: &str) -> Result<NaiveTime, InsightError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| {
        InsightError::invalid("time", format!("'{text}' is not a valid HH:MM time"))
    })
}

/// First slot strictly after `now`.
pub fn next_run_after(
    frequency: ReportFrequency,
    time: NaiveTime,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let today = now.date_naive();
    (0..=7)
        .map(|offset| today + ChronoDuration::days(offset))
        .filter(|date| match frequency {
            ReportFrequency::Daily => true,
            ReportFrequency::Weekly => date.weekday() == Weekday::Mon,
        })
        .map(|date| date.and_time(time).and_utc())
        .find(|candidate| *candidate > now)
        .unwrap_or_else(|| today.and_time(time).and_utc() + ChronoDuration::days(7))
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&time.format("%H:%M").to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSchedule {
    pub id: Uuid,
    pub email: String,
    pub symbol: String,
    pub frequency: ReportFrequency,
    #[serde(serialize_with = "serialize_hhmm")]
    pub time: NaiveTime,
    pub report_type: ReportType,
    pub created_at: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
}

#[derive(Default)]
pub struct ReportScheduler {
    schedules: RwLock<Vec<ReportSchedule>>,
}

impl ReportScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a schedule.
    pub fn add(
        &self,
        email: &str,
        symbol: &str,
        frequency: ReportFrequency,
        time: &str,
        now: DateTime<Utc>,
    ) -> Result<ReportSchedule, InsightError> {
        validate_email(email)?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(InsightError::invalid("symbol", "must not be empty"));
        }
        let time = parse_time(time)?;

        let schedule = ReportSchedule {
            id: Uuid::new_v4(),
            email: email.to_string(),
            symbol: symbol.to_string(),
            frequency,
            time,
            report_type: ReportType::Summary,
            created_at: now,
            last_run: None,
            next_run: next_run_after(frequency, time, now),
        };

        info!(
            id = %schedule.id,
            symbol = %schedule.symbol,
            frequency = %frequency,
            next_run = %schedule.next_run,
            "report scheduled"
        );
        self.schedules.write().push(schedule.clone());
        Ok(schedule)
    }

    pub fn list(&self) -> Vec<ReportSchedule> {
        self.schedules.read().clone()
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut schedules = self.schedules.write();
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        schedules.len() != before
    }

    /// Schedules due at `now`, each already advanced to its next slot.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<ReportSchedule> {
        let mut due = Vec::new();
        for schedule in self.schedules.write().iter_mut() {
            if schedule.next_run <= now {
                schedule.last_run = Some(now);
                schedule.next_run = next_run_after(schedule.frequency, schedule.time, now);
                due.push(schedule.clone());
            }
        }
        due
    }

    /// Run every due schedule once.
    pub async fn run_due(&self, service: &ReportService, now: DateTime<Utc>) -> usize {
        let due = self.take_due(now);
        for schedule in &due {
            match service
                .send_report(&schedule.email, &schedule.symbol, None, schedule.report_type)
                .await
            {
                Ok(()) => info!(id = %schedule.id, symbol = %schedule.symbol, "scheduled report sent"),
                Err(e) => error!(
                    id = %schedule.id,
                    symbol = %schedule.symbol,
                    error = %e,
                    next_run = %schedule.next_run,
                    "scheduled report failed"
                ),
            }
        }
        due.len()
    }

    /// Tick forever on `interval`.
    pub fn spawn(self: Arc<Self>, service: Arc<ReportService>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let ran = self.run_due(&service, Utc::now()).await;
                if ran > 0 {
                    debug!(ran, "scheduler tick");
                }
            }
        })
    }
}
