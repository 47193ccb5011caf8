// =============================================================================
// Mail delivery
// =============================================================================
//
// `HttpMailer` posts to a transactional-mail HTTP API:
//
//   POST {api_url}
//   Authorization: Bearer {api_key}
//   { "from": "...", "to": ["..."], "subject": "...", "html": "..." }
//
// `LogMailer` stands in when no API key is configured so the rest of the
// report pipeline still runs end to end.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::InsightError;
use crate::runtime_config::MailSettings;

/// One outgoing e-mail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Basic shape check: one `@`, non-empty local part, dotted domain, no
/// whitespace.
pub fn validate_email(address: &str) -> Result<(), InsightError> {
    let invalid = || InsightError::invalid("email", format!("'{address}' is not a valid e-mail address"));
    if address.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = address.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}

// =============================================================================
// HttpMailer
// =============================================================================

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build mail HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, message), fields(to = %message.to), name = "mailer::send")]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendRequest {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {} request failed", self.api_url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("mail API returned {status}: {text}");
        }

        info!(to = %message.to, subject = %message.subject, "report e-mail sent");
        Ok(())
    }
}

// =============================================================================
// LogMailer
// =============================================================================

/// Logs instead of sending.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "mail delivery not configured, report logged only"
        );
        Ok(())
    }
}

/// `HttpMailer` when an API key is configured, `LogMailer` otherwise.
pub fn mailer_from_settings(settings: &MailSettings, timeout: Duration) -> Result<Arc<dyn Mailer>> {
    match settings.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Ok(Arc::new(HttpMailer::new(
            settings.api_url.clone(),
            key,
            settings.from.clone(),
            timeout,
        )?)),
        None => Ok(Arc::new(LogMailer)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Keeps every message; fails on demand.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<EmailMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            if self.fail {
                anyhow::bail!("smtp relay refused the message");
            }
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.org").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("ana@ex ample.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn request_body_shape() {
        let body = SendRequest {
            from: "desk@example.com",
            to: ["ana@example.com"],
            subject: "Report",
            html: "<p>hi</p>",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "ana@example.com");
        assert_eq!(json["html"], "<p>hi</p>");
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let msg = EmailMessage {
            to: "ana@example.com".into(),
            subject: "s".into(),
            html: "<p/>".into(),
        };
        assert!(LogMailer.send(&msg).await.is_ok());
    }

    #[test]
    fn without_key_falls_back_to_log_mailer() {
        let settings = MailSettings::default();
        assert!(mailer_from_settings(&settings, Duration::from_secs(5)).is_ok());
    }
}
