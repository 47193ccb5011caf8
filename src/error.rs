// =============================================================================
// Error taxonomy for the insight engine
// =============================================================================
//
// Structural errors (`InsightError`) abort a whole request before any
// indicator runs. `IndicatorFailure` is scoped to a single indicator and is
// always caught by the assembler, never propagated to the caller.
// `ServiceError` is what the collaborators around the engine (collector,
// mailer, timeouts) can add on top; the HTTP layer maps it to a status.
// =============================================================================

use std::time::Duration;

use thiserror::Error;

/// Fatal, request-level errors raised before computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsightError {
    #[error("malformed series at sample {index}: {reason}")]
    MalformedSeries { index: usize, reason: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl InsightError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedSeries {
            index,
            reason: reason.into(),
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Unexpected fault inside one indicator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("indicator `{indicator}` failed: {reason}")]
pub struct IndicatorFailure {
    pub indicator: String,
    pub reason: String,
}

impl IndicatorFailure {
    pub fn new(indicator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of an end-to-end operation (collect, analyse, deliver).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no data found for symbol {symbol}")]
    NotFound { symbol: String },

    #[error(transparent)]
    Insight(#[from] InsightError),

    #[error("market data source failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error("mail delivery failed: {0:#}")]
    Mail(anyhow::Error),

    #[error("operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound {
            symbol: symbol.into(),
        }
    }

    /// Collector errors that wrap an `InsightError` (bad interval for the
    /// source, malformed payload) keep their structural meaning.
    pub fn from_collector(err: anyhow::Error) -> Self {
        match err.downcast::<InsightError>() {
            Ok(insight) => Self::Insight(insight),
            Err(other) => Self::Upstream(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_names_the_sample() {
        let err = InsightError::malformed(3, "duplicate timestamp");
        assert_eq!(
            err.to_string(),
            "malformed series at sample 3: duplicate timestamp"
        );
    }

    #[test]
    fn invalid_parameter_message() {
        let err = InsightError::invalid("rsi.lookback", "must be greater than zero");
        assert!(err.to_string().contains("rsi.lookback"));
    }

    #[test]
    fn collector_errors_keep_structural_meaning() {
        let wrapped = anyhow::Error::new(InsightError::invalid("interval", "not supported"));
        assert!(matches!(
            ServiceError::from_collector(wrapped),
            ServiceError::Insight(InsightError::InvalidParameter { .. })
        ));

        let network = anyhow::anyhow!("connection reset");
        let err = ServiceError::from_collector(network);
        assert!(matches!(err, ServiceError::Upstream(_)));
        assert_eq!(err.to_string(), "market data source failed: connection reset");
    }

    #[test]
    fn timeout_message_reports_millis() {
        let err = ServiceError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "operation timed out after 1500ms");
    }
}
