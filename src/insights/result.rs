use serde::Serialize;

use crate::insights::value::{sanitize, Value};

/// Outcome of a single indicator.
///
/// Serialized with a `status` tag so consumers can branch without inspecting
/// the payload:
/// `{"status":"value","value":..}`,
/// `{"status":"insufficient_data","required":14,"available":3}`,
/// `{"status":"unavailable","reason":".."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorResult {
    Value { value: Value },
    InsufficientData { required: usize, available: usize },
    Unavailable { reason: String },
}

impl IndicatorResult {
    pub fn value(value: Value) -> Self {
        Self::Value { value }
    }

    pub fn number(n: f64) -> Self {
        Self::Value {
            value: Value::Number(n),
        }
    }

    pub fn category(label: impl Into<String>) -> Self {
        Self::Value {
            value: Value::category(label),
        }
    }

    pub fn insufficient(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Apply the sanitization pass to the payload, if any.
    pub fn sanitized(self) -> Self {
        match self {
            Self::Value { value } => Self::Value {
                value: sanitize(value),
            },
            other => other,
        }
    }
}

/// Shared guard: `Some(InsufficientData)` when fewer than `required` samples
/// are available.
pub fn require(required: usize, available: usize) -> Option<IndicatorResult> {
    (available < required).then(|| IndicatorResult::insufficient(required, available))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&IndicatorResult::number(1.5)).unwrap();
        assert_eq!(json, r#"{"status":"value","value":1.5}"#);

        let json = serde_json::to_string(&IndicatorResult::insufficient(14, 3)).unwrap();
        assert_eq!(json, r#"{"status":"insufficient_data","required":14,"available":3}"#);

        let json = serde_json::to_string(&IndicatorResult::unavailable("boom")).unwrap();
        assert_eq!(json, r#"{"status":"unavailable","reason":"boom"}"#);
    }

    #[test]
    fn sanitized_nulls_payload() {
        let result = IndicatorResult::number(f64::NAN).sanitized();
        assert_eq!(result.as_value(), Some(&Value::Null));
    }

    #[test]
    fn require_guard() {
        assert!(require(5, 5).is_none());
        assert_eq!(require(5, 2), Some(IndicatorResult::insufficient(5, 2)));
    }
}
