// =============================================================================
// Tagged value tree + sanitization pass
// =============================================================================
//
// Every indicator emits its output as a `Value`. Before a bundle leaves the
// engine, `sanitize` walks the tree once:
//   - non-finite numbers (NaN, ±Inf) become `Null`
//   - integers are folded into the canonical `Number(f64)` representation
// so downstream consumers see exactly one numeric type and never a value that
// JSON cannot represent.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Integer(i64),
    Category(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn category(label: impl Into<String>) -> Self {
        Self::Category(label.into())
    }

    /// `Number` for `Some`, `Null` for `None`.
    pub fn optional(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// True when no leaf anywhere in the tree is a non-finite number or an
    /// un-normalized integer.
    pub fn is_sanitized(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            Self::Integer(_) => false,
            Self::List(items) => items.iter().all(Value::is_sanitized),
            Self::Map(entries) => entries.values().all(Value::is_sanitized),
            Self::Null | Self::Category(_) | Self::Timestamp(_) => true,
        }
    }
}

/// Recursively replace non-finite numbers with `Null` and normalize integers
/// to `Number`.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_finite() => Value::Number(n),
        Value::Number(_) => Value::Null,
        Value::Integer(i) => Value::Number(i as f64),
        Value::List(items) => Value::List(items.into_iter().map(sanitize).collect()),
        Value::Map(entries) => {
            Value::Map(entries.into_iter().map(|(k, v)| (k, sanitize(v))).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(sanitize(Value::Number(f64::NAN)), Value::Null);
        assert_eq!(sanitize(Value::Number(f64::INFINITY)), Value::Null);
        assert_eq!(sanitize(Value::Number(f64::NEG_INFINITY)), Value::Null);
        assert_eq!(sanitize(Value::Number(1.5)), Value::Number(1.5));
    }

    #[test]
    fn integers_fold_into_numbers() {
        assert_eq!(sanitize(Value::Integer(42)), Value::Number(42.0));
    }

    #[test]
    fn nested_trees_are_walked() {
        let tree = Value::map([
            ("a", Value::List(vec![Value::Number(f64::NAN), Value::Integer(3)])),
            ("b", Value::map([("c", Value::Number(f64::INFINITY))])),
            ("d", Value::category("up")),
        ]);
        assert!(!tree.is_sanitized());

        let clean = sanitize(tree);
        assert!(clean.is_sanitized());
        assert_eq!(
            clean.get("a").and_then(Value::as_list),
            Some(&[Value::Null, Value::Number(3.0)][..])
        );
        assert_eq!(clean.get("b").and_then(|b| b.get("c")), Some(&Value::Null));
        assert_eq!(clean.get("d").and_then(Value::as_str), Some("up"));
    }

    #[test]
    fn serializes_without_tags() {
        let tree = Value::map([
            ("n", Value::Number(2.5)),
            ("z", Value::Null),
            ("t", Value::category("flat")),
        ]);
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"n":2.5,"t":"flat","z":null}"#);
    }
}
