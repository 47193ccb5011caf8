// =============================================================================
// Query Router — map free text to indicators and phrase the answer
// =============================================================================
//
// Keyword routing only: each indicator owns a list of trigger fragments that
// are matched against the lower-cased query. A query that matches nothing
// gets the full indicator set.
// =============================================================================

use std::collections::BTreeSet;

use crate::chatbot::conversation::{Conversation, Role};
use crate::indicators::rsi::rsi_label;
use crate::insights::{IndicatorKind, IndicatorResult, InsightBundle, InsightConfig, Value};

const ROUTES: &[(IndicatorKind, &[&str])] = &[
    (
        IndicatorKind::PriceSummary,
        &["price", "summary", "overview", "performance", "change", "high", "low", "doing"],
    ),
    (IndicatorKind::Sma, &["average", "sma", "moving"]),
    (IndicatorKind::EmaShort, &["average", "ema", "moving"]),
    (IndicatorKind::EmaLong, &["average", "ema", "moving"]),
    (IndicatorKind::Volatility, &["volatil", "risk", "swing", "stable"]),
    (
        IndicatorKind::Rsi,
        &["rsi", "momentum", "overbought", "oversold", "strength"],
    ),
    (
        IndicatorKind::Trend,
        &["trend", "direction", "bullish", "bearish", "heading", "outlook"],
    ),
    (
        IndicatorKind::Anomalies,
        &["anomal", "unusual", "spike", "outlier", "abnormal", "crash"],
    ),
    (IndicatorKind::RateOfChange, &["rate of change", "roc", "momentum"]),
];

/// Indicators relevant to `query`; all of them when nothing matches.
pub fn route_query(query: &str) -> BTreeSet<IndicatorKind> {
    let text = query.to_lowercase();
    let matched: BTreeSet<IndicatorKind> = ROUTES
        .iter()
        .filter(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(kind, _)| *kind)
        .collect();

    if matched.is_empty() {
        IndicatorKind::ALL.into_iter().collect()
    } else {
        matched
    }
}

/// Plain-text answer built from the bundle, one sentence per indicator.
pub fn render_answer(bundle: &InsightBundle, config: &InsightConfig) -> String {
    if bundle.sample_count() == 0 {
        return format!(
            "I found {} but there is no market data for the last {}.",
            bundle.symbol(),
            bundle.period()
        );
    }

    bundle
        .indicators()
        .iter()
        .map(|(name, result)| describe(name, result, bundle, config))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(name: &str, result: &IndicatorResult, bundle: &InsightBundle, cfg: &InsightConfig) -> String {
    let label = display_name(name, cfg);
    let value = match result {
        IndicatorResult::InsufficientData {
            required,
            available,
        } => {
            return format!(
                "Not enough data for {label} (needs {required} samples, have {available})."
            );
        }
        IndicatorResult::Unavailable { .. } => {
            return format!("{label} is unavailable right now.");
        }
        IndicatorResult::Value { value } => value,
    };

    if matches!(value, Value::Null) {
        return format!("{label} could not be computed for this data.");
    }

    match name {
        "price_summary" => describe_summary(bundle, value),
        "volatility" => match value.as_f64() {
            Some(v) => format!(
                "Volatility is {:.2}% per {} bar.",
                v * 100.0,
                bundle.interval()
            ),
            None => format!("{label} could not be computed for this data."),
        },
        "rsi" => match value.as_f64() {
            Some(v) => format!("{label} is {v:.1} ({}).", rsi_label(v).to_lowercase()),
            None => format!("{label} could not be computed for this data."),
        },
        "trend" => format!(
            "The trend is {} ({label}).",
            value.as_str().unwrap_or("unknown")
        ),
        "anomalies" => describe_anomalies(value),
        "rate_of_change" => match value.as_f64() {
            Some(v) => format!(
                "Price changed {v:+.2}% over the last {} bars.",
                cfg.roc_period
            ),
            None => format!("{label} could not be computed for this data."),
        },
        _ => match value.as_f64() {
            Some(v) => format!("The {label} is {v:.2}."),
            None => format!("{label}: {}", serde_json::to_string(value).unwrap_or_default()),
        },
    }
}

fn display_name(name: &str, cfg: &InsightConfig) -> String {
    match name {
        "price_summary" => "Price summary".to_string(),
        "sma" => format!("{}-period simple moving average", cfg.sma_window),
        "ema_short" => format!("{}-period EMA", cfg.ema_short_window),
        "ema_long" => format!("{}-period EMA", cfg.ema_long_window),
        "volatility" => "Volatility".to_string(),
        "rsi" => format!("RSI({})", cfg.rsi_lookback),
        "trend" => format!(
            "{} vs {} period average",
            cfg.ema_short_window, cfg.ema_long_window
        ),
        "anomalies" => "Anomaly scan".to_string(),
        "rate_of_change" => "Rate of change".to_string(),
        other => other.to_string(),
    }
}

fn describe_summary(bundle: &InsightBundle, value: &Value) -> String {
    let field = |key: &str| value.get(key).and_then(Value::as_f64);
    match (field("latest_close"), field("change_pct")) {
        (Some(last), Some(change)) => {
            let mut text = format!(
                "{} last closed at {last:.2} ({change:+.2}% over {}",
                bundle.symbol(),
                bundle.period()
            );
            if let (Some(high), Some(low)) = (field("period_high"), field("period_low")) {
                text.push_str(&format!(", range {low:.2} to {high:.2}"));
            }
            text.push_str(").");
            text
        }
        (Some(last), None) => format!("{} last closed at {last:.2}.", bundle.symbol()),
        _ => format!("No recent close is available for {}.", bundle.symbol()),
    }
}

fn describe_anomalies(value: &Value) -> String {
    let dates: Vec<String> = value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| match v {
            Value::Timestamp(ts) => Some(ts.format("%Y-%m-%d").to_string()),
            _ => None,
        })
        .collect();

    if dates.is_empty() {
        "No unusual price moves were detected.".to_string()
    } else {
        format!("Unusual price moves on {}.", dates.join(", "))
    }
}

/// Routes queries and records both sides of the exchange in the history.
pub struct QueryRouter {
    conversation: Conversation,
}

impl QueryRouter {
    pub fn new(max_history: usize) -> Self {
        Self {
            conversation: Conversation::new(max_history),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Record the user's question and pick the indicators it needs.
    pub fn plan(&self, query: &str, symbol: &str) -> BTreeSet<IndicatorKind> {
        self.conversation.push(Role::User, query, Some(symbol));
        route_query(query)
    }

    /// Phrase the answer and record it.
    pub fn respond(&self, bundle: &InsightBundle, config: &InsightConfig) -> String {
        let answer = render_answer(bundle, config);
        self.conversation
            .push(Role::Assistant, answer.clone(), Some(bundle.symbol()));
        answer
    }

    /// Record a failure reply (e.g. unknown symbol).
    pub fn respond_text(&self, symbol: &str, text: impl Into<String>) -> String {
        let text = text.into();
        self.conversation
            .push(Role::Assistant, text.clone(), Some(symbol));
        text
    }
}
