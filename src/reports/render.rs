// =============================================================================
// Report rendering — insight bundle to an HTML e-mail body
// =============================================================================
//
// Three layouts:
//   summary : headline figures (price summary, trend, RSI)
//   detailed: headline figures plus a table of every indicator
//   custom  : table of whatever indicators the bundle carries
//
// Everything user-supplied (the symbol) is HTML-escaped.
// =============================================================================

use std::fmt::Write as _;

use crate::insights::{IndicatorResult, InsightBundle, Value};
use crate::types::ReportType;

const STYLE: &str = "body{font-family:Arial,sans-serif;color:#222}\
table{border-collapse:collapse}\
td,th{border:1px solid #ccc;padding:4px 8px;text-align:left}\
.muted{color:#888}";

/// Subject line for a report about `symbol`.
pub fn report_subject(symbol: &str) -> String {
    format!("Market Analysis Report - {symbol}")
}

/// Render `bundle` as a complete HTML document.
pub fn render_market_summary(bundle: &InsightBundle, report_type: ReportType) -> String {
    let symbol = escape_html(bundle.symbol());
    let mut html = String::with_capacity(2048);

    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{STYLE}</style>\
         <title>Market Summary - {symbol}</title></head><body>\
         <h1>Market Summary - {symbol}</h1>"
    );
    let _ = write!(
        html,
        "<p class=\"muted\">{} report, period {}, interval {}, {} samples",
        report_type,
        bundle.period(),
        bundle.interval(),
        bundle.sample_count()
    );
    if let Some(span) = bundle.span() {
        let _ = write!(
            html,
            ", {} to {}",
            span.start.format("%Y-%m-%d %H:%M"),
            span.end.format("%Y-%m-%d %H:%M")
        );
    }
    html.push_str("</p>");

    match report_type {
        ReportType::Summary => headline(&mut html, bundle),
        ReportType::Detailed => {
            headline(&mut html, bundle);
            indicator_table(&mut html, bundle);
        }
        ReportType::Custom => indicator_table(&mut html, bundle),
    }

    html.push_str(
        "<p class=\"muted\">Generated automatically. Not investment advice.</p></body></html>",
    );
    html
}

fn headline(html: &mut String, bundle: &InsightBundle) {
    html.push_str("<h2>Overview</h2><ul>");

    let summary = bundle.get("price_summary").and_then(IndicatorResult::as_value);
    let field = |key: &str| summary.and_then(|v| v.get(key)).and_then(Value::as_f64);

    match field("latest_close") {
        Some(last) => {
            let _ = write!(html, "<li>Latest close: {last:.2}</li>");
        }
        None => html.push_str("<li>Latest close: n/a</li>"),
    }
    if let Some(change) = field("change_pct") {
        let _ = write!(html, "<li>Change over period: {change:+.2}%</li>");
    }
    if let (Some(high), Some(low)) = (field("period_high"), field("period_low")) {
        let _ = write!(html, "<li>Range: {low:.2} to {high:.2}</li>");
    }
    if let Some(result) = bundle.get("trend") {
        let _ = write!(html, "<li>Trend: {}</li>", format_result(result));
    }
    if let Some(result) = bundle.get("rsi") {
        let _ = write!(html, "<li>RSI: {}</li>", format_result(result));
    }

    html.push_str("</ul>");
}

fn indicator_table(html: &mut String, bundle: &InsightBundle) {
    html.push_str("<h2>Indicators</h2>");
    if bundle.indicators().is_empty() {
        html.push_str("<p>No indicators selected.</p>");
        return;
    }
    html.push_str("<table><tr><th>Indicator</th><th>Value</th></tr>");
    for (name, result) in bundle.indicators() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(name),
            format_result(result)
        );
    }
    html.push_str("</table>");
}

/// Already escaped.
fn format_result(result: &IndicatorResult) -> String {
    match result {
        IndicatorResult::Value { value } => escape_html(&format_value(value)),
        IndicatorResult::InsufficientData {
            required,
            available,
        } => format!(
            "<span class=\"muted\">insufficient data (needs {required}, have {available})</span>"
        ),
        IndicatorResult::Unavailable { .. } => "<span class=\"muted\">unavailable</span>".into(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::Number(n) => format!("{n:.4}"),
        Value::Integer(i) => i.to_string(),
        Value::Category(c) => c.clone(),
        Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Value::List(items) if items.is_empty() => "none".to_string(),
        Value::List(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| format!("{k}: {}", format_value(v)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{generate_insights, IndicatorKind, InsightConfig};
    use crate::market_data::series::tests::daily_series;

    fn rising_bundle(config: &InsightConfig) -> InsightBundle {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        generate_insights(&daily_series(&closes), config).unwrap()
    }

    #[test]
    fn summary_has_headline_only() {
        let html = render_market_summary(&rising_bundle(&InsightConfig::default()), ReportType::Summary);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Market Summary - TEST"));
        assert!(html.contains("<li>Latest close: 129.00</li>"));
        assert!(html.contains("<li>Trend: up</li>"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn detailed_lists_every_indicator() {
        let html = render_market_summary(&rising_bundle(&InsightConfig::default()), ReportType::Detailed);
        for kind in IndicatorKind::ALL {
            assert!(html.contains(&format!("<td>{}</td>", kind.as_str())), "{kind}");
        }
        assert!(html.contains("<td>anomalies</td><td>none</td>"));
    }

    #[test]
    fn custom_shows_selected_indicators() {
        let config = InsightConfig::default().with_indicators([IndicatorKind::Sma]);
        let html = render_market_summary(&rising_bundle(&config), ReportType::Custom);
        assert!(html.contains("<td>sma</td><td>119.5000</td>"));
        assert!(!html.contains("<td>rsi</td>"));
        assert!(!html.contains("Overview"));
    }

    #[test]
    fn insufficient_data_is_marked() {
        let bundle = generate_insights(&daily_series(&[1.0, 2.0]), &InsightConfig::default()).unwrap();
        let html = render_market_summary(&bundle, ReportType::Detailed);
        assert!(html.contains("insufficient data (needs 15, have 2)"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(report_subject("AAPL"), "Market Analysis Report - AAPL");
    }
}
