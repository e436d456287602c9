//! Normalization of loosely-typed API payloads into canonical view models.

pub mod files;
pub mod logs;
pub mod rules;
pub mod stats;

pub use files::{file_content, normalize_ip_list};
pub use logs::{format_timestamp, normalize_logs, LogRecord};
pub use rules::{normalize_rules, RuleDescriptor, RuleLevel};
pub use stats::{
    block_rate, format_number, normalize_stats, Distribution, DistributionKind, StatsSnapshot,
    TOP_IP_LIMIT,
};

use serde_json::Value;

/// Return the first non-null value among `aliases`, probed in order.
pub fn probe<'a>(raw: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| raw.get(*alias))
        .find(|value| !value.is_null())
}

/// Coerce a JSON value into a non-negative count.
///
/// Accepts integers, floats (truncated) and numeric strings; negatives clamp to 0.
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| v.max(0) as u64))
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.max(0.0) as u64))
        }
        _ => None,
    }
}

/// Non-empty string field; empty strings count as absent.
pub fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
