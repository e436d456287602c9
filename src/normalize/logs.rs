use super::as_text;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One attack log entry. The full record is kept for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub request_time: String,
    pub ip: String,
    pub attack_type: String,
    pub http_method: String,
    pub request_uri: String,
    #[serde(skip)]
    pub raw: Value,
}

impl LogRecord {
    /// Build from a decoded object; `None` for anything that is not an object.
    pub fn from_value(raw: Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }
        let field = |name: &str| as_text(raw.get(name)).unwrap_or_default();

        Some(Self {
            request_time: field("request_time"),
            ip: field("ip"),
            attack_type: field("attack_type"),
            http_method: field("http_method"),
            request_uri: field("request_uri"),
            raw,
        })
    }

    /// Pretty-printed full record.
    pub fn detail(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

/// Decode a `/api/logs` payload.
///
/// Elements may be objects or JSON-encoded strings (one line of the log file);
/// elements that fail to decode are dropped. A non-list payload yields no records.
pub fn normalize_logs(raw: &Value) -> Vec<LogRecord> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let value = match item {
                Value::String(line) => match serde_json::from_str::<Value>(line) {
                    Ok(value) => value,
                    Err(e) => {
                        debug!(error = %e, "Dropping undecodable log line");
                        return None;
                    }
                },
                other => other.clone(),
            };
            LogRecord::from_value(value)
        })
        .collect()
}

/// Render a log timestamp in local time; unrecognized input is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format(LOCAL_FORMAT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT) {
        if let Some(local) = Local.from_local_datetime(&naive).earliest() {
            return local.format(LOCAL_FORMAT).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_encoded_and_object_records() {
        let records = normalize_logs(&json!([
            "{\"request_time\":\"2024-05-01 10:00:00\",\"ip\":\"1.2.3.4\",\"attack_type\":\"sqli\",\"http_method\":\"GET\",\"request_uri\":\"/?id=1'\"}",
            {"ip": "5.6.7.8", "attack_type": "xss", "http_method": "POST", "request_uri": "/form", "rule_tag": "x1"},
            "not json",
            42
        ]));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ip, "1.2.3.4");
        assert_eq!(records[0].attack_type, "sqli");
        assert_eq!(records[1].http_method, "POST");
        assert_eq!(records[1].request_time, "");
        assert!(records[1].detail().contains("\"rule_tag\": \"x1\""));
    }

    #[test]
    fn test_non_list_payload() {
        assert!(normalize_logs(&json!({"logs": []})).is_empty());
        assert!(normalize_logs(&Value::Null).is_empty());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-05-01 10:00:00"), "2024-05-01 10:00:00");
        assert_eq!(format_timestamp("yesterday"), "yesterday");

        let rfc = format_timestamp("2024-05-01T10:00:00Z");
        assert_eq!(rfc.len(), "2024-05-01 10:00:00".len());
    }
}
