use super::rules::kind_of;
use crate::error::{ConsoleError, Result};
use serde_json::Value;

/// Text of a `/api/read-file` payload: `{content: "..."}` or a bare string.
///
/// Any other shape is an error. Treating it as an empty file would let a later
/// save overwrite the real file with nothing.
pub fn file_content(raw: &Value) -> Result<String> {
    match raw {
        Value::String(text) => Ok(text.clone()),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Null) | None => Err(ConsoleError::malformed(
                "file content",
                "response has no content field",
            )),
            Some(other) => Err(ConsoleError::malformed(
                "file content",
                format!("content is {}", kind_of(other)),
            )),
        },
        other => Err(ConsoleError::malformed(
            "file content",
            format!("expected text, got {}", kind_of(other)),
        )),
    }
}

/// Entries of a membership list: strings or `{ip}` objects; others are skipped.
pub fn normalize_ip_list(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(ip) => Some(ip.trim().to_string()),
            Value::Object(_) => item.get("ip").and_then(Value::as_str).map(|ip| ip.trim().to_string()),
            _ => None,
        })
        .filter(|ip| !ip.is_empty())
        .collect()
}
