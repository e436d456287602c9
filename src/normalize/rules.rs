use super::as_text;
use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RuleLevel {
    /// Unknown levels fall back to `Medium`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => RuleLevel::Low,
            "high" => RuleLevel::High,
            _ => RuleLevel::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleLevel::Low => "low",
            RuleLevel::Medium => "medium",
            RuleLevel::High => "high",
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detection rule as shown in the rules table. Identity is `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub key: String,
    pub file: String,
    pub name: String,
    pub description: String,
    pub level: RuleLevel,
    pub position: String,
    pub enabled: bool,
}

impl RuleDescriptor {
    pub fn from_entry(key: &str, raw: &Value) -> Self {
        Self {
            key: key.to_string(),
            file: as_text(raw.get("file")).unwrap_or_else(|| format!("{}.lua", key)),
            name: as_text(raw.get("name")).unwrap_or_else(|| key.to_string()),
            description: as_text(raw.get("desc"))
                .or_else(|| as_text(raw.get("description")))
                .unwrap_or_default(),
            level: as_text(raw.get("level"))
                .map(|level| RuleLevel::parse(&level))
                .unwrap_or_default(),
            position: as_text(raw.get("position")).unwrap_or_else(|| "uri,body".to_string()),
            // Only an explicit `false` disables a rule.
            enabled: raw.get("enabled") != Some(&Value::Bool(false)),
        }
    }
}

/// Flatten the keyed rule mapping into an ordered list.
pub fn normalize_rules(raw: &Value) -> Result<Vec<RuleDescriptor>> {
    let map = raw.as_object().ok_or_else(|| {
        ConsoleError::malformed("rules", format!("expected a mapping, got {}", kind_of(raw)))
    })?;

    let rules = map
        .iter()
        .filter_map(|(key, entry)| {
            if entry.is_object() {
                Some(RuleDescriptor::from_entry(key, entry))
            } else {
                debug!(rule = %key, "Skipping rule entry that is not an object");
                None
            }
        })
        .collect();

    Ok(rules)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
