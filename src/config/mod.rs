pub mod parser;
pub mod validator;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_URL: &str = "WAF_CONSOLE_URL";
pub const ENV_USER: &str = "WAF_CONSOLE_USER";
pub const ENV_PASSWORD: &str = "WAF_CONSOLE_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_refresh")]
    pub refresh_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_host")]
    pub default_host: String,
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_output")]
    pub output: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_refresh() -> u64 {
    30
}

fn default_log_host() -> String {
    "127.0.0.1".to_string()
}

fn default_log_limit() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("waf-console.log")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            username: None,
            password: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: default_refresh(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            default_host: default_log_host(),
            limit: default_log_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
            file: default_log_file(),
        }
    }
}

impl ApiConfig {
    /// Configured login pair, if both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl ConsoleConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        parser::parse_config(path)
    }

    /// Load the file if given (defaults otherwise), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.api.username = Some(user);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.api.password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<Vec<String>> {
        validator::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.dashboard.refresh_seconds, 30);
        assert_eq!(config.logs.limit, 100);
        assert_eq!(config.logging.output, "stderr");
        assert!(config.api.credentials().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "http://waf.internal:9000"),
            (ENV_USER, "ops"),
            (ENV_PASSWORD, "hunter2"),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://waf.internal:9000");
        assert_eq!(config.api.credentials(), Some(("ops", "hunter2")));
    }

    #[test]
    fn test_empty_url_env_ignored() {
        let mut config = ConsoleConfig::default();
        config.apply_env(|key| (key == ENV_URL).then(String::new));
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
    }
}
