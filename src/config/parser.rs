use super::ConsoleConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn parse_config(path: &Path) -> Result<ConsoleConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ConsoleConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn save_config(config: &ConsoleConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_config() {
        let config_content = r#"
[api]
base_url = "https://waf.example.com"
username = "admin"
password = "secret"

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = parse_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://waf.example.com");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.api.credentials(), Some(("admin", "secret")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.dashboard.refresh_seconds, 30);
    }

    #[test]
    fn test_save_then_parse() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = ConsoleConfig::default();
        config.logs.default_host = "www.example.com".to_string();

        save_config(&config, temp_file.path()).unwrap();
        let loaded = parse_config(temp_file.path()).unwrap();
        assert_eq!(loaded.logs.default_host, "www.example.com");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[api\nbase_url = ").unwrap();

        let err = parse_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
