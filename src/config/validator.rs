use super::ConsoleConfig;
use anyhow::Result;

pub fn validate_config(config: &ConsoleConfig) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    let url = config.api.base_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        warnings.push(format!(
            "[X] Invalid api.base_url: {}. Must start with http:// or https://",
            url
        ));
    } else if url.starts_with("http://")
        && !url.contains("127.0.0.1")
        && !url.contains("localhost")
    {
        warnings.push(
            "[!] api.base_url uses plain http to a remote host. Credentials are sent unencrypted."
                .to_string(),
        );
    }

    if config.api.timeout_seconds == 0 {
        warnings.push("[X] api.timeout_seconds cannot be 0".to_string());
    }

    match (&config.api.username, &config.api.password) {
        (Some(_), None) => {
            warnings.push("[!] api.username is set without api.password. Auto-login is disabled.".to_string())
        }
        (None, Some(_)) => {
            warnings.push("[!] api.password is set without api.username. Auto-login is disabled.".to_string())
        }
        (Some(_), Some(_)) => warnings.push(
            "[i] Credentials are stored in the config file. Prefer WAF_CONSOLE_PASSWORD.".to_string(),
        ),
        (None, None) => {}
    }

    if config.dashboard.refresh_seconds == 0 {
        warnings.push("[X] dashboard.refresh_seconds cannot be 0".to_string());
    } else if config.dashboard.refresh_seconds < 5 {
        warnings.push(format!(
            "[!] Dashboard refresh every {}s may put noticeable load on the WAF backend",
            config.dashboard.refresh_seconds
        ));
    }

    if config.logs.limit == 0 {
        warnings.push("[X] logs.limit cannot be 0".to_string());
    }

    if config.logs.default_host.trim().is_empty() {
        warnings.push("[!] logs.default_host is empty. Log queries will need an explicit host.".to_string());
    }

    if !["trace", "debug", "info", "warn", "error"].contains(&config.logging.level.as_str()) {
        warnings.push(format!(
            "[X] Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            config.logging.level
        ));
    }

    if !["text", "json", "pretty"].contains(&config.logging.format.as_str()) {
        warnings.push(format!(
            "[X] Invalid log format: {}. Must be 'text', 'json' or 'pretty'",
            config.logging.format
        ));
    }

    if !["stderr", "stdout", "file"].contains(&config.logging.output.as_str()) {
        warnings.push(format!(
            "[X] Invalid log output: {}. Must be 'stderr', 'stdout' or 'file'",
            config.logging.output
        ));
    }

    if let Some(parent) = config.logging.file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            warnings.push(format!(
                "[!] Log file directory does not exist: {}",
                parent.display()
            ));
        }
    }

    if config.logging.level == "trace" {
        warnings.push("[*] Recommendation: 'trace' logs full request bodies; use 'info' day to day".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_clean() {
        let warnings = validate_config(&ConsoleConfig::default()).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_invalid_values_flagged() {
        let mut config = ConsoleConfig::default();
        config.api.base_url = "waf.example.com".to_string();
        config.api.timeout_seconds = 0;
        config.logs.limit = 0;
        config.logging.format = "xml".to_string();

        let warnings = validate_config(&config).unwrap();
        let errors: Vec<_> = warnings.iter().filter(|w| w.starts_with("[X]")).collect();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_half_credentials_warn() {
        let mut config = ConsoleConfig::default();
        config.api.username = Some("admin".to_string());

        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.contains("without api.password")));
    }

    #[test]
    fn test_remote_plain_http_warns() {
        let mut config = ConsoleConfig::default();
        config.api.base_url = "http://waf.example.com".to_string();

        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.starts_with("[!]") && w.contains("plain http")));
    }
}
