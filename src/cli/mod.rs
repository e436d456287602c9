pub mod config;
pub mod file;
pub mod ip;
pub mod lists;
pub mod logs;
pub mod rules;
pub mod session;
pub mod stats;
pub mod tui;

pub use config::ConfigArgs;
pub use file::FileArgs;
pub use ip::IpArgs;
pub use lists::ListsArgs;
pub use logs::LogsArgs;
pub use rules::RulesArgs;
pub use session::{LoginArgs, LogoutArgs};
pub use stats::StatsArgs;
pub use tui::TuiArgs;

use crate::api::{ApiClient, WafApi};
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (TOML)
    #[arg(short, long, global = true, env = "WAF_CONSOLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Admin API base URL, overrides the config file and WAF_CONSOLE_URL
    #[arg(long, global = true)]
    pub url: Option<String>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<ConsoleConfig> {
        let mut config = ConsoleConfig::load(self.config.as_deref())?;
        if let Some(ref url) = self.url {
            config.api.base_url = url.clone();
        }
        Ok(config)
    }
}

/// Build a client and, when credentials are configured, sign in.
pub async fn connect(config: &ConsoleConfig) -> Result<ApiClient> {
    let client = ApiClient::from_config(&config.api)
        .with_context(|| format!("Failed to create client for {}", config.api.base_url))?;

    if let Some((user, pass)) = config.api.credentials() {
        debug!(user, url = %config.api.base_url, "Signing in");
        client
            .login(user, pass)
            .await
            .with_context(|| format!("Login as '{}' failed", user))?;
    }

    Ok(client)
}

/// Unwrap a transport result, turning the session-expired sentinel into an error.
pub fn require<T>(value: Option<T>) -> Result<T> {
    value.ok_or(ConsoleError::SessionExpired).context(
        "Not signed in or session expired. Set api.username/api.password or WAF_CONSOLE_USER/WAF_CONSOLE_PASSWORD",
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_flag_overrides_config() {
        let args = GlobalArgs {
            config: None,
            url: Some("http://10.0.0.5:8080".to_string()),
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:8080");
    }

    #[test]
    fn test_require_maps_none_to_error() {
        assert_eq!(require(Some(3)).unwrap(), 3);
        let err = require::<()>(None).unwrap_err();
        assert!(err.to_string().contains("session expired"));

        let cause = err.downcast_ref::<ConsoleError>().unwrap();
        assert!(matches!(cause, ConsoleError::SessionExpired));
        assert_eq!(cause.status(), Some(401));
    }
}
