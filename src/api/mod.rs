pub mod busy;
pub mod client;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

pub use busy::{BusyGuard, BusyIndicator};
pub use client::{ApiClient, RequestOptions};

/// Discrete membership lists exposed by `/api/whitelist` and `/api/blacklist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpListKind {
    White,
    Black,
}

impl IpListKind {
    pub fn path(self) -> &'static str {
        match self {
            IpListKind::White => "/api/whitelist",
            IpListKind::Black => "/api/blacklist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IpListKind::White => "whitelist",
            IpListKind::Black => "blacklist",
        }
    }
}

impl fmt::Display for IpListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for IpListKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "whitelist" | "allow" => Ok(IpListKind::White),
            "black" | "blacklist" | "deny" => Ok(IpListKind::Black),
            other => Err(format!("unknown list '{}', use 'white' or 'black'", other)),
        }
    }
}

/// Attack log query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    pub host: String,
    pub date: String,
    pub limit: usize,
}

impl LogQuery {
    pub fn to_path(&self) -> String {
        format!(
            "/api/logs?host={}&date={}&limit={}",
            urlencoding::encode(&self.host),
            urlencoding::encode(&self.date),
            self.limit
        )
    }
}

/// Shared session-expired signal.
///
/// The transport raises it on a 401; the console shell consumes it and switches
/// to the login page.
#[derive(Debug, Default)]
pub struct SessionState {
    expired: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_expired(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    /// Returns whether the session expired since the last call, clearing the flag.
    pub fn take_expired(&self) -> bool {
        self.expired.swap(false, Ordering::SeqCst)
    }
}

/// The backend REST surface consumed by the console.
///
/// Every call returns `Ok(None)` when the session has expired (HTTP 401): the
/// caller must skip any further processing of that call.
#[async_trait]
pub trait WafApi: Send + Sync {
    async fn stats(&self) -> Result<Option<Value>>;

    async fn rules(&self) -> Result<Option<Value>>;

    async fn rule_content(&self, file: &str) -> Result<Option<Value>>;

    /// Persist a rule's enable flag. Does not reload the detection engine.
    async fn set_rule_enabled(&self, file: &str, enabled: bool) -> Result<Option<()>>;

    async fn reload_config(&self) -> Result<Option<()>>;

    async fn ip_list(&self, kind: IpListKind) -> Result<Option<Value>>;

    async fn add_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>>;

    async fn remove_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>>;

    async fn logs(&self, query: &LogQuery) -> Result<Option<Value>>;

    async fn read_file(&self, name: &str) -> Result<Option<Value>>;

    async fn save_file(&self, name: &str, content: &str) -> Result<Option<()>>;

    async fn login(&self, username: &str, password: &str) -> Result<Option<()>>;

    async fn logout(&self) -> Result<Option<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_query_path_encodes_values() {
        let query = LogQuery {
            host: "www.example.com".to_string(),
            date: "2024-05-01".to_string(),
            limit: 100,
        };
        assert_eq!(
            query.to_path(),
            "/api/logs?host=www.example.com&date=2024-05-01&limit=100"
        );

        let odd = LogQuery {
            host: "a b&c".to_string(),
            date: "2024-05-01".to_string(),
            limit: 5,
        };
        assert_eq!(odd.to_path(), "/api/logs?host=a%20b%26c&date=2024-05-01&limit=5");
    }

    #[test]
    fn test_session_flag_is_consumed_once() {
        let session = SessionState::new();
        assert!(!session.take_expired());
        session.mark_expired();
        assert!(session.is_expired());
        assert!(session.take_expired());
        assert!(!session.take_expired());
    }

    #[test]
    fn test_ip_list_kind_parsing() {
        assert_eq!("white".parse::<IpListKind>().unwrap(), IpListKind::White);
        assert_eq!("BLACKLIST".parse::<IpListKind>().unwrap(), IpListKind::Black);
        assert!("grey".parse::<IpListKind>().is_err());
        assert_eq!(IpListKind::Black.path(), "/api/blacklist");
    }
}
