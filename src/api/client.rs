use super::{BusyIndicator, IpListKind, LogQuery, SessionState, WafApi};
use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const GENERIC_FAILURE: &str = "request failed";

/// Per-call request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Extra headers; a `content-type` entry here replaces the JSON default.
    pub headers: Vec<(String, String)>,
    /// When false, a 401 is reported as an ordinary error instead of a session expiry.
    pub session_bound: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            session_bound: true,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Option<Value>) -> Self {
        Self {
            method: Method::POST,
            body,
            ..Self::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete(body: Value) -> Self {
        Self {
            method: Method::DELETE,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// HTTP client for the WAF admin API
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Arc<SessionState>,
    busy: BusyIndicator,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            session: Arc::new(SessionState::new()),
            busy: BusyIndicator::new(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Arc<SessionState> {
        self.session.clone()
    }

    pub fn busy(&self) -> BusyIndicator {
        self.busy.clone()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue a request and return the unwrapped payload.
    ///
    /// `Ok(None)` means the session expired; the session flag has been raised.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Option<Value>> {
        Ok(self.send(path, options).await?.map(unwrap_envelope))
    }

    /// Issue a mutation. A body reporting `success: false` is an operation error.
    pub async fn mutate(&self, path: &str, options: RequestOptions) -> Result<Option<()>> {
        let Some(raw) = self.send(path, options).await? else {
            return Ok(None);
        };

        if let Some(message) = rejection(&raw) {
            warn!(path, %message, "Server rejected operation");
            return Err(ConsoleError::Operation(message));
        }

        Ok(Some(()))
    }

    /// Send the request and return the raw (still enveloped) body.
    async fn send(&self, path: &str, options: RequestOptions) -> Result<Option<Value>> {
        let _busy = self.busy.acquire();
        let url = self.url(path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConsoleError::Config(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConsoleError::Config(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(ref body) = options.body {
            builder = builder.body(body.to_string());
        }

        debug!(method = %options.method, %url, "API request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(path, error = %e, "API request failed");
                return Err(ConsoleError::Http {
                    status: None,
                    message: format!("{}: {}", GENERIC_FAILURE, e),
                });
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| ConsoleError::Http {
            status: Some(status.as_u16()),
            message: format!("failed to read response: {}", e),
        })?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if status == StatusCode::UNAUTHORIZED && options.session_bound {
            warn!(path, "Session expired");
            self.session.mark_expired();
            return Ok(None);
        }

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!(path, status = status.as_u16(), %message, "API request returned error");
            return Err(ConsoleError::Http {
                status: Some(status.as_u16()),
                message,
            });
        }

        match parsed {
            Some(value) => Ok(Some(value)),
            None if text.trim().is_empty() => Ok(Some(Value::Null)),
            None => {
                warn!(path, "Response body is not JSON");
                Err(ConsoleError::malformed("response body", "expected JSON"))
            }
        }
    }
}

/// `body.data` when the key is present, otherwise the body itself.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Human-readable message from an error body: `data.message`, then `message`.
pub fn error_message(body: &Value) -> Option<String> {
    fn text(value: Option<&Value>) -> Option<&str> {
        value.and_then(Value::as_str).filter(|m| !m.is_empty())
    }

    text(body.get("data").and_then(|data| data.get("message")))
        .or_else(|| text(body.get("message")))
        .map(String::from)
}

/// Message for a 2xx body that still reports `success: false`.
pub fn rejection(body: &Value) -> Option<String> {
    let rejected = |value: &Value| value.get("success") == Some(&Value::Bool(false));
    let data_rejected = body.get("data").map(rejected).unwrap_or(false);

    if rejected(body) || data_rejected {
        Some(error_message(body).unwrap_or_else(|| "operation failed".to_string()))
    } else {
        None
    }
}

#[async_trait]
impl WafApi for ApiClient {
    async fn stats(&self) -> Result<Option<Value>> {
        self.request("/api/stats", RequestOptions::get()).await
    }

    async fn rules(&self) -> Result<Option<Value>> {
        self.request("/api/rules", RequestOptions::get()).await
    }

    async fn rule_content(&self, file: &str) -> Result<Option<Value>> {
        let path = format!("/api/rules/{}", urlencoding::encode(file));
        self.request(&path, RequestOptions::get()).await
    }

    async fn set_rule_enabled(&self, file: &str, enabled: bool) -> Result<Option<()>> {
        let path = format!("/api/rules/{}", urlencoding::encode(file));
        self.mutate(&path, RequestOptions::put(json!({ "enabled": enabled })))
            .await
    }

    async fn reload_config(&self) -> Result<Option<()>> {
        self.mutate("/api/reload-config", RequestOptions::post(None))
            .await
    }

    async fn ip_list(&self, kind: IpListKind) -> Result<Option<Value>> {
        self.request(kind.path(), RequestOptions::get()).await
    }

    async fn add_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>> {
        self.mutate(kind.path(), RequestOptions::post(Some(json!({ "ip": ip }))))
            .await
    }

    async fn remove_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>> {
        self.mutate(kind.path(), RequestOptions::delete(json!({ "ip": ip })))
            .await
    }

    async fn logs(&self, query: &LogQuery) -> Result<Option<Value>> {
        self.request(&query.to_path(), RequestOptions::get()).await
    }

    async fn read_file(&self, name: &str) -> Result<Option<Value>> {
        let path = format!("/api/read-file?file={}", urlencoding::encode(name));
        self.request(&path, RequestOptions::get()).await
    }

    async fn save_file(&self, name: &str, content: &str) -> Result<Option<()>> {
        let body = json!({ "file": name, "content": content });
        self.mutate("/api/save-file", RequestOptions::post(Some(body)))
            .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<Option<()>> {
        let body = json!({ "username": username, "password": password });
        let options = RequestOptions {
            session_bound: false,
            ..RequestOptions::post(Some(body))
        };
        self.mutate("/api/login", options).await
    }

    async fn logout(&self) -> Result<Option<()>> {
        self.mutate("/api/logout", RequestOptions::post(None)).await
    }
}
