use crate::api::{IpListKind, LogQuery, WafApi};
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory backend used by reconciler tests.
#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub stats: Value,
    pub rules: Map<String, Value>,
    pub white: Vec<String>,
    pub black: Vec<String>,
    pub files: HashMap<String, String>,
    pub logs: Vec<Value>,
    /// Failure to return for the next call of the named operation.
    pub fail: HashMap<&'static str, String>,
    /// Operations that answer as if the session had expired.
    pub expired: Vec<&'static str>,
    pub calls: Vec<String>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Value) -> Self {
        let api = Self::new();
        if let Value::Object(map) = rules {
            api.state.lock().unwrap().rules = map;
        }
        api
    }

    pub fn fail_next(&self, op: &'static str, message: &str) {
        self.state.lock().unwrap().fail.insert(op, message.to_string());
    }

    pub fn expire(&self, op: &'static str) {
        self.state.lock().unwrap().expired.push(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, op: &'static str, detail: String) -> Result<Option<()>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(if detail.is_empty() {
            op.to_string()
        } else {
            format!("{} {}", op, detail)
        });
        if state.expired.contains(&op) {
            return Ok(None);
        }
        match state.fail.remove(op) {
            Some(message) => Err(ConsoleError::Http {
                status: Some(500),
                message,
            }),
            None => Ok(Some(())),
        }
    }
}

#[async_trait]
impl WafApi for FakeApi {
    async fn stats(&self) -> Result<Option<Value>> {
        if self.enter("stats", String::new())?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.state.lock().unwrap().stats.clone()))
    }

    async fn rules(&self) -> Result<Option<Value>> {
        if self.enter("rules", String::new())?.is_none() {
            return Ok(None);
        }
        Ok(Some(Value::Object(self.state.lock().unwrap().rules.clone())))
    }

    async fn rule_content(&self, file: &str) -> Result<Option<Value>> {
        if self.enter("rule_content", file.to_string())?.is_none() {
            return Ok(None);
        }
        Ok(Some(json!({ "content": format!("-- {}", file) })))
    }

    async fn set_rule_enabled(&self, file: &str, enabled: bool) -> Result<Option<()>> {
        if self.enter("set_rule_enabled", format!("{} {}", file, enabled))?.is_none() {
            return Ok(None);
        }
        let mut state = self.state.lock().unwrap();
        let key = file.trim_end_matches(".lua").to_string();
        if let Some(Value::Object(rule)) = state.rules.get_mut(&key) {
            rule.insert("enabled".to_string(), Value::Bool(enabled));
        }
        Ok(Some(()))
    }

    async fn reload_config(&self) -> Result<Option<()>> {
        self.enter("reload_config", String::new())
    }

    async fn ip_list(&self, kind: IpListKind) -> Result<Option<Value>> {
        if self.enter("ip_list", kind.to_string())?.is_none() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        let list = match kind {
            IpListKind::White => &state.white,
            IpListKind::Black => &state.black,
        };
        Ok(Some(json!(list)))
    }

    async fn add_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>> {
        if self.enter("add_ip", format!("{} {}", kind, ip))?.is_none() {
            return Ok(None);
        }
        let mut state = self.state.lock().unwrap();
        let list = match kind {
            IpListKind::White => &mut state.white,
            IpListKind::Black => &mut state.black,
        };
        if !list.iter().any(|existing| existing == ip) {
            list.push(ip.to_string());
        }
        Ok(Some(()))
    }

    async fn remove_ip(&self, kind: IpListKind, ip: &str) -> Result<Option<()>> {
        if self.enter("remove_ip", format!("{} {}", kind, ip))?.is_none() {
            return Ok(None);
        }
        let mut state = self.state.lock().unwrap();
        let list = match kind {
            IpListKind::White => &mut state.white,
            IpListKind::Black => &mut state.black,
        };
        list.retain(|existing| existing != ip);
        Ok(Some(()))
    }

    async fn logs(&self, query: &LogQuery) -> Result<Option<Value>> {
        if self.enter("logs", format!("{} {}", query.host, query.date))?.is_none() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        let logs: Vec<Value> = state.logs.iter().take(query.limit).cloned().collect();
        Ok(Some(Value::Array(logs)))
    }

    async fn read_file(&self, name: &str) -> Result<Option<Value>> {
        if self.enter("read_file", name.to_string())?.is_none() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        let content = state.files.get(name).cloned().unwrap_or_default();
        Ok(Some(json!({ "content": content })))
    }

    async fn save_file(&self, name: &str, content: &str) -> Result<Option<()>> {
        if self.enter("save_file", name.to_string())?.is_none() {
            return Ok(None);
        }
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_string(), content.to_string());
        Ok(Some(()))
    }

    async fn login(&self, username: &str, _password: &str) -> Result<Option<()>> {
        self.enter("login", username.to_string())
    }

    async fn logout(&self) -> Result<Option<()>> {
        self.enter("logout", String::new())
    }
}
