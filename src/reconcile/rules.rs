use crate::api::WafApi;
use crate::error::Result;
use crate::normalize::{file_content, normalize_rules, RuleDescriptor};
use tracing::{info, warn};

/// Appended to toggle confirmations: the engine only picks changes up on reload.
pub const RELOAD_REQUIRED_HINT: &str = "reload configuration to apply";

/// Local copy of the rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<RuleDescriptor>,
    load_error: Option<String>,
    loaded: bool,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, file: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|rule| rule.file == file)
    }

    /// Install an authoritative rule list.
    pub fn replace(&mut self, rules: Vec<RuleDescriptor>) {
        self.rules = rules;
        self.load_error = None;
        self.loaded = true;
    }

    /// The rule list could not be read; show the failure instead of stale rows.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.rules.clear();
        self.load_error = Some(message.into());
        self.loaded = true;
    }

    /// Flip the local flag ahead of server confirmation. Returns false if the rule is unknown.
    pub fn apply_optimistic(&mut self, file: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|rule| rule.file == file) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn apply_outcome(&mut self, outcome: &ToggleOutcome) {
        match outcome {
            ToggleOutcome::Confirmed { file, enabled, .. } => {
                self.apply_optimistic(file, *enabled);
            }
            ToggleOutcome::RolledBack { authoritative, .. } => match authoritative {
                Ok(rules) => self.replace(rules.clone()),
                Err(message) => self.fail(message.clone()),
            },
            ToggleOutcome::SessionExpired => {}
        }
    }
}

#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Confirmed {
        file: String,
        enabled: bool,
        message: String,
    },
    /// The server did not accept the change; `authoritative` is the re-read rule list.
    RolledBack {
        file: String,
        error: String,
        authoritative: std::result::Result<Vec<RuleDescriptor>, String>,
    },
    SessionExpired,
}

pub async fn load_rules<A: WafApi + ?Sized>(api: &A) -> Result<Option<Vec<RuleDescriptor>>> {
    match api.rules().await? {
        Some(raw) => normalize_rules(&raw).map(Some),
        None => Ok(None),
    }
}

/// Persist a rule's enable flag, re-reading the rule list if the server refuses.
///
/// Enabling an already-enabled rule still goes to the server and is confirmed.
pub async fn set_enabled<A: WafApi + ?Sized>(api: &A, file: &str, desired: bool) -> ToggleOutcome {
    match api.set_rule_enabled(file, desired).await {
        Ok(Some(())) => {
            info!(file, enabled = desired, "Rule flag updated");
            ToggleOutcome::Confirmed {
                file: file.to_string(),
                enabled: desired,
                message: format!(
                    "Rule {} {}; {}",
                    file,
                    if desired { "enabled" } else { "disabled" },
                    RELOAD_REQUIRED_HINT
                ),
            }
        }
        Ok(None) => ToggleOutcome::SessionExpired,
        Err(e) => {
            warn!(file, error = %e, "Rule toggle failed, re-reading rules");
            let authoritative = match load_rules(api).await {
                Ok(Some(rules)) => Ok(rules),
                Ok(None) => return ToggleOutcome::SessionExpired,
                Err(reload_err) => {
                    warn!(error = %reload_err, "Failed to re-read rules");
                    Err(format!("Load failed: {}", reload_err))
                }
            };
            ToggleOutcome::RolledBack {
                file: file.to_string(),
                error: e.to_string(),
                authoritative,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub result: std::result::Result<(), String>,
    pub rules: std::result::Result<Vec<RuleDescriptor>, String>,
}

/// Apply pending rule and config changes, then re-read the rules either way.
pub async fn reload_config<A: WafApi + ?Sized>(api: &A) -> Option<ReloadOutcome> {
    let result = match api.reload_config().await {
        Ok(Some(())) => {
            info!("Configuration reloaded");
            Ok(())
        }
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Configuration reload failed");
            Err(e.to_string())
        }
    };

    let rules = match load_rules(api).await {
        Ok(Some(rules)) => Ok(rules),
        Ok(None) => return None,
        Err(e) => Err(format!("Load failed: {}", e)),
    };

    Some(ReloadOutcome { result, rules })
}

/// Source text of one rule file.
pub async fn rule_content<A: WafApi + ?Sized>(api: &A, file: &str) -> Result<Option<String>> {
    match api.rule_content(file).await? {
        Some(raw) => file_content(&raw).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RuleLevel;
    use crate::reconcile::testing::FakeApi;
    use serde_json::json;

    async fn loaded_book(api: &FakeApi) -> RuleBook {
        let mut book = RuleBook::new();
        book.replace(load_rules(api).await.unwrap().unwrap());
        book
    }

    #[tokio::test]
    async fn test_toggle_issues_put_and_confirms_with_reload_hint() {
        let api = FakeApi::with_rules(json!({
            "sqli": {"name": "SQLi", "level": "high", "enabled": false}
        }));
        let mut book = loaded_book(&api).await;

        let rule = &book.rules()[0];
        assert_eq!(rule.level, RuleLevel::High);
        assert!(!rule.enabled);

        assert!(book.apply_optimistic("sqli.lua", true));
        assert!(book.find("sqli.lua").unwrap().enabled);

        let outcome = set_enabled(&api, "sqli.lua", true).await;
        book.apply_outcome(&outcome);

        assert!(api.calls().contains(&"set_rule_enabled sqli.lua true".to_string()));
        match outcome {
            ToggleOutcome::Confirmed { message, .. } => {
                assert!(message.contains("enabled"));
                assert!(message.contains(RELOAD_REQUIRED_HINT));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(book.find("sqli.lua").unwrap().enabled);
    }

    #[tokio::test]
    async fn test_enabling_enabled_rule_is_observable_noop() {
        let api = FakeApi::with_rules(json!({"xss": {"enabled": true}}));
        let mut book = loaded_book(&api).await;
        let before = book.rules().to_vec();

        book.apply_optimistic("xss.lua", true);
        let outcome = set_enabled(&api, "xss.lua", true).await;
        book.apply_outcome(&outcome);

        assert!(matches!(outcome, ToggleOutcome::Confirmed { .. }));
        assert_eq!(book.rules(), before.as_slice());
    }

    #[tokio::test]
    async fn test_failed_toggle_restores_authoritative_state() {
        let api = FakeApi::with_rules(json!({"sqli": {"enabled": false}}));
        let mut book = loaded_book(&api).await;

        api.fail_next("set_rule_enabled", "write failed");
        book.apply_optimistic("sqli.lua", true);
        assert!(book.find("sqli.lua").unwrap().enabled);

        let outcome = set_enabled(&api, "sqli.lua", true).await;
        book.apply_outcome(&outcome);

        match &outcome {
            ToggleOutcome::RolledBack { error, .. } => assert_eq!(error, "write failed"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!book.find("sqli.lua").unwrap().enabled);
        assert_eq!(
            api.calls(),
            vec!["rules", "set_rule_enabled sqli.lua true", "rules"]
        );
    }

    #[tokio::test]
    async fn test_rollback_reflects_concurrent_server_changes() {
        let api = FakeApi::with_rules(json!({"sqli": {"enabled": true}, "xss": {"enabled": true}}));
        let mut book = loaded_book(&api).await;

        // Someone else disables xss while our toggle of sqli fails.
        api.state.lock().unwrap().rules["xss"]["enabled"] = json!(false);
        api.fail_next("set_rule_enabled", "conflict");

        book.apply_optimistic("sqli.lua", false);
        let outcome = set_enabled(&api, "sqli.lua", false).await;
        book.apply_outcome(&outcome);

        assert!(book.find("sqli.lua").unwrap().enabled);
        assert!(!book.find("xss.lua").unwrap().enabled);
    }

    #[tokio::test]
    async fn test_failed_reread_shows_load_error() {
        let api = FakeApi::with_rules(json!({"sqli": {"enabled": true}}));
        let mut book = loaded_book(&api).await;

        api.fail_next("set_rule_enabled", "write failed");
        api.fail_next("rules", "backend down");
        book.apply_optimistic("sqli.lua", false);
        let outcome = set_enabled(&api, "sqli.lua", false).await;
        book.apply_outcome(&outcome);

        assert!(book.rules().is_empty());
        assert_eq!(book.load_error(), Some("Load failed: backend down"));
    }

    #[tokio::test]
    async fn test_session_expiry_yields_no_message() {
        let api = FakeApi::with_rules(json!({"sqli": {}}));
        api.expire("set_rule_enabled");
        let outcome = set_enabled(&api, "sqli.lua", false).await;
        assert!(matches!(outcome, ToggleOutcome::SessionExpired));
    }

    #[tokio::test]
    async fn test_reload_rereads_rules_even_on_failure() {
        let api = FakeApi::with_rules(json!({"sqli": {}}));
        api.fail_next("reload_config", "engine busy");

        let outcome = reload_config(&api).await.unwrap();
        assert_eq!(outcome.result, Err("engine busy".to_string()));
        assert_eq!(outcome.rules.unwrap().len(), 1);
        assert_eq!(api.calls(), vec!["reload_config", "rules"]);
    }

    #[tokio::test]
    async fn test_rule_content() {
        let api = FakeApi::new();
        let content = rule_content(&api, "sqli.lua").await.unwrap().unwrap();
        assert_eq!(content, "-- sqli.lua");
    }
}
