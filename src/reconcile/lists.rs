use crate::api::{IpListKind, WafApi};
use crate::error::{ConsoleError, Result};
use crate::normalize::{file_content, normalize_ip_list};
use std::fmt;
use tracing::{info, warn};

/// Server-side text files edited as whole documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextListName {
    WafConf,
    BlackIp,
    WhiteIp,
    WhiteHost,
}

impl TextListName {
    /// The IP/host lists shown together on the lists page.
    pub const LISTS: [TextListName; 3] = [
        TextListName::BlackIp,
        TextListName::WhiteIp,
        TextListName::WhiteHost,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TextListName::WafConf => "waf.conf",
            TextListName::BlackIp => "blackIp",
            TextListName::WhiteIp => "whiteIp",
            TextListName::WhiteHost => "whitehost",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TextListName::WafConf => "Configuration (waf.conf)",
            TextListName::BlackIp => "IP Blacklist",
            TextListName::WhiteIp => "IP Whitelist",
            TextListName::WhiteHost => "Host Whitelist",
        }
    }
}

impl fmt::Display for TextListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl std::str::FromStr for TextListName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "waf.conf" | "conf" => Ok(TextListName::WafConf),
            "blackIp" | "blackip" => Ok(TextListName::BlackIp),
            "whiteIp" | "whiteip" => Ok(TextListName::WhiteIp),
            "whitehost" | "whiteHost" => Ok(TextListName::WhiteHost),
            other => Err(format!(
                "unknown file '{}', expected one of: waf.conf, blackIp, whiteIp, whitehost",
                other
            )),
        }
    }
}

pub async fn load_text<A: WafApi + ?Sized>(api: &A, name: TextListName) -> Result<Option<String>> {
    match api.read_file(name.file_name()).await? {
        Some(raw) => file_content(&raw).map(Some),
        None => Ok(None),
    }
}

/// Write the whole document back. There is no line-level API, so every save
/// resubmits the full text verbatim.
pub async fn save_text<A: WafApi + ?Sized>(
    api: &A,
    name: TextListName,
    text: &str,
) -> Result<Option<()>> {
    if name == TextListName::WafConf && text.trim().is_empty() {
        return Err(ConsoleError::Operation(
            "refusing to save an empty waf.conf".to_string(),
        ));
    }

    let saved = api.save_file(name.file_name(), text).await?;
    if saved.is_some() {
        info!(file = %name, bytes = text.len(), "File saved");
    }
    Ok(saved)
}

/// The three text lists, loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLists {
    pub black_ip: String,
    pub white_ip: String,
    pub white_host: String,
}

impl TextLists {
    pub fn get(&self, name: TextListName) -> Option<&str> {
        match name {
            TextListName::BlackIp => Some(&self.black_ip),
            TextListName::WhiteIp => Some(&self.white_ip),
            TextListName::WhiteHost => Some(&self.white_host),
            TextListName::WafConf => None,
        }
    }

    pub fn set(&mut self, name: TextListName, text: String) {
        match name {
            TextListName::BlackIp => self.black_ip = text,
            TextListName::WhiteIp => self.white_ip = text,
            TextListName::WhiteHost => self.white_host = text,
            TextListName::WafConf => {}
        }
    }
}

/// Load all three lists; either every panel gets data or none does.
pub async fn load_text_lists<A: WafApi + ?Sized>(api: &A) -> Result<Option<TextLists>> {
    let (black, white, hosts) = tokio::try_join!(
        load_text(api, TextListName::BlackIp),
        load_text(api, TextListName::WhiteIp),
        load_text(api, TextListName::WhiteHost),
    )?;

    match (black, white, hosts) {
        (Some(black_ip), Some(white_ip), Some(white_host)) => Ok(Some(TextLists {
            black_ip,
            white_ip,
            white_host,
        })),
        _ => Ok(None),
    }
}

/// Discrete whitelist and blacklist members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipLists {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

impl MembershipLists {
    pub fn get(&self, kind: IpListKind) -> &[String] {
        match kind {
            IpListKind::White => &self.white,
            IpListKind::Black => &self.black,
        }
    }
}

pub async fn load_membership<A: WafApi + ?Sized>(api: &A) -> Result<Option<MembershipLists>> {
    let (white, black) = tokio::try_join!(
        api.ip_list(IpListKind::White),
        api.ip_list(IpListKind::Black),
    )?;

    match (white, black) {
        (Some(white), Some(black)) => Ok(Some(MembershipLists {
            white: normalize_ip_list(&white),
            black: normalize_ip_list(&black),
        })),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Add,
    Remove,
}

#[derive(Debug, Clone)]
pub struct MembershipOutcome {
    pub kind: IpListKind,
    pub ip: String,
    pub action: MembershipAction,
    pub result: std::result::Result<(), String>,
    /// Both lists as the server now reports them.
    pub reloaded: std::result::Result<MembershipLists, String>,
}

impl MembershipOutcome {
    pub fn message(&self) -> String {
        let verb = match self.action {
            MembershipAction::Add => "add",
            MembershipAction::Remove => "remove",
        };
        match &self.result {
            Ok(()) => match self.action {
                MembershipAction::Add => format!("Added {} to {}", self.ip, self.kind),
                MembershipAction::Remove => format!("Removed {} from {}", self.ip, self.kind),
            },
            Err(e) => format!("Failed to {} {}: {}", verb, self.ip, e),
        }
    }
}

pub async fn add_ip<A: WafApi + ?Sized>(
    api: &A,
    kind: IpListKind,
    ip: &str,
) -> Result<Option<MembershipOutcome>> {
    mutate_membership(api, kind, ip, MembershipAction::Add).await
}

pub async fn remove_ip<A: WafApi + ?Sized>(
    api: &A,
    kind: IpListKind,
    ip: &str,
) -> Result<Option<MembershipOutcome>> {
    mutate_membership(api, kind, ip, MembershipAction::Remove).await
}

/// Apply one membership change, then reload both lists whatever the outcome:
/// the server dedups and validates entries in ways the console does not replicate.
async fn mutate_membership<A: WafApi + ?Sized>(
    api: &A,
    kind: IpListKind,
    ip: &str,
    action: MembershipAction,
) -> Result<Option<MembershipOutcome>> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(ConsoleError::Operation("IP address must not be empty".to_string()));
    }

    let response = match action {
        MembershipAction::Add => api.add_ip(kind, ip).await,
        MembershipAction::Remove => api.remove_ip(kind, ip).await,
    };
    let result = match response {
        Ok(Some(())) => {
            info!(list = %kind, ip, ?action, "Membership updated");
            Ok(())
        }
        Ok(None) => return Ok(None),
        Err(e) => {
            warn!(list = %kind, ip, ?action, error = %e, "Membership update failed");
            Err(e.to_string())
        }
    };

    let reloaded = match load_membership(api).await {
        Ok(Some(lists)) => Ok(lists),
        Ok(None) => return Ok(None),
        Err(e) => Err(e.to_string()),
    };

    Ok(Some(MembershipOutcome {
        kind,
        ip: ip.to_string(),
        action,
        result,
        reloaded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::testing::FakeApi;

    #[tokio::test]
    async fn test_text_round_trip_is_verbatim() {
        let api = FakeApi::new();
        let text = "10.0.0.1\n\n  192.168.0.0/16  \n# comment\n";

        save_text(&api, TextListName::BlackIp, text).await.unwrap().unwrap();
        let loaded = load_text(&api, TextListName::BlackIp).await.unwrap().unwrap();
        assert_eq!(loaded, text);
    }

    #[tokio::test]
    async fn test_empty_ip_blob_allowed_but_not_empty_conf() {
        let api = FakeApi::new();
        assert!(save_text(&api, TextListName::WhiteHost, "").await.unwrap().is_some());
        assert!(matches!(
            save_text(&api, TextListName::WafConf, "  \n").await,
            Err(ConsoleError::Operation(_))
        ));
        assert_eq!(api.calls(), vec!["save_file whitehost"]);
    }

    #[tokio::test]
    async fn test_text_lists_load_jointly() {
        let api = FakeApi::new();
        {
            let mut state = api.state.lock().unwrap();
            state.files.insert("blackIp".to_string(), "1.1.1.1".to_string());
            state.files.insert("whiteIp".to_string(), "2.2.2.2".to_string());
            state.files.insert("whitehost".to_string(), "a.com".to_string());
        }

        let lists = load_text_lists(&api).await.unwrap().unwrap();
        assert_eq!(lists.get(TextListName::BlackIp), Some("1.1.1.1"));
        assert_eq!(lists.white_ip, "2.2.2.2");
        assert_eq!(lists.white_host, "a.com");

        api.fail_next("read_file", "disk error");
        assert!(load_text_lists(&api).await.is_err());
    }

    #[tokio::test]
    async fn test_add_reloads_both_lists() {
        let api = FakeApi::new();
        api.state.lock().unwrap().black.push("9.9.9.9".to_string());

        let outcome = add_ip(&api, IpListKind::White, " 10.0.0.1 ").await.unwrap().unwrap();
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.message(), "Added 10.0.0.1 to whitelist");

        let lists = outcome.reloaded.unwrap();
        assert_eq!(lists.white, vec!["10.0.0.1"]);
        assert_eq!(lists.black, vec!["9.9.9.9"]);

        let calls = api.calls();
        assert_eq!(calls[0], "add_ip whitelist 10.0.0.1");
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_remove_still_reloads() {
        let api = FakeApi::new();
        api.state.lock().unwrap().black.push("9.9.9.9".to_string());
        api.fail_next("remove_ip", "not allowed");

        let outcome = remove_ip(&api, IpListKind::Black, "9.9.9.9").await.unwrap().unwrap();
        assert_eq!(outcome.result, Err("not allowed".to_string()));
        assert!(outcome.message().starts_with("Failed to remove 9.9.9.9"));
        assert_eq!(outcome.reloaded.as_ref().unwrap().black, vec!["9.9.9.9"]);
    }

    #[tokio::test]
    async fn test_empty_ip_rejected_without_request() {
        let api = FakeApi::new();
        assert!(add_ip(&api, IpListKind::Black, "   ").await.is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_aborts_joint_load() {
        let api = FakeApi::new();
        api.expire("ip_list");
        assert!(load_membership(&api).await.unwrap().is_none());
    }
}
