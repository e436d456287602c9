//! Convergence of local view state with server-confirmed state.
//!
//! Mutations update local state first, then ask the server; on failure the
//! authoritative state is re-read instead of reverting locally.

pub mod dashboard;
pub mod lists;
pub mod logs;
pub mod rules;

#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::load_stats;
pub use lists::{
    add_ip, load_membership, load_text, load_text_lists, remove_ip, save_text, MembershipAction,
    MembershipLists, MembershipOutcome, TextListName, TextLists,
};
pub use logs::{fetch_logs, LogSession, DEFAULT_LOG_LIMIT};
pub use rules::{
    load_rules, reload_config, rule_content, set_enabled, ReloadOutcome, RuleBook, ToggleOutcome,
    RELOAD_REQUIRED_HINT,
};

/// Per-view request generation.
///
/// Each load takes a ticket; a result is applied only if its ticket is still the
/// latest, so a slow response cannot overwrite a newer one.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.current
    }
}
