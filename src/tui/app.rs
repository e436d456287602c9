use crate::api::{BusyIndicator, IpListKind, LogQuery, SessionState, WafApi};
use crate::chart::ChartRenderer;
use crate::config::ConsoleConfig;
use crate::error::Result as ConsoleResult;
use crate::normalize::{DistributionKind, LogRecord, RuleDescriptor, StatsSnapshot};
use crate::reconcile::{
    self, Generation, LogSession, MembershipLists, MembershipOutcome, ReloadOutcome, RuleBook,
    TextListName, TextLists, ToggleOutcome,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// How long a status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Rules,
    IpLists,
    TextLists,
    Logs,
    Settings,
    Help,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Rules,
        Page::IpLists,
        Page::TextLists,
        Page::Logs,
        Page::Settings,
        Page::Help,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Rules => "Rules",
            Page::IpLists => "IP Lists",
            Page::TextLists => "Text Lists",
            Page::Logs => "Logs",
            Page::Settings => "Settings",
            Page::Help => "Help",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub ok: bool,
    shown_at: Instant,
}

/// Single-line prompt shown at the bottom of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputField {
    AddIp(IpListKind),
    LogHost,
    LogDate,
}

impl InputField {
    pub fn prompt(&self) -> String {
        match self {
            InputField::AddIp(kind) => format!("Add IP/CIDR to {}", kind),
            InputField::LogHost => "Log host".to_string(),
            InputField::LogDate => "Log date (YYYY-MM-DD)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub field: InputField,
    pub buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub pending: bool,
}

/// Text shown in a scrollable popup (rule source, log record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub title: String,
    pub content: String,
    pub scroll: u16,
}

/// A document handed to the external editor by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub name: TextListName,
    pub text: String,
}

/// Completed background work, applied by the event loop.
#[derive(Debug)]
pub enum TaskResult {
    Stats {
        ticket: u64,
        result: ConsoleResult<Option<StatsSnapshot>>,
    },
    Rules {
        ticket: u64,
        result: ConsoleResult<Option<Vec<RuleDescriptor>>>,
    },
    Toggle(ToggleOutcome),
    Reload(Option<ReloadOutcome>),
    RuleContent {
        file: String,
        result: ConsoleResult<Option<String>>,
    },
    Membership {
        ticket: u64,
        result: ConsoleResult<Option<MembershipLists>>,
    },
    MembershipChanged(ConsoleResult<Option<MembershipOutcome>>),
    TextLists {
        ticket: u64,
        result: ConsoleResult<Option<TextLists>>,
    },
    Settings {
        ticket: u64,
        result: ConsoleResult<Option<String>>,
    },
    Saved {
        name: TextListName,
        result: ConsoleResult<Option<()>>,
    },
    Logs {
        ticket: u64,
        query: LogQuery,
        result: ConsoleResult<Option<Vec<LogRecord>>>,
    },
    Login(ConsoleResult<Option<()>>),
    Logout(ConsoleResult<Option<()>>),
}

#[derive(Debug, Default)]
struct Generations {
    stats: Generation,
    rules: Generation,
    membership: Generation,
    text_lists: Generation,
    settings: Generation,
    logs: Generation,
}

pub struct App {
    api: Arc<dyn WafApi>,
    session: Arc<SessionState>,
    busy: BusyIndicator,
    tx: UnboundedSender<TaskResult>,
    generations: Generations,
    refresh_every: Duration,
    last_refresh: Option<Instant>,
    log_limit: usize,
    auto_login: bool,

    pub base_url: String,
    pub page: Page,
    pub authenticated: bool,
    pub should_quit: bool,
    pub status_message: Option<StatusMessage>,
    pub input: Option<Input>,
    pub viewer: Option<Viewer>,
    pub pending_edit: Option<EditRequest>,
    pub login: LoginForm,

    pub stats: Option<StatsSnapshot>,
    pub charts: ChartRenderer,
    pub chart_focus: usize,
    pub legend_cursor: usize,

    pub rules: RuleBook,
    pub rule_cursor: usize,

    pub membership: MembershipLists,
    pub membership_error: Option<String>,
    pub ip_kind: IpListKind,
    pub ip_cursor: usize,

    pub text_lists: Option<TextLists>,
    pub text_error: Option<String>,
    pub text_cursor: usize,

    pub settings: Option<String>,
    pub settings_error: Option<String>,

    pub logs: LogSession,
    pub logs_error: Option<String>,
    pub log_host: String,
    pub log_date: String,
    pub log_cursor: usize,
}

impl App {
    pub fn new(
        api: Arc<dyn WafApi>,
        session: Arc<SessionState>,
        busy: BusyIndicator,
        base_url: impl Into<String>,
        config: &ConsoleConfig,
    ) -> (Self, UnboundedReceiver<TaskResult>) {
        let (tx, rx) = unbounded_channel();

        let mut login = LoginForm::default();
        let mut auto_login = false;
        if let Some((user, pass)) = config.api.credentials() {
            login.username = user.to_string();
            login.password = pass.to_string();
            auto_login = true;
        }

        let app = Self {
            api,
            session,
            busy,
            tx,
            generations: Generations::default(),
            refresh_every: Duration::from_secs(config.dashboard.refresh_seconds.max(1)),
            last_refresh: None,
            log_limit: config.logs.limit,
            auto_login,
            base_url: base_url.into(),
            page: Page::Dashboard,
            authenticated: !auto_login,
            should_quit: false,
            status_message: None,
            input: None,
            viewer: None,
            pending_edit: None,
            login,
            stats: None,
            charts: ChartRenderer::new(),
            chart_focus: 0,
            legend_cursor: 0,
            rules: RuleBook::new(),
            rule_cursor: 0,
            membership: MembershipLists::default(),
            membership_error: None,
            ip_kind: IpListKind::White,
            ip_cursor: 0,
            text_lists: None,
            text_error: None,
            text_cursor: 0,
            settings: None,
            settings_error: None,
            logs: LogSession::new(),
            logs_error: None,
            log_host: config.logs.default_host.clone(),
            log_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            log_cursor: 0,
        };

        (app, rx)
    }

    /// Kick off the first load, logging in first when credentials are configured.
    pub fn start(&mut self) {
        if self.auto_login {
            self.submit_login();
        } else {
            self.load_page();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy() || self.login.pending
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    pub fn notify_ok(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: format!("✓ {}", text.into()),
            ok: true,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(page = self.page.title(), "{}", text);
        self.status_message = Some(StatusMessage {
            text: format!("✗ {}", text),
            ok: false,
            shown_at: Instant::now(),
        });
    }

    // Navigation

    pub fn navigate(&mut self, page: Page) {
        if self.page == Page::Dashboard && page != Page::Dashboard {
            self.charts.clear();
        }
        self.page = page;
        self.input = None;
        self.viewer = None;
        self.load_page();
    }

    pub fn next_page(&mut self) {
        let next = (self.page.index() + 1) % Page::ALL.len();
        self.navigate(Page::ALL[next]);
    }

    pub fn previous_page(&mut self) {
        let len = Page::ALL.len();
        let prev = (self.page.index() + len - 1) % len;
        self.navigate(Page::ALL[prev]);
    }

    /// Reload whatever the current page shows.
    pub fn load_page(&mut self) {
        if !self.authenticated {
            return;
        }
        match self.page {
            Page::Dashboard => self.load_dashboard(),
            Page::Rules => self.load_rules(),
            Page::IpLists => self.load_membership(),
            Page::TextLists => self.load_text_lists(),
            Page::Logs => self.run_log_query(),
            Page::Settings => self.load_settings(),
            Page::Help => {}
        }
    }

    /// Periodic housekeeping: expire the status message and drive the dashboard timer.
    pub fn tick(&mut self, now: Instant) {
        if let Some(ref status) = self.status_message {
            if now.duration_since(status.shown_at) >= STATUS_TTL {
                self.status_message = None;
            }
        }

        // The timer keeps running on other pages; only the dashboard acts on it.
        if !self.authenticated || self.page != Page::Dashboard {
            return;
        }
        let due = match self.last_refresh {
            Some(last) => now.duration_since(last) >= self.refresh_every,
            None => false,
        };
        if due {
            debug!("Dashboard refresh tick");
            self.load_dashboard();
        }
    }

    // Dashboard

    pub fn load_dashboard(&mut self) {
        let ticket = self.generations.stats.begin();
        self.last_refresh = Some(Instant::now());
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::Stats {
                ticket,
                result: reconcile::load_stats(api.as_ref()).await,
            }
        });
    }

    pub fn focused_chart(&self) -> DistributionKind {
        DistributionKind::ALL[self.chart_focus % DistributionKind::ALL.len()]
    }

    pub fn focus_next_chart(&mut self) {
        self.chart_focus = (self.chart_focus + 1) % DistributionKind::ALL.len();
        self.legend_cursor = 0;
    }

    pub fn focus_previous_chart(&mut self) {
        let len = DistributionKind::ALL.len();
        self.chart_focus = (self.chart_focus + len - 1) % len;
        self.legend_cursor = 0;
    }

    pub fn toggle_legend(&mut self) {
        let target = self.focused_chart();
        match self.charts.toggle_legend(target, self.legend_cursor) {
            Some(visible) => debug!(?target, index = self.legend_cursor, visible, "Legend toggled"),
            None => debug!(?target, "Focused chart has no legend"),
        }
    }

    // Rules

    pub fn load_rules(&mut self) {
        let ticket = self.generations.rules.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::Rules {
                ticket,
                result: reconcile::load_rules(api.as_ref()).await,
            }
        });
    }

    pub fn selected_rule(&self) -> Option<&RuleDescriptor> {
        self.rules.rules().get(self.rule_cursor)
    }

    pub fn toggle_selected_rule(&mut self) {
        let Some(rule) = self.selected_rule() else {
            return;
        };
        let file = rule.file.clone();
        let desired = !rule.enabled;

        self.rules.apply_optimistic(&file, desired);
        // A load started before this toggle must not overwrite its outcome.
        self.generations.rules.begin();

        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::Toggle(reconcile::set_enabled(api.as_ref(), &file, desired).await)
        });
    }

    pub fn reload_config(&mut self) {
        self.generations.rules.begin();
        let api = self.api.clone();
        self.spawn(async move { TaskResult::Reload(reconcile::reload_config(api.as_ref()).await) });
    }

    pub fn view_selected_rule(&mut self) {
        let Some(rule) = self.selected_rule() else {
            return;
        };
        let file = rule.file.clone();
        let api = self.api.clone();
        self.spawn(async move {
            let result = reconcile::rule_content(api.as_ref(), &file).await;
            TaskResult::RuleContent { file, result }
        });
    }

    // Membership lists

    pub fn load_membership(&mut self) {
        let ticket = self.generations.membership.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::Membership {
                ticket,
                result: reconcile::load_membership(api.as_ref()).await,
            }
        });
    }

    pub fn switch_ip_list(&mut self) {
        self.ip_kind = match self.ip_kind {
            IpListKind::White => IpListKind::Black,
            IpListKind::Black => IpListKind::White,
        };
        self.ip_cursor = 0;
    }

    pub fn add_ip(&mut self, ip: String) {
        let kind = self.ip_kind;
        self.generations.membership.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::MembershipChanged(reconcile::add_ip(api.as_ref(), kind, &ip).await)
        });
    }

    pub fn remove_selected_ip(&mut self) {
        let Some(ip) = self.membership.get(self.ip_kind).get(self.ip_cursor).cloned() else {
            return;
        };
        let kind = self.ip_kind;
        self.generations.membership.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::MembershipChanged(reconcile::remove_ip(api.as_ref(), kind, &ip).await)
        });
    }

    // Text lists and settings

    pub fn load_text_lists(&mut self) {
        let ticket = self.generations.text_lists.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::TextLists {
                ticket,
                result: reconcile::load_text_lists(api.as_ref()).await,
            }
        });
    }

    pub fn load_settings(&mut self) {
        let ticket = self.generations.settings.begin();
        let api = self.api.clone();
        self.spawn(async move {
            TaskResult::Settings {
                ticket,
                result: reconcile::load_text(api.as_ref(), TextListName::WafConf).await,
            }
        });
    }

    pub fn selected_text_list(&self) -> TextListName {
        TextListName::LISTS[self.text_cursor % TextListName::LISTS.len()]
    }

    /// Queue the selected document for the external editor. Nothing is queued
    /// until the document has loaded.
    pub fn request_edit(&mut self) {
        let request = match self.page {
            Page::TextLists => {
                let name = self.selected_text_list();
                self.text_lists
                    .as_ref()
                    .and_then(|lists| lists.get(name))
                    .map(|text| EditRequest {
                        name,
                        text: text.to_string(),
                    })
            }
            Page::Settings => self.settings.as_ref().map(|text| EditRequest {
                name: TextListName::WafConf,
                text: text.clone(),
            }),
            _ => None,
        };

        match request {
            Some(request) => self.pending_edit = Some(request),
            None => self.notify_error("Nothing loaded to edit"),
        }
    }

    /// Called by the event loop once the editor exits. `None` means unchanged.
    pub fn finish_edit(&mut self, name: TextListName, edited: Option<String>) {
        let Some(text) = edited else {
            self.notify_ok(format!("{} unchanged", name));
            return;
        };

        if name != TextListName::WafConf {
            if let Some(lists) = self.text_lists.as_mut() {
                lists.set(name, text.clone());
            }
        }

        let api = self.api.clone();
        self.spawn(async move {
            let result = reconcile::save_text(api.as_ref(), name, &text).await;
            TaskResult::Saved { name, result }
        });
    }

    // Logs

    pub fn log_query(&self) -> LogQuery {
        LogQuery {
            host: self.log_host.clone(),
            date: self.log_date.clone(),
            limit: self.log_limit,
        }
    }

    pub fn run_log_query(&mut self) {
        let ticket = self.generations.logs.begin();
        let query = self.log_query();
        let api = self.api.clone();
        self.spawn(async move {
            let result = reconcile::fetch_logs(api.as_ref(), &query).await;
            TaskResult::Logs {
                ticket,
                query,
                result,
            }
        });
    }

    pub fn show_log_detail(&mut self) {
        if let Some(content) = self.logs.detail(self.log_cursor) {
            self.viewer = Some(Viewer {
                title: format!("Log record #{}", self.log_cursor + 1),
                content,
                scroll: 0,
            });
        }
    }

    // Input prompt

    pub fn begin_input(&mut self, field: InputField) {
        let buffer = match field {
            InputField::LogHost => self.log_host.clone(),
            InputField::LogDate => self.log_date.clone(),
            InputField::AddIp(_) => String::new(),
        };
        self.input = Some(Input { field, buffer });
    }

    pub fn submit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        match input.field {
            InputField::AddIp(_) => self.add_ip(input.buffer),
            InputField::LogHost => {
                self.log_host = input.buffer.trim().to_string();
                self.run_log_query();
            }
            InputField::LogDate => {
                self.log_date = input.buffer.trim().to_string();
                self.run_log_query();
            }
        }
    }

    // Session

    pub fn submit_login(&mut self) {
        if self.login.username.is_empty() {
            self.login.error = Some("Username is required".to_string());
            return;
        }
        self.login.pending = true;
        self.login.error = None;

        let api = self.api.clone();
        let username = self.login.username.clone();
        let password = self.login.password.clone();
        self.spawn(async move { TaskResult::Login(api.login(&username, &password).await) });
    }

    pub fn logout(&mut self) {
        let api = self.api.clone();
        self.spawn(async move { TaskResult::Logout(api.logout().await) });
    }

    fn on_session_expired(&mut self) {
        info!("Session expired, showing login page");
        self.authenticated = false;
        self.charts.clear();
        self.input = None;
        self.viewer = None;
        self.pending_edit = None;
        self.login.password.clear();
        self.login.focus = if self.login.username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        self.login.error = Some("Session expired, please log in again".to_string());
    }

    // Results

    pub fn apply(&mut self, result: TaskResult) {
        match result {
            TaskResult::Stats { ticket, result } => self.apply_stats(ticket, result),
            TaskResult::Rules { ticket, result } => {
                if !self.generations.rules.is_current(ticket) {
                    debug!(ticket, "Discarding superseded rule list");
                } else {
                    match result {
                        Ok(Some(rules)) => self.rules.replace(rules),
                        Ok(None) => {}
                        Err(e) => {
                            self.rules.fail(format!("Load failed: {}", e));
                            self.notify_error(format!("Failed to load rules: {}", e));
                        }
                    }
                    self.clamp_rule_cursor();
                }
            }
            TaskResult::Toggle(outcome) => {
                self.rules.apply_outcome(&outcome);
                self.clamp_rule_cursor();
                match outcome {
                    ToggleOutcome::Confirmed { message, .. } => self.notify_ok(message),
                    ToggleOutcome::RolledBack { file, error, .. } => {
                        self.notify_error(format!("Failed to update {}: {}", file, error))
                    }
                    ToggleOutcome::SessionExpired => {}
                }
            }
            TaskResult::Reload(outcome) => {
                if let Some(outcome) = outcome {
                    match outcome.rules {
                        Ok(rules) => self.rules.replace(rules),
                        Err(message) => self.rules.fail(message),
                    }
                    self.clamp_rule_cursor();
                    match outcome.result {
                        Ok(()) => self.notify_ok("Configuration reloaded"),
                        Err(e) => self.notify_error(format!("Reload failed: {}", e)),
                    }
                }
            }
            TaskResult::RuleContent { file, result } => match result {
                Ok(Some(content)) => {
                    self.viewer = Some(Viewer {
                        title: file,
                        content,
                        scroll: 0,
                    })
                }
                Ok(None) => {}
                Err(e) => self.notify_error(format!("Failed to read {}: {}", file, e)),
            },
            TaskResult::Membership { ticket, result } => {
                if !self.generations.membership.is_current(ticket) {
                    debug!(ticket, "Discarding superseded IP lists");
                } else {
                    match result {
                        Ok(Some(lists)) => self.set_membership(lists),
                        Ok(None) => {}
                        Err(e) => {
                            self.membership_error = Some(format!("Load failed: {}", e));
                            self.notify_error(format!("Failed to load IP lists: {}", e));
                        }
                    }
                }
            }
            TaskResult::MembershipChanged(result) => match result {
                Ok(Some(outcome)) => {
                    match outcome.reloaded {
                        Ok(ref lists) => self.set_membership(lists.clone()),
                        Err(ref e) => self.membership_error = Some(format!("Load failed: {}", e)),
                    }
                    if outcome.result.is_ok() {
                        self.notify_ok(outcome.message());
                    } else {
                        self.notify_error(outcome.message());
                    }
                }
                Ok(None) => {}
                Err(e) => self.notify_error(e.to_string()),
            },
            TaskResult::TextLists { ticket, result } => {
                if !self.generations.text_lists.is_current(ticket) {
                    debug!(ticket, "Discarding superseded text lists");
                } else {
                    match result {
                        Ok(Some(lists)) => {
                            self.text_lists = Some(lists);
                            self.text_error = None;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            self.text_lists = None;
                            self.text_error = Some(format!("Load failed: {}", e));
                            self.notify_error(format!("Failed to load lists: {}", e));
                        }
                    }
                }
            }
            TaskResult::Settings { ticket, result } => {
                if !self.generations.settings.is_current(ticket) {
                    debug!(ticket, "Discarding superseded settings");
                } else {
                    match result {
                        Ok(Some(text)) => {
                            self.settings = Some(text);
                            self.settings_error = None;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            self.settings = None;
                            self.settings_error = Some(format!("Load failed: {}", e));
                            self.notify_error(format!("Failed to load waf.conf: {}", e));
                        }
                    }
                }
            }
            TaskResult::Saved { name, result } => match result {
                Ok(Some(())) => {
                    if name == TextListName::WafConf {
                        self.notify_ok(format!(
                            "{} saved; {}",
                            name,
                            reconcile::RELOAD_REQUIRED_HINT
                        ));
                        self.load_settings();
                    } else {
                        self.notify_ok(format!("{} saved", name.title()));
                        self.load_text_lists();
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.notify_error(format!("Failed to save {}: {}", name, e));
                    if name == TextListName::WafConf {
                        self.load_settings();
                    } else {
                        self.load_text_lists();
                    }
                }
            },
            TaskResult::Logs {
                ticket,
                query,
                result,
            } => {
                if !self.generations.logs.is_current(ticket) {
                    debug!(ticket, "Discarding superseded log query");
                } else {
                    match result {
                        Ok(Some(records)) => {
                            self.logs.replace(query, records);
                            self.logs_error = None;
                            self.log_cursor = 0;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            self.logs_error = Some(format!("Load failed: {}", e));
                            self.notify_error(format!("Failed to load logs: {}", e));
                        }
                    }
                }
            }
            TaskResult::Login(result) => {
                self.login.pending = false;
                match result {
                    Ok(Some(())) => {
                        info!(user = %self.login.username, "Logged in");
                        self.authenticated = true;
                        self.login.error = None;
                        self.login.password.clear();
                        self.notify_ok("Logged in");
                        self.navigate(Page::Dashboard);
                    }
                    Ok(None) => self.login.error = Some("Login failed".to_string()),
                    Err(e) => self.login.error = Some(e.to_string()),
                }
            }
            TaskResult::Logout(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "Logout request failed");
                }
                self.authenticated = false;
                self.charts.clear();
                self.viewer = None;
                self.login.error = None;
                self.login.focus = LoginField::Password;
                self.notify_ok("Logged out");
            }
        }

        if self.session.take_expired() {
            self.on_session_expired();
        }
    }

    fn apply_stats(&mut self, ticket: u64, result: ConsoleResult<Option<StatsSnapshot>>) {
        if !self.generations.stats.is_current(ticket) {
            debug!(ticket, "Discarding superseded stats");
            return;
        }
        // Charts are released when leaving the dashboard; a late result must not revive them.
        if self.page != Page::Dashboard || !self.authenticated {
            return;
        }
        match result {
            Ok(Some(snapshot)) => {
                self.charts.render_snapshot(&snapshot);
                self.stats = Some(snapshot);
            }
            Ok(None) => {}
            Err(e) => {
                self.notify_error(format!("Failed to load statistics: {}", e));
                self.stats = None;
                self.charts.render_snapshot(&StatsSnapshot::default());
            }
        }
    }

    fn clamp_rule_cursor(&mut self) {
        let len = self.rules.rules().len();
        if self.rule_cursor >= len {
            self.rule_cursor = len.saturating_sub(1);
        }
    }

    fn set_membership(&mut self, lists: MembershipLists) {
        self.membership = lists;
        self.membership_error = None;
        let len = self.membership.get(self.ip_kind).len();
        if self.ip_cursor >= len {
            self.ip_cursor = len.saturating_sub(1);
        }
    }

    // Cursor movement for the active page

    pub fn cursor_up(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.scroll = viewer.scroll.saturating_sub(1);
            return;
        }
        let cursor = match self.page {
            Page::Dashboard => &mut self.legend_cursor,
            Page::Rules => &mut self.rule_cursor,
            Page::IpLists => &mut self.ip_cursor,
            Page::TextLists => &mut self.text_cursor,
            Page::Logs => &mut self.log_cursor,
            Page::Settings | Page::Help => return,
        };
        *cursor = cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.scroll = viewer.scroll.saturating_add(1);
            return;
        }
        let len = match self.page {
            Page::Dashboard => self
                .charts
                .get(self.focused_chart())
                .map(|handle| match &handle.spec().body {
                    crate::chart::ChartBody::Pie(slices) => slices.len(),
                    _ => 0,
                })
                .unwrap_or(0),
            Page::Rules => self.rules.rules().len(),
            Page::IpLists => self.membership.get(self.ip_kind).len(),
            Page::TextLists => TextListName::LISTS.len(),
            Page::Logs => self.logs.records().len(),
            Page::Settings | Page::Help => 0,
        };
        let cursor = match self.page {
            Page::Dashboard => &mut self.legend_cursor,
            Page::Rules => &mut self.rule_cursor,
            Page::IpLists => &mut self.ip_cursor,
            Page::TextLists => &mut self.text_cursor,
            Page::Logs => &mut self.log_cursor,
            Page::Settings | Page::Help => return,
        };
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    // Rendering

    pub fn render(&mut self, f: &mut Frame) {
        let bottom = if self.input.is_some() || self.status_message.is_some() {
            3
        } else {
            0
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(bottom),
            ])
            .split(f.size());

        super::tabs::render_tab_bar(
            f,
            chunks[0],
            self.page.index(),
            self.authenticated,
            self.is_busy(),
            &self.base_url,
        );

        if !self.authenticated {
            super::tabs::login::render(f, chunks[1], &self.login);
        } else {
            match self.page {
                Page::Dashboard => super::tabs::dashboard::render(
                    f,
                    chunks[1],
                    self.stats.as_ref(),
                    &self.charts,
                    self.focused_chart(),
                    self.legend_cursor,
                ),
                Page::Rules => super::tabs::rules::render(f, chunks[1], &self.rules, self.rule_cursor),
                Page::IpLists => super::tabs::ip_lists::render(
                    f,
                    chunks[1],
                    &self.membership,
                    self.ip_kind,
                    self.ip_cursor,
                    self.membership_error.as_deref(),
                ),
                Page::TextLists => super::tabs::text_lists::render(
                    f,
                    chunks[1],
                    self.text_lists.as_ref(),
                    self.text_error.as_deref(),
                    self.selected_text_list(),
                ),
                Page::Logs => super::tabs::logs::render(
                    f,
                    chunks[1],
                    &self.logs,
                    &self.log_query(),
                    self.log_cursor,
                    self.logs_error.as_deref(),
                ),
                Page::Settings => super::tabs::settings::render(
                    f,
                    chunks[1],
                    self.settings.as_deref(),
                    self.settings_error.as_deref(),
                ),
                Page::Help => super::tabs::help::render(f, chunks[1]),
            }
        }

        if let Some(ref input) = self.input {
            let widget = Paragraph::new(format!("{}▏", input.buffer)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!("{} (Enter to submit, Esc to cancel)", input.field.prompt())),
            );
            f.render_widget(widget, chunks[2]);
        } else if let Some(ref status) = self.status_message {
            let color = if status.ok { Color::Green } else { Color::Red };
            let widget = Paragraph::new(status.text.as_str())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color))
                        .title("Status"),
                )
                .style(Style::default().fg(color));
            f.render_widget(widget, chunks[2]);
        }

        if let Some(ref viewer) = self.viewer {
            let area = centered(f.size(), 80, 80);
            let widget = Paragraph::new(viewer.content.as_str())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("{} (Esc to close)", viewer.title)),
                )
                .wrap(Wrap { trim: false })
                .scroll((viewer.scroll, 0));
            f.render_widget(Clear, area);
            f.render_widget(widget, area);
        }
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::testing::FakeApi;
    use serde_json::json;

    fn app_with(fake: Arc<FakeApi>, config: ConsoleConfig) -> (App, UnboundedReceiver<TaskResult>, Arc<SessionState>) {
        let session = Arc::new(SessionState::new());
        let api: Arc<dyn WafApi> = fake;
        let (app, rx) = App::new(api, session.clone(), BusyIndicator::new(), "http://test", &config);
        (app, rx, session)
    }

    async fn drain_one(app: &mut App, rx: &mut UnboundedReceiver<TaskResult>) {
        let result = rx.recv().await.unwrap();
        app.apply(result);
    }

    #[tokio::test]
    async fn test_dashboard_load_builds_charts() {
        let fake = Arc::new(FakeApi::new());
        fake.state.lock().unwrap().stats = json!({
            "total_requests": 10,
            "blocked_requests": 2,
            "attack_types": {"sqli": 2}
        });
        let (mut app, mut rx, _) = app_with(fake, ConsoleConfig::default());

        app.start();
        drain_one(&mut app, &mut rx).await;

        assert_eq!(app.stats.as_ref().unwrap().total_requests, 10);
        assert_eq!(app.charts.live_count(), DistributionKind::ALL.len());
    }

    #[tokio::test]
    async fn test_superseded_stats_are_discarded() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, mut rx, _) = app_with(fake, ConsoleConfig::default());

        app.load_dashboard();
        app.load_dashboard();

        let stale = StatsSnapshot {
            total_requests: 999,
            ..StatsSnapshot::default()
        };
        app.apply(TaskResult::Stats {
            ticket: 1,
            result: Ok(Some(stale)),
        });
        assert!(app.stats.is_none());

        // Both spawned loads report back; only the second one is applied.
        drain_one(&mut app, &mut rx).await;
        drain_one(&mut app, &mut rx).await;
        assert_eq!(app.stats.as_ref().unwrap().total_requests, 0);
    }

    #[tokio::test]
    async fn test_leaving_dashboard_releases_charts_and_stops_ticks() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, mut rx, _) = app_with(fake.clone(), ConsoleConfig::default());

        app.start();
        drain_one(&mut app, &mut rx).await;
        assert!(app.charts.live_count() > 0);

        app.navigate(Page::Help);
        assert_eq!(app.charts.live_count(), 0);

        let later = Instant::now() + Duration::from_secs(120);
        app.tick(later);
        let stats_calls = fake.calls().iter().filter(|c| *c == "stats").count();
        assert_eq!(stats_calls, 1);
    }

    #[tokio::test]
    async fn test_dashboard_tick_refreshes() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, mut rx, _) = app_with(fake.clone(), ConsoleConfig::default());

        app.start();
        drain_one(&mut app, &mut rx).await;

        app.tick(Instant::now() + Duration::from_secs(31));
        drain_one(&mut app, &mut rx).await;
        let stats_calls = fake.calls().iter().filter(|c| *c == "stats").count();
        assert_eq!(stats_calls, 2);
    }

    #[tokio::test]
    async fn test_rule_toggle_round_trip() {
        let fake = Arc::new(FakeApi::with_rules(json!({"sqli": {"enabled": false}})));
        let (mut app, mut rx, _) = app_with(fake.clone(), ConsoleConfig::default());

        app.navigate(Page::Rules);
        drain_one(&mut app, &mut rx).await;
        assert_eq!(app.rules.rules().len(), 1);

        app.toggle_selected_rule();
        assert!(app.rules.rules()[0].enabled);
        drain_one(&mut app, &mut rx).await;

        assert!(app.rules.rules()[0].enabled);
        let status = app.status_message.as_ref().unwrap();
        assert!(status.ok);
        assert!(status.text.contains(reconcile::RELOAD_REQUIRED_HINT));
    }

    #[tokio::test]
    async fn test_rule_cursor_follows_shrinking_book() {
        let fake = Arc::new(FakeApi::with_rules(json!({"a": {}, "b": {}, "c": {}, "d": {}})));
        let (mut app, mut rx, _) = app_with(fake.clone(), ConsoleConfig::default());

        app.navigate(Page::Rules);
        drain_one(&mut app, &mut rx).await;
        app.rule_cursor = 3;

        if let Some(rules) = json!({"a": {}}).as_object() {
            fake.state.lock().unwrap().rules = rules.clone();
        }
        app.load_page();
        drain_one(&mut app, &mut rx).await;

        assert_eq!(app.rule_cursor, 0);
        assert_eq!(app.selected_rule().unwrap().file, "a.lua");

        app.toggle_selected_rule();
        drain_one(&mut app, &mut rx).await;
        assert!(fake.calls().contains(&"set_rule_enabled a.lua false".to_string()));
    }

    #[tokio::test]
    async fn test_session_expiry_switches_to_login() {
        let fake = Arc::new(FakeApi::new());
        fake.expire("rules");
        let (mut app, mut rx, session) = app_with(fake, ConsoleConfig::default());

        app.navigate(Page::Rules);
        session.mark_expired();
        drain_one(&mut app, &mut rx).await;

        assert!(!app.authenticated);
        assert!(app.login.error.as_deref().unwrap().contains("Session expired"));
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_auto_login_then_dashboard() {
        let fake = Arc::new(FakeApi::new());
        let mut config = ConsoleConfig::default();
        config.api.username = Some("admin".to_string());
        config.api.password = Some("secret".to_string());
        let (mut app, mut rx, _) = app_with(fake.clone(), config);

        assert!(!app.authenticated);
        app.start();
        drain_one(&mut app, &mut rx).await;
        assert!(app.authenticated);
        assert!(app.login.password.is_empty());

        drain_one(&mut app, &mut rx).await;
        assert_eq!(fake.calls(), vec!["login admin", "stats"]);
    }

    #[tokio::test]
    async fn test_failed_login_shows_server_message() {
        let fake = Arc::new(FakeApi::new());
        fake.fail_next("login", "invalid credentials");
        let mut config = ConsoleConfig::default();
        config.api.username = Some("admin".to_string());
        config.api.password = Some("wrong".to_string());
        let (mut app, mut rx, _) = app_with(fake, config);

        app.start();
        drain_one(&mut app, &mut rx).await;
        assert!(!app.authenticated);
        assert_eq!(app.login.error.as_deref(), Some("invalid credentials"));
    }

    #[tokio::test]
    async fn test_add_ip_via_input_prompt() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, mut rx, _) = app_with(fake, ConsoleConfig::default());
        app.page = Page::IpLists;

        app.begin_input(InputField::AddIp(IpListKind::White));
        app.input.as_mut().unwrap().buffer.push_str("10.1.1.1");
        app.submit_input();
        drain_one(&mut app, &mut rx).await;

        assert_eq!(app.membership.white, vec!["10.1.1.1"]);
        assert!(app.status_message.as_ref().unwrap().ok);
    }

    #[tokio::test]
    async fn test_status_message_expires() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, _rx, _) = app_with(fake, ConsoleConfig::default());
        app.page = Page::Help;

        app.notify_ok("done");
        app.tick(Instant::now() + STATUS_TTL);
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_edit_saves_and_reloads() {
        let fake = Arc::new(FakeApi::new());
        let (mut app, mut rx, _) = app_with(fake.clone(), ConsoleConfig::default());

        app.navigate(Page::Settings);
        drain_one(&mut app, &mut rx).await;
        app.request_edit();
        let request = app.pending_edit.take().unwrap();
        assert_eq!(request.name, TextListName::WafConf);

        app.finish_edit(request.name, Some("mode = block\n".to_string()));
        drain_one(&mut app, &mut rx).await;
        assert!(app.status_message.as_ref().unwrap().text.contains("reload"));

        drain_one(&mut app, &mut rx).await;
        assert_eq!(app.settings.as_deref(), Some("mode = block\n"));
    }
}
