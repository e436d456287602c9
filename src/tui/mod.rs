pub mod app;
pub mod chart_view;
pub mod editor;
pub mod tabs;

use anyhow::Result;
use app::{App, InputField, LoginField, Page, TaskResult};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

type ConsoleTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run_tui(app: App, results: UnboundedReceiver<TaskResult>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, results).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut ConsoleTerminal,
    mut app: App,
    mut results: UnboundedReceiver<TaskResult>,
) -> Result<()> {
    app.start();

    loop {
        while let Ok(result) = results.try_recv() {
            app.apply(result);
        }
        app.tick(Instant::now());

        terminal.draw(|f| app.render(f))?;

        if let Some(request) = app.pending_edit.take() {
            let edited = with_suspended_terminal(terminal, || {
                editor::edit_text(&editor::editor_command(), &request.text)
            })?;
            match edited {
                Ok(edited) => app.finish_edit(request.name, edited),
                Err(e) => app.notify_error(format!("Editor failed: {:#}", e)),
            }
            continue;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            handle_key(&mut app, key);
            if app.should_quit {
                info!("Console closed");
                return Ok(());
            }
        }
    }
}

/// Leave the alternate screen while `f` runs, then restore it.
fn with_suspended_terminal<T>(
    terminal: &mut ConsoleTerminal,
    f: impl FnOnce() -> T,
) -> Result<T> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let out = f();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(out)
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if !app.authenticated {
        handle_login_key(app, key);
        return;
    }

    if let Some(input) = app.input.as_mut() {
        match key.code {
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => app.input = None,
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Char(c) => input.buffer.push(c),
            _ => {}
        }
        return;
    }

    if app.viewer.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.viewer = None,
            KeyCode::Up => app.cursor_up(),
            KeyCode::Down => app.cursor_down(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.next_page(),
        KeyCode::BackTab => app.previous_page(),
        KeyCode::Char(c @ '1'..='7') => {
            let index = c as usize - '1' as usize;
            app.navigate(Page::ALL[index]);
        }
        KeyCode::Char('r') => app.load_page(),
        KeyCode::Char('R') => app.reload_config(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('?') => app.navigate(Page::Help),
        KeyCode::Up => app.cursor_up(),
        KeyCode::Down => app.cursor_down(),
        _ => handle_page_key(app, key),
    }
}

fn handle_page_key(app: &mut App, key: KeyEvent) {
    match app.page {
        Page::Dashboard => match key.code {
            KeyCode::Left => app.focus_previous_chart(),
            KeyCode::Right => app.focus_next_chart(),
            KeyCode::Char(' ') => app.toggle_legend(),
            _ => {}
        },
        Page::Rules => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_rule(),
            KeyCode::Char('v') => app.view_selected_rule(),
            _ => {}
        },
        Page::IpLists => match key.code {
            KeyCode::Left | KeyCode::Right => app.switch_ip_list(),
            KeyCode::Char('a') => app.begin_input(InputField::AddIp(app.ip_kind)),
            KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_ip(),
            _ => {}
        },
        Page::TextLists => match key.code {
            KeyCode::Left => app.cursor_up(),
            KeyCode::Right => app.cursor_down(),
            KeyCode::Char('e') => app.request_edit(),
            _ => {}
        },
        Page::Settings => {
            if key.code == KeyCode::Char('e') {
                app.request_edit();
            }
        }
        Page::Logs => match key.code {
            KeyCode::Char('h') => app.begin_input(InputField::LogHost),
            KeyCode::Char('t') => app.begin_input(InputField::LogDate),
            KeyCode::Enter => app.show_log_detail(),
            _ => {}
        },
        Page::Help => {}
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    if app.login.pending {
        return;
    }
    let form = &mut app.login;
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = match form.focus {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
        }
        KeyCode::Enter => {
            if form.focus == LoginField::Username && form.password.is_empty() {
                form.focus = LoginField::Password;
            } else {
                app.submit_login();
            }
        }
        KeyCode::Backspace => {
            match form.focus {
                LoginField::Username => form.username.pop(),
                LoginField::Password => form.password.pop(),
            };
        }
        KeyCode::Char(c) => match form.focus {
            LoginField::Username => form.username.push(c),
            LoginField::Password => form.password.push(c),
        },
        _ => {}
    }
}
