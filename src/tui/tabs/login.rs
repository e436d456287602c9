use crate::tui::app::{LoginField, LoginForm};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, form: &LoginForm) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(11),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{:10}", label), style),
            Span::raw(value),
            Span::raw(if focused { "▏" } else { "" }),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field(
            "Username",
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        field(
            "Password",
            "*".repeat(form.password.chars().count()),
            form.focus == LoginField::Password,
        ),
        Line::from(""),
    ];

    if form.pending {
        lines.push(Line::styled("Signing in...", Style::default().fg(Color::Yellow)));
    } else if let Some(ref error) = form.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "[Tab] switch field  [Enter] sign in  [Esc] quit",
        Style::default().fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Sign in to the WAF admin API"),
    );
    f.render_widget(widget, rows[1]);
}
