use crate::reconcile::{TextListName, TextLists};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    f: &mut Frame,
    area: Rect,
    lists: Option<&TextLists>,
    error: Option<&str>,
    selected: TextListName,
) {
    if let Some(error) = error {
        let widget = Paragraph::new(vec![
            Line::from(""),
            Line::styled(error, Style::default().fg(Color::Red)),
            Line::from(""),
            Line::from("Press 'r' to retry"),
        ])
        .block(Block::default().borders(Borders::ALL).title("IP & Host Lists"));
        f.render_widget(widget, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (name, chunk) in TextListName::LISTS.into_iter().zip(chunks.iter()) {
        let is_selected = name == selected;
        let content: Vec<Line> = match lists.and_then(|l| l.get(name)) {
            Some("") => vec![Line::from(Span::styled(
                "(empty)",
                Style::default().fg(Color::DarkGray),
            ))],
            Some(text) => text.lines().map(Line::from).collect(),
            None => vec![Line::from("Loading...")],
        };

        let mut title = name.title().to_string();
        if is_selected {
            title.push_str(" - [e] edit");
        }

        let widget = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if is_selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                })
                .title(title),
        );
        f.render_widget(widget, *chunk);
    }
}
