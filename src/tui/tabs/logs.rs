use super::{row_style, window_start};
use crate::api::LogQuery;
use crate::normalize::format_timestamp;
use crate::reconcile::LogSession;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(
    f: &mut Frame,
    area: Rect,
    session: &LogSession,
    query: &LogQuery,
    cursor: usize,
    error: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Host: ", Style::default().fg(Color::Gray)),
        Span::styled(&query.host, Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("Date: ", Style::default().fg(Color::Gray)),
        Span::styled(&query.date, Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("Limit: ", Style::default().fg(Color::Gray)),
        Span::raw(query.limit.to_string()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Query - [h] host  [t] date  [r] run"),
    );
    f.render_widget(header, chunks[0]);

    let records = session.records();
    let height = chunks[1].height.saturating_sub(2) as usize;
    let start = window_start(cursor, height);

    let items: Vec<ListItem> = if let Some(error) = error {
        vec![ListItem::new(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        ))]
    } else if records.is_empty() {
        vec![ListItem::new("No attack logs for this host and date")]
    } else {
        records
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, record)| {
                let content = Line::from(vec![
                    Span::styled(
                        format!("{:19}", format_timestamp(&record.request_time)),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(" "),
                    Span::styled(format!("{:15}", record.ip), Style::default().fg(Color::Yellow)),
                    Span::raw(" "),
                    Span::styled(
                        format!("{:12}", record.attack_type),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::styled(format!("{:6}", record.http_method), Style::default().fg(Color::Cyan)),
                    Span::raw(" "),
                    Span::raw(record.request_uri.clone()),
                ]);
                ListItem::new(content).style(row_style(i == cursor))
            })
            .collect()
    };

    let title = format!(
        "Attack Logs ({}) - [↑/↓] select  [Enter] detail",
        records.len()
    );
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, chunks[1]);
}
