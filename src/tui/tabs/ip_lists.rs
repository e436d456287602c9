use super::{row_style, window_start};
use crate::api::IpListKind;
use crate::reconcile::MembershipLists;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn render(
    f: &mut Frame,
    area: Rect,
    lists: &MembershipLists,
    active: IpListKind,
    cursor: usize,
    error: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (kind, chunk) in [(IpListKind::White, chunks[0]), (IpListKind::Black, chunks[1])] {
        let is_active = kind == active;
        render_list(
            f,
            chunk,
            kind,
            lists.get(kind),
            is_active.then_some(cursor),
            error,
        );
    }
}

fn render_list(
    f: &mut Frame,
    area: Rect,
    kind: IpListKind,
    entries: &[String],
    cursor: Option<usize>,
    error: Option<&str>,
) {
    let height = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if let Some(error) = error {
        vec![ListItem::new(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )))]
    } else if entries.is_empty() {
        vec![ListItem::new(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let start = cursor.map(|c| window_start(c, height)).unwrap_or(0);
        entries
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, ip)| ListItem::new(format!("  {}", ip)).style(row_style(cursor == Some(i))))
            .collect()
    };

    let (title_color, hint) = if cursor.is_some() {
        (Color::Yellow, " - [a] add  [d] remove  [←/→] switch")
    } else {
        (Color::Gray, "")
    };
    let title = match kind {
        IpListKind::White => "Whitelist",
        IpListKind::Black => "Blacklist",
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(title_color))
            .title(format!("{} ({}){}", title, entries.len(), hint)),
    );

    f.render_widget(list, area);
}
