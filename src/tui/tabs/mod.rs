pub mod dashboard;
pub mod help;
pub mod ip_lists;
pub mod login;
pub mod logs;
pub mod rules;
pub mod settings;
pub mod text_lists;

use crate::tui::app::Page;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};

pub fn render_tab_bar(
    f: &mut Frame,
    area: Rect,
    selected: usize,
    authenticated: bool,
    busy: bool,
    base_url: &str,
) {
    let mut title = vec![Span::raw(format!("WAF Console {} ", base_url))];
    if authenticated {
        title.push(Span::styled("● Signed in", Style::default().fg(Color::Green)));
    } else {
        title.push(Span::styled("● Signed out", Style::default().fg(Color::Red)));
    }
    if busy {
        title.push(Span::styled(" ⟳ Loading...", Style::default().fg(Color::Yellow)));
    }

    let tabs = Tabs::new(
        Page::ALL
            .iter()
            .enumerate()
            .map(|(i, page)| Line::from(vec![Span::raw(format!("{} {}", i + 1, page.title()))]))
            .collect::<Vec<_>>(),
    )
    .block(Block::default().borders(Borders::ALL).title(Line::from(title)))
    .select(selected)
    .style(Style::default().fg(if authenticated { Color::White } else { Color::DarkGray }))
    .highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    f.render_widget(tabs, area);
}

/// First row to draw so that `cursor` stays inside a window of `height` rows.
pub(crate) fn window_start(cursor: usize, height: usize) -> usize {
    if height == 0 || cursor < height {
        0
    } else {
        cursor + 1 - height
    }
}

pub(crate) fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_follows_cursor() {
        assert_eq!(window_start(0, 10), 0);
        assert_eq!(window_start(9, 10), 0);
        assert_eq!(window_start(10, 10), 1);
        assert_eq!(window_start(25, 10), 16);
        assert_eq!(window_start(3, 0), 0);
    }
}
