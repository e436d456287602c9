use super::{row_style, window_start};
use crate::normalize::RuleLevel;
use crate::reconcile::RuleBook;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, book: &RuleBook, cursor: usize) {
    let title = "Detection Rules - [Space] toggle  [v] view  [Shift+R] reload config";

    if let Some(error) = book.load_error() {
        let widget = Paragraph::new(vec![
            Line::from(""),
            Line::styled(error, Style::default().fg(Color::Red)),
            Line::from(""),
            Line::from("Press 'r' to retry"),
        ])
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(widget, area);
        return;
    }

    if !book.is_loaded() {
        let widget = Paragraph::new("Loading rules...")
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(widget, area);
        return;
    }

    let height = area.height.saturating_sub(3) as usize;
    let start = window_start(cursor, height);

    let rows: Vec<Row> = book
        .rules()
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, rule)| {
            let level_color = match rule.level {
                RuleLevel::High => Color::Red,
                RuleLevel::Medium => Color::Yellow,
                RuleLevel::Low => Color::Green,
            };
            let (state, state_color) = if rule.enabled {
                ("● on", Color::Green)
            } else {
                ("○ off", Color::DarkGray)
            };

            Row::new(vec![
                Cell::from(state).style(Style::default().fg(state_color)),
                Cell::from(rule.name.clone()),
                Cell::from(rule.file.clone()).style(Style::default().fg(Color::Gray)),
                Cell::from(rule.level.as_str()).style(Style::default().fg(level_color)),
                Cell::from(rule.position.clone()),
                Cell::from(rule.description.clone()),
            ])
            .style(row_style(i == cursor))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["State", "Name", "File", "Level", "Position", "Description"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({} rules)", title, book.rules().len())),
    );

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_rules;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn draw(book: &RuleBook, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, f.size(), book, 0)).unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer.get(x, y).symbol()).collect())
            .collect()
    }

    #[test]
    fn test_disabled_high_rule_row() {
        let mut book = RuleBook::new();
        book.replace(
            normalize_rules(&json!({
                "sqli": {"name": "SQLi", "level": "high", "enabled": false}
            }))
            .unwrap(),
        );

        let lines = draw(&book, 100, 6);
        let rows: Vec<&String> = lines.iter().filter(|l| l.contains("sqli.lua")).collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("○ off"));
        assert!(rows[0].contains("high"));
        assert!(rows[0].contains("SQLi"));
        assert!(lines[0].contains("(1 rules)"));
    }

    #[test]
    fn test_load_error_replaces_table() {
        let mut book = RuleBook::new();
        book.fail("Load failed: request failed");

        let lines = draw(&book, 80, 6);
        assert!(lines.iter().any(|l| l.contains("Load failed: request failed")));
        assert!(!lines.iter().any(|l| l.contains("Position")));
    }
}
