use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, settings: Option<&str>, error: Option<&str>) {
    let content: Vec<Line> = match (settings, error) {
        (_, Some(error)) => vec![
            Line::from(""),
            Line::styled(error, Style::default().fg(Color::Red)),
            Line::from(""),
            Line::from("Press 'r' to retry"),
        ],
        (Some(text), None) => text.lines().map(Line::from).collect(),
        (None, None) => vec![Line::from("Loading waf.conf...")],
    };

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("waf.conf - [e] edit  [Shift+R] reload config"),
    );
    f.render_widget(widget, area);
}
