use crate::chart::ChartRenderer;
use crate::normalize::{format_number, DistributionKind, StatsSnapshot};
use crate::tui::chart_view::render_chart;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

pub fn render(
    f: &mut Frame,
    area: Rect,
    stats: Option<&StatsSnapshot>,
    charts: &ChartRenderer,
    focus: DistributionKind,
    legend_cursor: usize,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),      // Counters
            Constraint::Percentage(50), // Attack types / OS / hosts
            Constraint::Min(0),         // Status codes / top IPs
        ])
        .split(area);

    render_counters(f, rows[0], stats);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);

    let cells = [
        (DistributionKind::AttackTypes, top[0]),
        (DistributionKind::Os, top[1]),
        (DistributionKind::Hosts, top[2]),
        (DistributionKind::StatusCodes, bottom[0]),
        (DistributionKind::TopIps, bottom[1]),
    ];
    for (target, cell) in cells {
        render_chart(f, cell, charts.get(target), target == focus, legend_cursor);
    }
}

fn render_counters(f: &mut Frame, area: Rect, stats: Option<&StatsSnapshot>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let value = |n: Option<u64>| n.map(format_number).unwrap_or_else(|| "-".to_string());
    let label = Style::default().fg(Color::Gray);
    let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

    let text = vec![
        Line::from(vec![
            Span::styled("Total Requests: ", label),
            Span::styled(value(stats.map(|s| s.total_requests)), bold(Color::Cyan)),
            Span::raw("    "),
            Span::styled("Blocked: ", label),
            Span::styled(value(stats.map(|s| s.blocked_requests)), bold(Color::Red)),
        ]),
        Line::from(vec![
            Span::styled("Blocked IPs: ", label),
            Span::styled(value(stats.map(|s| s.blocked_ips)), bold(Color::Yellow)),
            Span::raw("    "),
            Span::styled("CC Attacks: ", label),
            Span::styled(value(stats.map(|s| s.cc_attacks)), bold(Color::Magenta)),
        ]),
    ];

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Traffic")),
        chunks[0],
    );

    let (ratio, label_text) = match stats {
        Some(s) if s.total_requests > 0 => (
            s.blocked_requests as f64 / s.total_requests as f64,
            s.block_rate(),
        ),
        Some(s) => (0.0, s.block_rate()),
        None => (0.0, "-".to_string()),
    };
    let color = if ratio > 0.10 {
        Color::Red
    } else if ratio > 0.01 {
        Color::Yellow
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Block Rate"))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label_text);

    f.render_widget(gauge, chunks[1]);
}
