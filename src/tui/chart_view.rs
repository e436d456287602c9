//! Terminal drawing for chart specifications.

use crate::chart::{BarSeries, ChartBody, ChartHandle, DataOrigin, PieSlice};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const SLICE_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
    Color::LightMagenta,
];

/// Draw one chart. `legend_cursor` is highlighted when the chart has focus.
pub fn render_chart(
    f: &mut Frame,
    area: Rect,
    handle: Option<&ChartHandle>,
    focused: bool,
    legend_cursor: usize,
) {
    let Some(handle) = handle else {
        let widget = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, area);
        return;
    };

    let spec = handle.spec();
    let mut border = Style::default();
    if focused {
        border = border.fg(Color::Yellow);
    }
    let title_style = match spec.origin {
        DataOrigin::Live => Style::default().fg(Color::Cyan),
        DataOrigin::Sample => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(spec.title.clone(), title_style));

    match &spec.body {
        ChartBody::NoData { message } => {
            let widget = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(*message, Style::default().fg(Color::DarkGray))),
            ])
            .alignment(Alignment::Center)
            .block(block);
            f.render_widget(widget, area);
        }
        ChartBody::Bar(series) => render_bar(f, area, block, series),
        ChartBody::Pie(slices) => render_pie(f, area, block, slices, focused, legend_cursor),
    }
}

fn render_bar(f: &mut Frame, area: Rect, block: Block, series: &BarSeries) {
    let data: Vec<(&str, u64)> = series
        .labels
        .iter()
        .map(String::as_str)
        .zip(series.values.iter().copied())
        .collect();

    let inner_width = area.width.saturating_sub(2) as usize;
    let bars = data.len().max(1);
    let bar_width = (inner_width / bars).saturating_sub(1).clamp(1, 9) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .max(series.axis_max.max(1))
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, area);
}

/// Pie charts are drawn as a legend with proportional bars; hidden slices are struck out.
fn render_pie(
    f: &mut Frame,
    area: Rect,
    block: Block,
    slices: &[PieSlice],
    focused: bool,
    legend_cursor: usize,
) {
    let bar_room = area.width.saturating_sub(30).max(4) as f64;

    let items: Vec<ListItem> = slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let color = SLICE_COLORS[i % SLICE_COLORS.len()];
            let mut label_style = Style::default();
            if !slice.visible {
                label_style = label_style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            }
            if focused && i == legend_cursor {
                label_style = label_style.add_modifier(Modifier::REVERSED);
            }
            let filled = (slice.share / 100.0 * bar_room).round() as usize;

            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(if slice.visible { color } else { Color::DarkGray })),
                Span::styled(format!("{:<14}", truncate(&slice.label, 14)), label_style),
                Span::styled(format!("{:>7} ", slice.share_label()), Style::default().fg(Color::Gray)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
