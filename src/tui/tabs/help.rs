use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("Tab / Shift+Tab", "Next / previous page"),
            ("1-7", "Jump to page"),
            ("↑ / ↓", "Move selection, scroll popups"),
            ("Esc", "Close popup or prompt"),
            ("q", "Quit"),
        ],
    ),
    (
        "Everywhere",
        &[
            ("r", "Reload the current page"),
            ("Shift+R", "Reload WAF configuration"),
            ("L", "Log out"),
        ],
    ),
    (
        "Dashboard",
        &[
            ("← / →", "Focus previous / next chart"),
            ("Space", "Show or hide the selected pie slice"),
        ],
    ),
    (
        "Rules",
        &[
            ("Space / Enter", "Enable or disable the selected rule"),
            ("v", "View rule source"),
        ],
    ),
    (
        "IP Lists",
        &[
            ("← / →", "Switch between whitelist and blacklist"),
            ("a", "Add an IP or CIDR"),
            ("d", "Remove the selected entry"),
        ],
    ),
    (
        "Text Lists / Settings",
        &[("← / →", "Select list"), ("e", "Edit in $EDITOR and save")],
    ),
    (
        "Logs",
        &[
            ("h / t", "Set host / date and run the query"),
            ("Enter", "Show the full record"),
        ],
    ),
];

pub fn render(f: &mut Frame, area: Rect) {
    let mut content = vec![
        Line::from(Span::styled(
            "WAF Console - Keyboard Shortcuts",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (section, keys) in SECTIONS {
        content.push(Line::from(Span::styled(
            *section,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            content.push(Line::from(vec![
                Span::styled(format!("  {:16}", key), Style::default().fg(Color::Green)),
                Span::raw(*action),
            ]));
        }
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        "Rule toggles and waf.conf edits take effect after a configuration reload.",
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    )));

    let widget = Paragraph::new(content).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(widget, area);
}
