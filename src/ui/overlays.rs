use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

const HELP_LINES: &[(&str, &str)] = &[
    ("Ctrl+Y", "Copy preview as rich text (HTML + plain text)"),
    ("Ctrl+P", "Export preview as PDF (markdown-export.pdf)"),
    ("Enter / Tab", "New line / insert indent"),
    ("Arrows", "Move cursor"),
    ("Ctrl+Left/Right", "Move by word"),
    ("Home / End", "Start / end of line"),
    ("Ctrl+Home/End", "Start / end of document"),
    ("PgUp / PgDn", "Scroll the preview"),
    ("Mouse wheel", "Scroll the pane under the pointer"),
    ("F1", "Toggle this help"),
    ("Ctrl+Q", "Quit"),
];

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = help_rect(area);
    frame.render_widget(Clear, popup);

    let key_width = HELP_LINES
        .iter()
        .map(|(keys, _)| keys.len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for (keys, action) in HELP_LINES {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {keys:<key_width$}  "),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(*action),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        " press any key to close ",
        Style::default().add_modifier(Modifier::DIM),
    ));

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn help_rect(area: Rect) -> Rect {
    #[allow(clippy::cast_possible_truncation)]
    let height = (HELP_LINES.len() as u16 + 6).min(area.height);
    let width = 64.min(area.width);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
