use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::Model;

use super::{overlays, status};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let panes_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    let chunks = super::split_columns(panes_area);
    render_editor(model, frame, chunks[0]);
    render_preview(model, frame, chunks[1]);

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Markdown ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buf = &model.buffer;
    let total_lines = buf.line_count();
    let gutter_width = super::line_number_width(total_lines);

    let visible_height = inner.height as usize;
    let start = model.editor_scroll_offset.min(total_lines.saturating_sub(1));
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);

        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];

        if line_idx == cursor.line {
            // Split line at cursor position for cursor rendering
            let col = cursor.col.min(line_text.len());
            let before = &line_text[..col];
            let cursor_char = line_text.get(col..=col).unwrap_or(" ");
            let after = if col < line_text.len() {
                line_text.get(col + 1..).unwrap_or("")
            } else {
                ""
            };

            if !before.is_empty() {
                spans.push(Span::raw(before.to_string()));
            }
            spans.push(Span::styled(
                cursor_char.to_string(),
                Style::default().bg(Color::White).fg(Color::Black),
            ));
            if !after.is_empty() {
                spans.push(Span::raw(after.to_string()));
            }
        } else {
            spans.push(Span::raw(line_text));
        }

        content.push(Line::from(spans));
    }

    frame.render_widget(Clear, inner);
    frame.render_widget(Paragraph::new(content), inner);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Preview ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible_lines = model.preview.visible_lines(
        model.preview_viewport.offset(),
        inner.height as usize,
    );

    let mut content: Vec<Line> = Vec::new();
    for line in visible_lines {
        let line_style = super::style::style_for_line_type(line.line_type());
        if let Some(spans) = line.spans() {
            let styled_spans = spans
                .iter()
                .map(|span| {
                    Span::styled(
                        span.text().to_string(),
                        super::style::style_for_inline(line_style, span),
                    )
                })
                .collect::<Vec<_>>();
            content.push(Line::from(styled_spans));
        } else {
            content.push(Line::styled(line.content().to_string(), line_style));
        }
    }

    frame.render_widget(Clear, inner);
    frame.render_widget(Paragraph::new(content), inner);
}
