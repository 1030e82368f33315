use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{EngineStatus, Model};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let cursor = model.buffer.cursor();
    let words = model.buffer.word_count();

    let pdf_state = if model.exporting {
        "exporting…"
    } else {
        match &model.engine_status {
            EngineStatus::Loading => "loading",
            EngineStatus::Ready => "ready",
            EngineStatus::Failed(_) => "unavailable",
            EngineStatus::TimedOut => "timed out",
        }
    };

    let raw_html = if model.render_options.raw_html {
        " [raw-html]"
    } else {
        ""
    };
    let plain_code = if model.render_options.highlight {
        ""
    } else {
        " [plain-code]"
    };

    let status = format!(
        " inkdown  Ln {}, Col {}  {} words  pdf: {}{}{}  ^Y:copy ^P:pdf F1:help ^Q:quit",
        cursor.line + 1,
        cursor.col + 1,
        words,
        pdf_state,
        raw_html,
        plain_code,
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((title, detail, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        crate::app::ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        crate::app::ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        crate::app::ToastLevel::Error => {
            ("[error]", Style::default().bg(Color::Red).fg(Color::White))
        }
    };
    let text = match detail {
        Some(detail) => format!("{prefix} {title}: {detail}"),
        None => format!("{prefix} {title}"),
    };
    let toast = Paragraph::new(text).style(style);
    frame.render_widget(toast, area);
}
