//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management for the preview
//! - [`style`]: Theming and colors
//! - Pane layout, status/toast bars, and the help overlay

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::render;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;

/// Split the content area into editor and preview columns.
pub fn split_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area)
}

/// Width available for rendered preview lines (inside the pane border).
pub fn preview_content_width(total_width: u16) -> u16 {
    let area = Rect::new(0, 0, total_width, 1);
    split_columns(area)[1].width.saturating_sub(2).max(1)
}

/// Rows available for pane content: total minus status bar and borders.
pub fn pane_content_height(total_height: u16) -> u16 {
    total_height.saturating_sub(1).saturating_sub(2).max(1)
}

/// Whether a terminal column falls in the preview pane.
pub fn column_is_in_preview(column: u16, total_width: u16) -> bool {
    let area = Rect::new(0, 0, total_width, 1);
    column >= split_columns(area)[1].x
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
