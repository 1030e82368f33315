use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{EngineStatus, ToastLevel};
use crate::editor::Direction;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Split line at cursor (Enter)
    InsertNewline,
    /// Insert indentation at the cursor (Tab)
    InsertTab,
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,

    // Cursor movement
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to beginning of line (Home)
    MoveHome,
    /// Move cursor to end of line (End)
    MoveEnd,
    /// Move cursor one word left (Ctrl+Left)
    MoveWordLeft,
    /// Move cursor one word right (Ctrl+Right)
    MoveWordRight,
    /// Move cursor to start of buffer (Ctrl+Home)
    MoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    MoveToEnd,
    /// Move cursor to absolute position (line, col) — e.g. from mouse click
    MoveTo(usize, usize),

    // Editor pane scrolling (mouse wheel; cursor stays put)
    EditorScrollUp(usize),
    EditorScrollDown(usize),

    // Preview pane scrolling
    PreviewScrollUp(usize),
    PreviewScrollDown(usize),
    PreviewPageUp,
    PreviewPageDown,

    // Export actions (side effects live in `effects`)
    /// Copy the rendered preview as rich text
    CopyRichText,
    /// Export the rendered preview as a PDF
    ExportPdf,
    /// The PDF engine load resolved
    EngineStatusChanged(EngineStatus),
    /// A PDF export worker finished
    ExportFinished(Result<PathBuf, String>),

    // Window
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message edits the document or moves the cursor.
    const fn touches_editor(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertNewline
                | Self::InsertTab
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::MoveCursor(_)
                | Self::MoveHome
                | Self::MoveEnd
                | Self::MoveWordLeft
                | Self::MoveWordRight
                | Self::MoveToStart
                | Self::MoveToEnd
                | Self::MoveTo(_, _)
        )
    }

    const fn edits_document(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertNewline
                | Self::InsertTab
                | Self::DeleteBack
                | Self::DeleteForward
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function.
pub fn update(mut model: Model, msg: Message) -> Model {
    let touches_editor = msg.touches_editor();
    let edits_document = msg.edits_document();

    match msg {
        // Editing
        Message::InsertChar(ch) => model.buffer.insert_char(ch),
        Message::InsertNewline => model.buffer.split_line(),
        Message::InsertTab => model.buffer.insert_str("  "),
        Message::DeleteBack => {
            model.buffer.delete_back();
        }
        Message::DeleteForward => {
            model.buffer.delete_forward();
        }

        // Cursor movement
        Message::MoveCursor(dir) => model.buffer.move_cursor(dir),
        Message::MoveHome => model.buffer.move_home(),
        Message::MoveEnd => model.buffer.move_end(),
        Message::MoveWordLeft => model.buffer.move_word_left(),
        Message::MoveWordRight => model.buffer.move_word_right(),
        Message::MoveToStart => model.buffer.move_to_start(),
        Message::MoveToEnd => model.buffer.move_to_end(),
        Message::MoveTo(line, col) => model.buffer.move_to(line, col),

        // Editor pane scrolling
        Message::EditorScrollUp(n) => {
            model.editor_scroll_offset = model.editor_scroll_offset.saturating_sub(n);
        }
        Message::EditorScrollDown(n) => {
            let max = model.buffer.line_count().saturating_sub(1);
            model.editor_scroll_offset = (model.editor_scroll_offset + n).min(max);
        }

        // Preview pane scrolling
        Message::PreviewScrollUp(n) => model.preview_viewport.scroll_up(n),
        Message::PreviewScrollDown(n) => model.preview_viewport.scroll_down(n),
        Message::PreviewPageUp => model.preview_viewport.page_up(),
        Message::PreviewPageDown => model.preview_viewport.page_down(),

        // Export lifecycle
        Message::EngineStatusChanged(status) => {
            match &status {
                EngineStatus::Failed(err) => model.show_toast_with_detail(
                    ToastLevel::Warning,
                    "PDF export unavailable",
                    err.clone(),
                ),
                EngineStatus::TimedOut => model.show_toast(
                    ToastLevel::Warning,
                    "PDF engine load timed out",
                ),
                EngineStatus::Loading | EngineStatus::Ready => {}
            }
            model.engine_status = status;
        }
        Message::ExportFinished(outcome) => {
            model.exporting = false;
            match outcome {
                Ok(path) => model.show_toast_with_detail(
                    ToastLevel::Info,
                    "PDF exported",
                    path.display().to_string(),
                ),
                Err(err) => {
                    model.show_toast_with_detail(ToastLevel::Error, "Error generating PDF", err);
                }
            }
        }

        // CopyRichText / ExportPdf: handled in effects (side effects)
        // Redraw: no state change needed
        Message::CopyRichText | Message::ExportPdf | Message::Redraw => {}

        // Window
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => model.resize(width, height),

        // Application
        Message::Quit => model.should_quit = true,
    }

    if edits_document {
        // Keystroke → new document → synchronous re-render. No debouncing;
        // the preview is always consistent with the buffer.
        model.refresh_preview();
    }
    if touches_editor {
        model.editor_ensure_cursor_visible();
        model.sync_preview_to_cursor();
    }
    model
}
