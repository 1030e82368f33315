use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Message, Model};
use crate::editor::Direction;

use super::event_loop::ResizeDebouncer;

/// Lines moved per mouse wheel tick.
const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }

        // The help overlay swallows everything and closes on any key.
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl {
            return match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('y') => Some(Message::CopyRichText),
                KeyCode::Char('p') => Some(Message::ExportPdf),
                KeyCode::Left => Some(Message::MoveWordLeft),
                KeyCode::Right => Some(Message::MoveWordRight),
                KeyCode::Home => Some(Message::MoveToStart),
                KeyCode::End => Some(Message::MoveToEnd),
                _ => None,
            };
        }

        match key.code {
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(Message::InsertChar(ch))
            }
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Tab => Some(Message::InsertTab),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PreviewPageUp),
            KeyCode::PageDown => Some(Message::PreviewPageDown),
            _ => None,
        }
    }

    fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            if matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left)) {
                return Some(Message::HideHelp);
            }
            return None;
        }

        let in_preview = crate::ui::column_is_in_preview(mouse.column, model.terminal_width);

        match mouse.kind {
            MouseEventKind::ScrollUp => Some(if in_preview {
                Message::PreviewScrollUp(WHEEL_LINES)
            } else {
                Message::EditorScrollUp(WHEEL_LINES)
            }),
            MouseEventKind::ScrollDown => Some(if in_preview {
                Message::PreviewScrollDown(WHEEL_LINES)
            } else {
                Message::EditorScrollDown(WHEEL_LINES)
            }),
            MouseEventKind::Down(MouseButton::Left) if !in_preview => {
                let (line, col) = editor_position_for_click(model, mouse.column, mouse.row)?;
                Some(Message::MoveTo(line, col))
            }
            _ => None,
        }
    }
}

/// Map a click inside the editor pane to a buffer position.
fn editor_position_for_click(model: &Model, column: u16, row: u16) -> Option<(usize, usize)> {
    // One border row above the content, one border column plus the gutter
    // to its left.
    let content_row = row.checked_sub(1)?;
    let line = model.editor_scroll_offset + usize::from(content_row);
    if line >= model.buffer.line_count() {
        return None;
    }
    let gutter = crate::ui::line_number_width(model.buffer.line_count()) + 1;
    let col = usize::from(column.saturating_sub(1).saturating_sub(gutter));
    Some((line, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RenderOptions;
    use crossterm::event::{KeyEvent, KeyEventState};

    fn model() -> Model {
        Model::with_source("hello\nworld", RenderOptions::default(), (100, 30))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_plain_char_inserts() {
        let msg = App::handle_key(key(KeyCode::Char('a'), KeyModifiers::NONE), &model());
        assert_eq!(msg, Some(Message::InsertChar('a')));
    }

    #[test]
    fn test_shifted_char_still_inserts() {
        let msg = App::handle_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT), &model());
        assert_eq!(msg, Some(Message::InsertChar('A')));
    }

    #[test]
    fn test_ctrl_y_copies() {
        let msg = App::handle_key(key(KeyCode::Char('y'), KeyModifiers::CONTROL), &model());
        assert_eq!(msg, Some(Message::CopyRichText));
    }

    #[test]
    fn test_ctrl_p_exports() {
        let msg = App::handle_key(key(KeyCode::Char('p'), KeyModifiers::CONTROL), &model());
        assert_eq!(msg, Some(Message::ExportPdf));
    }

    #[test]
    fn test_ctrl_q_quits() {
        let msg = App::handle_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL), &model());
        assert_eq!(msg, Some(Message::Quit));
    }

    #[test]
    fn test_any_key_closes_help() {
        let mut m = model();
        m.help_visible = true;
        let msg = App::handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &m);
        assert_eq!(msg, Some(Message::HideHelp));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let event = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(App::handle_key(event, &model()), None);
    }

    #[test]
    fn test_page_keys_scroll_preview() {
        let msg = App::handle_key(key(KeyCode::PageDown, KeyModifiers::NONE), &model());
        assert_eq!(msg, Some(Message::PreviewPageDown));
    }
}
