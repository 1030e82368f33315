//! The rope-backed input buffer behind the editor pane.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};
