// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # Inkdown
//!
//! A terminal markdown editor with live preview and rich export.
//!
//! Inkdown shows an editable markdown buffer next to its rendered form and
//! can hand the rendered result onward:
//! - Copy as rich text (HTML + plain-text clipboard payload)
//! - Export as an A4 PDF
//! - Syntax-highlighted code blocks, GFM tables, strikethrough, autolinks
//!
//! ## Architecture
//!
//! Inkdown uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: The rope-backed input buffer
//! - [`document`]: Markdown parsing and preview layout
//! - [`export`]: Clipboard and PDF export
//! - [`highlight`]: Syntax highlighting
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod perf;
pub mod sample;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::editor::EditorBuffer;
    pub use crate::ui::viewport::Viewport;
}
