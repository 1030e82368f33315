//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{EngineStatus, Model, ToastLevel};
pub use update::{Message, update};

use std::time::Duration;

use crate::document::RenderOptions;
use crate::export::clipboard::{ClipboardSink, SystemClipboard};

/// How long the engine load may take before it is reported as timed out.
const PDF_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Main application struct that owns the terminal and runs the event loop.
///
/// The clipboard sink is an injected dependency so the copy path can be
/// exercised against rejecting platforms in tests.
pub struct App {
    render_options: RenderOptions,
    clipboard: Box<dyn ClipboardSink>,
    pdf_load_timeout: Duration,
}

impl App {
    /// Create a new application with the system clipboard.
    pub fn new() -> Self {
        Self {
            render_options: RenderOptions::default(),
            clipboard: Box::new(SystemClipboard),
            pdf_load_timeout: PDF_LOAD_TIMEOUT,
        }
    }

    /// Set the rendering mode (raw-HTML passthrough, syntax coloring).
    #[must_use]
    pub const fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Replace the clipboard sink.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Override the engine-load deadline.
    #[must_use]
    pub const fn with_pdf_load_timeout(mut self, timeout: Duration) -> Self {
        self.pdf_load_timeout = timeout;
        self
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
