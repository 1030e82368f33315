use std::time::{Duration, Instant};

use crate::document::{Document, RenderOptions};
use crate::editor::EditorBuffer;
use crate::sample::SAMPLE_DOCUMENT;
use crate::ui::viewport::Viewport;

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    title: String,
    detail: Option<String>,
    expires_at: Instant,
}

/// State of the asynchronously loaded PDF engine.
///
/// Starts `Loading` and resolves exactly once to one of the other variants.
/// Export is available only in `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Loading,
    Ready,
    Failed(String),
    TimedOut,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The markdown source being edited
    pub buffer: EditorBuffer,
    /// The rendered preview, recomputed synchronously on every edit
    pub preview: Document,
    /// Rendering mode (raw-HTML passthrough, syntax coloring)
    pub render_options: RenderOptions,
    /// Scroll state of the preview pane
    pub preview_viewport: Viewport,
    /// First visible source line in the editor pane
    pub editor_scroll_offset: usize,
    /// Readiness of the PDF export engine
    pub engine_status: EngineStatus,
    /// True while a PDF export worker is running
    pub exporting: bool,
    /// Whether the help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Terminal size, for pane layout
    pub terminal_width: u16,
    pub terminal_height: u16,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("engine_status", &self.engine_status)
            .field("exporting", &self.exporting)
            .field("help_visible", &self.help_visible)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model holding the sample document.
    pub fn new(render_options: RenderOptions, terminal_size: (u16, u16)) -> Self {
        Self::with_source(SAMPLE_DOCUMENT, render_options, terminal_size)
    }

    /// Create a model from explicit markdown source.
    pub fn with_source(
        source: &str,
        render_options: RenderOptions,
        terminal_size: (u16, u16),
    ) -> Self {
        let (width, height) = terminal_size;
        let content_width = crate::ui::preview_content_width(width);
        let content_height = crate::ui::pane_content_height(height);
        let preview = Document::render(source, content_width, render_options);
        let total = preview.line_count();
        Self {
            buffer: EditorBuffer::from_text(source),
            preview,
            render_options,
            preview_viewport: Viewport::new(content_width, content_height, total),
            editor_scroll_offset: 0,
            engine_status: EngineStatus::Loading,
            exporting: false,
            help_visible: false,
            should_quit: false,
            terminal_width: width,
            terminal_height: height,
            toast: None,
        }
    }

    /// Whether the PDF engine is loaded and callable.
    pub const fn engine_ready(&self) -> bool {
        matches!(self.engine_status, EngineStatus::Ready)
    }

    /// Re-render the preview from the current buffer text.
    ///
    /// Runs synchronously on every edit; the preview can never lag the
    /// document.
    pub fn refresh_preview(&mut self) {
        let width = crate::ui::preview_content_width(self.terminal_width);
        self.preview = Document::render(&self.buffer.text(), width, self.render_options);
        self.preview_viewport
            .set_total_lines(self.preview.line_count());
    }

    /// Apply a terminal resize: recompute pane geometry and re-render.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
        self.preview_viewport.resize(
            crate::ui::preview_content_width(width),
            crate::ui::pane_content_height(height),
        );
        self.refresh_preview();
    }

    /// Keep the editor cursor line inside the editor pane.
    pub fn editor_ensure_cursor_visible(&mut self) {
        let cursor_line = self.buffer.cursor().line;
        let visible_height = usize::from(self.preview_viewport.height());
        if visible_height == 0 {
            self.editor_scroll_offset = cursor_line;
            return;
        }

        if cursor_line < self.editor_scroll_offset {
            self.editor_scroll_offset = cursor_line;
        } else if cursor_line >= self.editor_scroll_offset + visible_height {
            self.editor_scroll_offset = cursor_line + 1 - visible_height;
        }
    }

    /// Scroll the preview to track the editor cursor proportionally.
    ///
    /// Source lines and rendered lines don't correspond one-to-one, so the
    /// mapping is by position ratio.
    pub fn sync_preview_to_cursor(&mut self) {
        let source_total = self.buffer.line_count().saturating_sub(1).max(1);
        let rendered_total = self.preview.line_count().saturating_sub(1);
        let cursor_line = self.buffer.cursor().line;
        let target = (cursor_line * rendered_total) / source_total;
        // Center-ish: keep the mapped line a third down the pane.
        let lead = usize::from(self.preview_viewport.height()) / 3;
        self.preview_viewport.go_to_line(target.saturating_sub(lead));
    }

    pub fn show_toast(&mut self, level: ToastLevel, title: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            title: title.into(),
            detail: None,
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub fn show_toast_with_detail(
        &mut self,
        level: ToastLevel,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.toast = Some(Toast {
            level,
            title: title.into(),
            detail: Some(detail.into()),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    /// Drop the toast once its deadline passes. Returns true when it expired.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, Option<&str>, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.title.as_str(), toast.detail.as_deref(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::with_source("", RenderOptions::default(), (80, 24))
    }
}
