//! Rich-text clipboard export.
//!
//! The copy action writes two representations of the rendered document
//! atomically — HTML and plain text — and degrades to plain text only when
//! the platform rejects the rich payload. A terminal-level OSC 52 write is
//! the last resort for the plain path (e.g. over SSH with no display server).

use std::io::{Write, stdout};

use base64::Engine;
use thiserror::Error;

use crate::document::Document;
use crate::export::html;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard rejected rich payload: {0}")]
    RichRejected(String),
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// How a copy ultimately landed on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// HTML + plain text written atomically.
    Rich,
    /// Rich write rejected; plain text written instead.
    PlainFallback,
}

/// Destination for clipboard writes.
///
/// Injected into the app so tests can simulate platforms that reject the
/// rich payload.
pub trait ClipboardSink {
    /// Write HTML and plain-text representations as one atomic payload.
    fn write_rich(&mut self, html: &str, text: &str) -> Result<(), ClipboardError>;
    /// Write plain text only.
    fn write_plain(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Copy the rendered document as rich text, falling back to plain text.
///
/// Never panics and never leaves the caller without an answer: the result
/// maps one-to-one onto a user notification.
pub fn copy_rich_text(
    doc: &Document,
    sink: &mut dyn ClipboardSink,
) -> Result<CopyOutcome, ClipboardError> {
    let html = html::to_html(doc);
    let text = doc.plain_text();

    match sink.write_rich(&html, &text) {
        Ok(()) => Ok(CopyOutcome::Rich),
        Err(err) => {
            tracing::warn!("rich clipboard write rejected, falling back to plain text: {err}");
            sink.write_plain(&text).map(|()| CopyOutcome::PlainFallback)
        }
    }
}

/// The real system clipboard.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_rich(&mut self, html: &str, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| ClipboardError::RichRejected(err.to_string()))?;
        clipboard
            .set_html(html, Some(text))
            .map_err(|err| ClipboardError::RichRejected(err.to_string()))
    }

    fn write_plain(&mut self, text: &str) -> Result<(), ClipboardError> {
        let arboard_result = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text));
        if arboard_result.is_ok() {
            return Ok(());
        }
        // Headless terminals (SSH, no display server): OSC 52 still reaches
        // the user's local clipboard through the terminal emulator.
        copy_via_osc52(text).map_err(|err| ClipboardError::WriteFailed(err.to_string()))
    }
}

fn copy_via_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RenderOptions;

    /// Records writes; optionally rejects the rich or plain path.
    #[derive(Default)]
    pub struct StubClipboard {
        pub reject_rich: bool,
        pub reject_plain: bool,
        pub rich_payload: Option<(String, String)>,
        pub plain_payload: Option<String>,
    }

    impl ClipboardSink for StubClipboard {
        fn write_rich(&mut self, html: &str, text: &str) -> Result<(), ClipboardError> {
            if self.reject_rich {
                return Err(ClipboardError::RichRejected("unsupported format".into()));
            }
            self.rich_payload = Some((html.to_string(), text.to_string()));
            Ok(())
        }

        fn write_plain(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.reject_plain {
                return Err(ClipboardError::WriteFailed("no clipboard".into()));
            }
            self.plain_payload = Some(text.to_string());
            Ok(())
        }
    }

    fn doc() -> Document {
        Document::render("# Title\n\nsome **bold** text", 80, RenderOptions::default())
    }

    #[test]
    fn test_rich_copy_carries_both_representations() {
        let mut sink = StubClipboard::default();
        let outcome = copy_rich_text(&doc(), &mut sink).unwrap();
        assert_eq!(outcome, CopyOutcome::Rich);

        let (html, text) = sink.rich_payload.expect("rich payload written");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(text.contains("Title"));
        assert!(!text.contains('<'), "plain text must carry no markup");
        assert!(sink.plain_payload.is_none());
    }

    #[test]
    fn test_rejected_rich_write_falls_back_to_plain() {
        let mut sink = StubClipboard {
            reject_rich: true,
            ..StubClipboard::default()
        };
        let outcome = copy_rich_text(&doc(), &mut sink).unwrap();
        assert_eq!(outcome, CopyOutcome::PlainFallback);

        let plain = sink.plain_payload.expect("plain fallback written");
        // The fallback receives the preview's text content.
        assert_eq!(plain, doc().plain_text());
        assert!(!plain.is_empty());
    }

    #[test]
    fn test_both_paths_rejected_surfaces_error() {
        let mut sink = StubClipboard {
            reject_rich: true,
            reject_plain: true,
            ..StubClipboard::default()
        };
        let err = copy_rich_text(&doc(), &mut sink).unwrap_err();
        assert!(matches!(err, ClipboardError::WriteFailed(_)));
    }

    #[test]
    fn test_osc52_sequence_encodes_text() {
        let seq = osc52_sequence("hi");
        assert_eq!(seq, "\x1b]52;c;aGk=\x07");
    }
}
