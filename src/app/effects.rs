use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::app::{App, Message, Model, ToastLevel};
use crate::export::ExportConfig;
use crate::export::clipboard::{CopyOutcome, copy_rich_text};
use crate::export::pdf::PdfRenderer;

/// Outcome a PDF export worker reports back to the event loop.
pub(super) type ExportOutcome = Result<PathBuf, String>;

impl App {
    /// Run the side effects a message requires, after the pure update.
    ///
    /// `engine` is the loaded PDF renderer (when ready) and `export_done`
    /// the channel export workers report into.
    pub(super) fn handle_message_side_effects(
        &mut self,
        model: &mut Model,
        msg: &Message,
        engine: Option<&Arc<dyn PdfRenderer>>,
        export_done: &Sender<ExportOutcome>,
    ) {
        match msg {
            Message::CopyRichText => self.copy_preview(model),
            Message::ExportPdf => Self::start_pdf_export(model, engine, export_done),
            Message::ExportFinished(Err(err)) => {
                tracing::error!("pdf export failed: {err}");
            }
            _ => {}
        }
    }

    /// Copy the rendered preview to the clipboard as HTML + plain text.
    ///
    /// Every path out of here ends in exactly one toast; nothing propagates.
    fn copy_preview(&mut self, model: &mut Model) {
        if model.preview.plain_text().is_empty() {
            model.show_toast(ToastLevel::Info, "Nothing to copy");
            return;
        }
        match copy_rich_text(&model.preview, self.clipboard.as_mut()) {
            Ok(CopyOutcome::Rich) => model.show_toast(ToastLevel::Info, "Rich text copied"),
            Ok(CopyOutcome::PlainFallback) => {
                model.show_toast(ToastLevel::Warning, "Copied as plain text");
            }
            Err(err) => {
                tracing::warn!("clipboard copy failed: {err}");
                model.show_toast_with_detail(ToastLevel::Error, "Copy failed", err.to_string());
            }
        }
    }

    /// Kick off a PDF export on a worker thread.
    ///
    /// Rejected immediately when the engine isn't ready; silently ignored
    /// while an export is already running (the trigger is disabled then, so
    /// a second engine call can never start).
    fn start_pdf_export(
        model: &mut Model,
        engine: Option<&Arc<dyn PdfRenderer>>,
        export_done: &Sender<ExportOutcome>,
    ) {
        if model.exporting {
            return;
        }
        let Some(engine) = engine.filter(|_| model.engine_ready()) else {
            model.show_toast(ToastLevel::Error, "PDF engine not ready");
            return;
        };

        model.exporting = true;
        model.show_toast(ToastLevel::Info, "Generating PDF…");

        let engine = Arc::clone(engine);
        let doc = model.preview.clone();
        let config = ExportConfig::default();
        let done = export_done.clone();
        std::thread::Builder::new()
            .name("pdf-export".to_string())
            .spawn(move || {
                let outcome = engine
                    .export(&doc, &config)
                    .map_err(|err| err.to_string());
                // Receiver gone means the app quit mid-export; nothing to do.
                let _ = done.send(outcome);
            })
            .expect("spawn pdf export worker");
    }
}
