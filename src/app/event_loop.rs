use std::io::stdout;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::ExportOutcome;
use crate::app::model::EngineStatus;
use crate::app::{App, Message, Model, update};
use crate::export::pdf::{EngineLoader, LoadOutcome, PdfRenderer};

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        // Initialize terminal
        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal — inkdown requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let mut model = Model::new(self.render_options, (size.width, size.height));

        // The PDF engine loads in the background; the loop polls for the
        // typed outcome. Dropping the loader on teardown cancels it.
        let loader = EngineLoader::spawn(self.pdf_load_timeout);
        let (export_tx, export_rx) = mpsc::channel();

        execute!(stdout(), EnableMouseCapture)?;
        let result = self.event_loop(&mut terminal, &mut model, loader, &export_tx, &export_rx);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        loader: EngineLoader,
        export_tx: &Sender<ExportOutcome>,
        export_rx: &Receiver<ExportOutcome>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut loader = Some(loader);
        let mut engine: Option<Arc<dyn PdfRenderer>> = None;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            // Resolve the engine load at most once.
            if let Some(active) = loader.as_mut()
                && let Some(outcome) = active.poll()
            {
                loader = None;
                let status = match outcome {
                    LoadOutcome::Ready(loaded) => {
                        engine = Some(loaded);
                        EngineStatus::Ready
                    }
                    LoadOutcome::Failed(err) => EngineStatus::Failed(err),
                    LoadOutcome::TimedOut => EngineStatus::TimedOut,
                };
                *model = update(
                    std::mem::take(model),
                    Message::EngineStatusChanged(status),
                );
                needs_render = true;
            }

            // Export workers report here.
            while let Ok(outcome) = export_rx.try_recv() {
                let msg = Message::ExportFinished(outcome);
                let side_msg = msg.clone();
                *model = update(std::mem::take(model), msg);
                self.handle_message_side_effects(model, &side_msg, engine.as_ref(), export_tx);
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            // Handle events. Short poll while anything is pending so the
            // loader/export channels and debouncer stay responsive.
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || loader.is_some() || model.exporting {
                50
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    let side_msg = msg.clone();
                    *model = update(std::mem::take(model), msg);
                    self.handle_message_side_effects(
                        model,
                        &side_msg,
                        engine.as_ref(),
                        export_tx,
                    );
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg = Self::handle_event(
                        &event::read()?,
                        model,
                        drain_ms,
                        &mut resize_debouncer,
                    );
                    if let Some(msg) = msg {
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        self.handle_message_side_effects(
                            model,
                            &side_msg,
                            engine.as_ref(),
                            export_tx,
                        );
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
