// src/kiosk.rs - The display/control loop
use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::Config;
use crate::document::DocumentHandle;
use crate::pages::parse_page_range;
use crate::preview::{PageRenderer, PreviewError};
use crate::print_job::{JobState, PollPolicy, PrintController, PrintError};
use crate::session::{PageSelection, PrintSettings, Screen, SessionState};
use crate::spooler::{Spooler, SpoolerError};

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preview error: {0}")]
    Preview(#[from] PreviewError),
    #[error("print error: {0}")]
    Print(#[from] PrintError),
    #[error("spooler error: {0}")]
    Spooler(#[from] SpoolerError),
}

/// Everything that can land in the control loop's inbox. Worker tasks and the
/// intake service communicate exclusively through these.
pub enum KioskEvent {
    /// A new upload was persisted by the intake service.
    DocumentReady(DocumentHandle),
    /// Something the person at the kiosk did.
    User(UserAction),
    /// A preview render finished for the named document.
    PreviewReady { document: Uuid, pages: Vec<DynamicImage> },
    PreviewFailed { document: Uuid, reason: String },
    /// A print-job state transition from the controller.
    JobUpdate(JobState),
    /// The success-screen countdown elapsed.
    ReturnHome,
}

/// Actions the display front-end forwards from the user.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Confirmation screen: go ahead and preview the document.
    Proceed,
    /// Abandon the current document and return to the welcome screen.
    Cancel,
    NextPage,
    PrevPage,
    /// Replace the print settings shown on the preview screen.
    Settings(PrintSettings),
    /// Submit the job with the current settings.
    Print,
}

/// The kiosk control loop: sole owner and mutator of [`SessionState`].
///
/// Slow work (rendering, spooler traffic) never runs here; it is spawned onto
/// worker tasks that report back through the event channel.
pub struct Kiosk {
    config: Config,
    state: SessionState,
    events_tx: mpsc::Sender<KioskEvent>,
    events_rx: mpsc::Receiver<KioskEvent>,
    spooler: Arc<dyn Spooler>,
    renderer: Arc<dyn PageRenderer>,
    preview_pages: Vec<DynamicImage>,
}

impl Kiosk {
    /// Build the kiosk and hand back the sender side of its inbox for the
    /// intake service and the front-end.
    pub fn new(
        config: Config,
        spooler: Arc<dyn Spooler>,
        renderer: Arc<dyn PageRenderer>,
    ) -> (Self, mpsc::Sender<KioskEvent>) {
        let (events_tx, events_rx) = mpsc::channel(16);
        let kiosk = Self {
            config,
            state: SessionState::new(),
            events_tx: events_tx.clone(),
            events_rx,
            spooler,
            renderer,
            preview_pages: Vec::new(),
        };
        (kiosk, events_tx)
    }

    pub fn session(&self) -> &SessionState {
        &self.state
    }

    /// URL the welcome screen encodes into its QR code.
    pub fn upload_url(&self) -> &str {
        &self.config.kiosk.qr_url
    }

    /// Rendered pages for the preview screen, in page order.
    pub fn preview_pages(&self) -> &[DynamicImage] {
        &self.preview_pages
    }

    /// Process events until every sender is gone.
    pub async fn run(&mut self) {
        while self.tick().await {}
        tracing::info!("Control loop finished");
    }

    /// Wait for and process a single event. Returns false once the inbox is
    /// closed.
    pub async fn tick(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    pub async fn handle_event(&mut self, event: KioskEvent) {
        match event {
            KioskEvent::DocumentReady(document) => {
                tracing::info!(
                    "Document ready: '{}' ({} bytes)",
                    document.original_name,
                    document.size
                );
                self.preview_pages.clear();
                self.state.document_ready(document);
            }
            KioskEvent::User(action) => self.handle_action(action).await,
            KioskEvent::PreviewReady { document, pages } => {
                // A render for a superseded or cancelled document is stale.
                if self.state.screen == Screen::Confirmation && self.active_document_is(document) {
                    let page_count = pages.len();
                    tracing::info!("Preview ready: {page_count} pages");
                    self.preview_pages = pages;
                    self.state.enter_preview(page_count);
                } else {
                    tracing::debug!("Dropping stale preview for document {document}");
                }
            }
            KioskEvent::PreviewFailed { document, reason } => {
                if self.active_document_is(document) {
                    tracing::warn!("Preview failed: {reason}");
                    self.preview_pages.clear();
                    self.state.fail_to_welcome(reason);
                }
            }
            KioskEvent::JobUpdate(state) => {
                tracing::debug!("Job update: {state:?}");
                let completed = state == JobState::Completed;
                self.state.job_update(state);
                if completed {
                    self.schedule_return_home();
                }
            }
            KioskEvent::ReturnHome => {
                // Ignore a countdown that outlived its success screen.
                if self.state.screen == Screen::Success {
                    self.preview_pages.clear();
                    self.state.return_home();
                }
            }
        }
    }

    async fn handle_action(&mut self, action: UserAction) {
        match action {
            UserAction::Proceed => self.start_preview(),
            UserAction::Cancel => {
                self.preview_pages.clear();
                self.state.cancel_to_welcome();
            }
            UserAction::NextPage => self.state.next_page(),
            UserAction::PrevPage => self.state.prev_page(),
            UserAction::Settings(settings) => self.update_settings(settings),
            UserAction::Print => self.start_printing(),
        }
    }

    fn start_preview(&mut self) {
        if self.state.screen != Screen::Confirmation {
            return;
        }
        let Some(document) = self.state.document.clone() else {
            return;
        };

        let renderer = self.renderer.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match renderer.render(document.path()).await {
                Ok(pages) => KioskEvent::PreviewReady { document: document.id, pages },
                Err(e) => KioskEvent::PreviewFailed {
                    document: document.id,
                    reason: e.to_string(),
                },
            };
            let _ = events.send(event).await;
        });
    }

    fn update_settings(&mut self, settings: PrintSettings) {
        if self.state.screen != Screen::Preview {
            return;
        }
        if let PageSelection::Range(expression) = &settings.page_range {
            if let Err(e) = parse_page_range(expression, self.state.page_count as u32) {
                tracing::warn!("Rejected print settings: {e}");
                return;
            }
        }
        self.state.settings = settings;
    }

    fn start_printing(&mut self) {
        let Some((document, settings)) = self.state.begin_printing() else {
            return;
        };

        let controller = PrintController::new(
            self.spooler.clone(),
            self.config.printer.name.clone(),
            PollPolicy::from(&self.config.spooler),
            self.events_tx.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = controller.run(document, settings).await {
                tracing::error!("Print job did not complete: {e}");
            }
        });
    }

    fn schedule_return_home(&self) {
        let events = self.events_tx.clone();
        let countdown = Duration::from_secs(self.config.kiosk.success_countdown_secs);
        tokio::spawn(async move {
            tokio::time::sleep(countdown).await;
            let _ = events.send(KioskEvent::ReturnHome).await;
        });
    }

    fn active_document_is(&self, id: Uuid) -> bool {
        self.state.document.as_ref().map(|d| d.id) == Some(id)
    }
}
