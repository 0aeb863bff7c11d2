// src/session.rs - Session state owned by the display/control loop
use serde::{Deserialize, Serialize};

use crate::document::DocumentHandle;
use crate::print_job::JobState;

/// The kiosk screens, in the order a user normally walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Confirmation,
    Preview,
    Printing,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duplex {
    None,
    LongEdge,
    ShortEdge,
}

/// Which pages of the document to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelection {
    All,
    /// A validated range expression such as `1-3,5`.
    Range(String),
}

/// User-chosen print options. A copy is captured when the job is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    pub page_range: PageSelection,
    pub orientation: Orientation,
    pub duplex: Duplex,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            page_range: PageSelection::All,
            orientation: Orientation::Portrait,
            duplex: Duplex::None,
        }
    }
}

/// The single source of truth for what the kiosk is showing and working on.
///
/// Only the control loop mutates this; the intake service and worker tasks
/// reach it exclusively through events.
#[derive(Debug)]
pub struct SessionState {
    pub screen: Screen,
    pub document: Option<DocumentHandle>,
    /// 0-based index of the page shown on the preview screen.
    pub preview_page: usize,
    pub page_count: usize,
    pub settings: PrintSettings,
    /// Latest observed state of the active print job, if any.
    pub job: Option<JobState>,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            document: None,
            preview_page: 0,
            page_count: 0,
            settings: PrintSettings::default(),
            job: None,
            last_error: None,
        }
    }

    /// A new upload arrived. Supersedes any active document; the previous
    /// handle is dropped here and its file reclaimed once unreferenced.
    pub fn document_ready(&mut self, document: DocumentHandle) {
        if let Some(old) = self.document.replace(document) {
            tracing::info!("Superseding document '{}'", old.original_name);
        }
        self.screen = Screen::Confirmation;
        self.preview_page = 0;
        self.page_count = 0;
        self.settings = PrintSettings::default();
        self.job = None;
        self.last_error = None;
    }

    /// Preview images are ready; move to the preview screen.
    pub fn enter_preview(&mut self, page_count: usize) {
        self.screen = Screen::Preview;
        self.page_count = page_count;
        self.preview_page = 0;
    }

    pub fn next_page(&mut self) {
        if self.preview_page + 1 < self.page_count {
            self.preview_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.preview_page = self.preview_page.saturating_sub(1);
    }

    /// User cancelled; drop the document and return to the welcome screen.
    pub fn cancel_to_welcome(&mut self) {
        self.document = None;
        self.job = None;
        self.reset_to_welcome();
        self.last_error = None;
    }

    /// Something went wrong; surface the reason and return to welcome.
    pub fn fail_to_welcome(&mut self, reason: String) {
        self.document = None;
        self.reset_to_welcome();
        self.last_error = Some(reason);
    }

    /// Capture the settings snapshot and move to the printing screen.
    ///
    /// Returns `None` unless the session is on the preview screen with an
    /// active document.
    pub fn begin_printing(&mut self) -> Option<(DocumentHandle, PrintSettings)> {
        if self.screen != Screen::Preview {
            return None;
        }
        let document = self.document.clone()?;
        self.screen = Screen::Printing;
        self.job = Some(JobState::Idle);
        Some((document, self.settings.clone()))
    }

    /// Record a print-job transition and move screens on terminal states.
    pub fn job_update(&mut self, state: JobState) {
        match &state {
            JobState::Completed => self.screen = Screen::Success,
            JobState::Cancelled => self.fail_to_welcome("print job was cancelled".to_string()),
            JobState::Failed(reason) => self.fail_to_welcome(reason.clone()),
            JobState::TimedOut => {
                self.fail_to_welcome("timed out waiting for the printer".to_string())
            }
            _ => {}
        }
        self.job = Some(state);
    }

    /// The success countdown elapsed; reset for the next visitor.
    pub fn return_home(&mut self) {
        self.document = None;
        self.job = None;
        self.reset_to_welcome();
        self.last_error = None;
    }

    fn reset_to_welcome(&mut self) {
        self.screen = Screen::Welcome;
        self.preview_page = 0;
        self.page_count = 0;
        self.settings = PrintSettings::default();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
