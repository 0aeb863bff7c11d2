// src/print_job.rs - Print job submission and status polling
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::SpoolerConfig;
use crate::document::DocumentHandle;
use crate::kiosk::KioskEvent;
use crate::session::{Duplex, Orientation, PageSelection, PrintSettings};
use crate::spooler::{JobCode, Spooler, SpoolerError};

/// Lifecycle of a single print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Submitting,
    Polling { job_id: i32 },
    Completed,
    Cancelled,
    Failed(String),
    TimedOut,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed(_) | JobState::TimedOut
        )
    }
}

/// How a job that reached the spooler ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("print spooler unavailable: {0}")]
    SpoolerUnavailable(String),
    #[error("spooler rejected the job: {0}")]
    Submission(String),
    #[error("print job failed: {0}")]
    Failed(String),
    #[error("timed out waiting for job {job_id}")]
    Timeout { job_id: i32 },
}

/// Poll pacing: fixed start interval, exponential backoff up to a cap, and a
/// maximum total wait after which the job counts as timed out.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(900),
        }
    }
}

impl From<&SpoolerConfig> for PollPolicy {
    fn from(config: &SpoolerConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_interval: Duration::from_millis(config.poll_max_interval_ms),
            max_wait: Duration::from_secs(config.poll_timeout_secs),
        }
    }
}

/// Translate user-chosen settings into spooler options.
///
/// The page-range restriction is omitted entirely when all pages are selected;
/// the spooler then prints the whole document.
pub fn build_job_options(settings: &PrintSettings) -> BTreeMap<String, String> {
    let mut options = BTreeMap::new();

    if let PageSelection::Range(expression) = &settings.page_range {
        options.insert("page-ranges".to_string(), expression.clone());
    }

    let orientation = match settings.orientation {
        Orientation::Portrait => "3",
        Orientation::Landscape => "4",
    };
    options.insert("orientation-requested".to_string(), orientation.to_string());

    let sides = match settings.duplex {
        Duplex::None => "one-sided",
        Duplex::LongEdge => "two-sided-long-edge",
        Duplex::ShortEdge => "two-sided-short-edge",
    };
    options.insert("sides".to_string(), sides.to_string());

    options
}

/// Submits one job and polls it to a terminal state, reporting every
/// transition back to the control loop as a [`KioskEvent::JobUpdate`].
pub struct PrintController {
    spooler: Arc<dyn Spooler>,
    printer: String,
    poll: PollPolicy,
    events: mpsc::Sender<KioskEvent>,
}

impl PrintController {
    pub fn new(
        spooler: Arc<dyn Spooler>,
        printer: String,
        poll: PollPolicy,
        events: mpsc::Sender<KioskEvent>,
    ) -> Self {
        Self { spooler, printer, poll, events }
    }

    async fn emit(&self, state: JobState) {
        let _ = self.events.send(KioskEvent::JobUpdate(state)).await;
    }

    /// Run the full Submitting -> Polling -> terminal lifecycle.
    ///
    /// Holding the document handle keeps its scratch file alive until the
    /// spooler is done with it, even if a new upload supersedes the session's
    /// active document in the meantime.
    pub async fn run(
        &self,
        document: DocumentHandle,
        settings: PrintSettings,
    ) -> Result<JobOutcome, PrintError> {
        tracing::info!(
            "Submitting '{}' to printer '{}'",
            document.original_name,
            self.printer
        );
        self.emit(JobState::Submitting).await;

        let options = build_job_options(&settings);
        let job_id = match self
            .spooler
            .submit(&self.printer, document.path(), &document.original_name, &options)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                let error = match e {
                    SpoolerError::Unavailable(reason) => PrintError::SpoolerUnavailable(reason),
                    other => PrintError::Submission(other.to_string()),
                };
                tracing::error!("Submission failed: {error}");
                self.emit(JobState::Failed(error.to_string())).await;
                return Err(error);
            }
        };

        tracing::info!("Spooler accepted job {job_id}");
        self.emit(JobState::Polling { job_id }).await;
        self.poll_until_terminal(job_id).await
    }

    async fn poll_until_terminal(&self, job_id: i32) -> Result<JobOutcome, PrintError> {
        let started = Instant::now();
        let mut delay = self.poll.interval;

        loop {
            tokio::time::sleep(delay).await;
            if started.elapsed() >= self.poll.max_wait {
                tracing::error!("Job {job_id} did not finish within {:?}", self.poll.max_wait);
                self.emit(JobState::TimedOut).await;
                return Err(PrintError::Timeout { job_id });
            }

            let jobs = match self.spooler.active_jobs(&self.printer).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    let reason = e.to_string();
                    tracing::error!("Status poll for job {job_id} failed: {reason}");
                    self.emit(JobState::Failed(reason.clone())).await;
                    return Err(PrintError::Failed(reason));
                }
            };

            match jobs.get(&job_id) {
                // The spooler purged the job without a terminal code; treat it
                // as done rather than stranding the user on the printing screen.
                None => {
                    tracing::debug!("Job {job_id} left the active list, treating as completed");
                    self.emit(JobState::Completed).await;
                    return Ok(JobOutcome::Completed);
                }
                Some(JobCode::Completed) => {
                    tracing::info!("Job {job_id} completed");
                    self.emit(JobState::Completed).await;
                    return Ok(JobOutcome::Completed);
                }
                Some(JobCode::Cancelled) | Some(JobCode::Aborted) => {
                    tracing::warn!("Job {job_id} was cancelled by the spooler");
                    self.emit(JobState::Cancelled).await;
                    return Ok(JobOutcome::Cancelled);
                }
                Some(code) => tracing::debug!("Job {job_id} still active ({code:?})"),
            }

            delay = (delay * 2).min(self.poll.max_interval);
        }
    }
}
