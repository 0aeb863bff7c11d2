#![allow(dead_code)]
//! Shared test doubles: a scripted spooler and a stub page renderer.

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use revive_kiosk::preview::{PageRenderer, PreviewError};
use revive_kiosk::print_job::PollPolicy;
use revive_kiosk::spooler::{JobCode, Spooler, SpoolerError};

pub enum SubmitBehavior {
    Accept(i32),
    Reject(String),
    Unavailable(String),
}

/// A spooler whose `active_jobs` answers follow a script, one snapshot per
/// poll; once the script runs out the queue reads as empty (job purged).
pub struct MockSpooler {
    pub printer_names: Vec<String>,
    submit: SubmitBehavior,
    pub submissions: Mutex<Vec<Submission>>,
    poll_script: Mutex<VecDeque<HashMap<i32, JobCode>>>,
    pub query_error: Option<String>,
}

pub struct Submission {
    pub printer: String,
    pub path: PathBuf,
    pub title: String,
    pub options: BTreeMap<String, String>,
}

impl MockSpooler {
    pub fn new(submit: SubmitBehavior, script: Vec<Vec<(i32, JobCode)>>) -> Self {
        Self {
            printer_names: vec!["HP_LaserJet_M208dw".to_string()],
            submit,
            submissions: Mutex::new(Vec::new()),
            poll_script: Mutex::new(
                script.into_iter().map(|snapshot| snapshot.into_iter().collect()).collect(),
            ),
            query_error: None,
        }
    }
}

#[async_trait]
impl Spooler for MockSpooler {
    async fn printers(&self) -> Result<Vec<String>, SpoolerError> {
        Ok(self.printer_names.clone())
    }

    async fn submit(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<i32, SpoolerError> {
        self.submissions.lock().unwrap().push(Submission {
            printer: printer.to_string(),
            path: path.to_path_buf(),
            title: title.to_string(),
            options: options.clone(),
        });
        match &self.submit {
            SubmitBehavior::Accept(id) => Ok(*id),
            SubmitBehavior::Reject(reason) => Err(SpoolerError::Rejected(reason.clone())),
            SubmitBehavior::Unavailable(reason) => Err(SpoolerError::Unavailable(reason.clone())),
        }
    }

    async fn active_jobs(&self, _printer: &str) -> Result<HashMap<i32, JobCode>, SpoolerError> {
        if let Some(reason) = &self.query_error {
            return Err(SpoolerError::Query(reason.clone()));
        }
        Ok(self.poll_script.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Renderer that yields a fixed number of 1x1 pages, or a fixed failure.
pub enum StubRenderer {
    Pages(usize),
    Fail(String),
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, _path: &Path) -> Result<Vec<DynamicImage>, PreviewError> {
        match self {
            StubRenderer::Pages(count) => {
                Ok((0..*count).map(|_| DynamicImage::new_rgb8(1, 1)).collect())
            }
            StubRenderer::Fail(reason) => Err(PreviewError::UnsupportedFormat(reason.clone())),
        }
    }
}

/// Poll pacing tight enough for tests.
pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(2),
        max_wait: Duration::from_secs(5),
    }
}
