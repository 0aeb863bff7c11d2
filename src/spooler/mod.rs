// src/spooler/mod.rs - Interface to the print spooler
pub mod cups;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpoolerError {
    #[error("spooler unavailable: {0}")]
    Unavailable(String),
    #[error("job rejected: {0}")]
    Rejected(String),
    #[error("status query failed: {0}")]
    Query(String),
}

/// Job status as reported by the spooler, modelled on the IPP job-state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCode {
    Pending,
    Held,
    Processing,
    Stopped,
    Cancelled,
    Aborted,
    Completed,
}

impl JobCode {
    /// Map a raw IPP `job-state` value (3..=9).
    pub fn from_ipp(code: i32) -> Option<Self> {
        match code {
            3 => Some(JobCode::Pending),
            4 => Some(JobCode::Held),
            5 => Some(JobCode::Processing),
            6 => Some(JobCode::Stopped),
            7 => Some(JobCode::Cancelled),
            8 => Some(JobCode::Aborted),
            9 => Some(JobCode::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobCode::Cancelled | JobCode::Aborted | JobCode::Completed)
    }
}

/// The operations the kiosk needs from a print spooler.
#[async_trait]
pub trait Spooler: Send + Sync {
    /// Names of the printers known to the spooler.
    async fn printers(&self) -> Result<Vec<String>, SpoolerError>;

    /// Submit a file for printing; returns the spooler-assigned job id.
    async fn submit(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<i32, SpoolerError>;

    /// Jobs still on the queue for `printer`, keyed by job id.
    async fn active_jobs(&self, printer: &str) -> Result<HashMap<i32, JobCode>, SpoolerError>;
}
