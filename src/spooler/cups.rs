// src/spooler/cups.rs - CUPS backend driven through lp/lpstat
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

use super::{JobCode, Spooler, SpoolerError};

/// Talks to the CUPS scheduler through the `lp` and `lpstat` command line
/// tools.
pub struct CupsClient;

impl CupsClient {
    pub fn new() -> Self {
        Self
    }

    async fn lpstat(args: &[&str]) -> Result<Output, SpoolerError> {
        Command::new("lpstat")
            .args(args)
            .output()
            .await
            .map_err(|e| SpoolerError::Unavailable(format!("lpstat: {e}")))
    }
}

impl Default for CupsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Spooler for CupsClient {
    async fn printers(&self) -> Result<Vec<String>, SpoolerError> {
        let output = Self::lpstat(&["-e"]).await?;
        if !output.status.success() {
            return Err(SpoolerError::Unavailable(stderr_text(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    async fn submit(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<i32, SpoolerError> {
        let mut command = Command::new("lp");
        command.arg("-d").arg(printer).arg("-t").arg(title);
        for (key, value) in options {
            command.arg("-o").arg(format!("{key}={value}"));
        }
        command.arg(path);

        let output = command
            .output()
            .await
            .map_err(|e| SpoolerError::Unavailable(format!("lp: {e}")))?;
        if !output.status.success() {
            return Err(SpoolerError::Rejected(stderr_text(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_request_id(&stdout).ok_or_else(|| {
            SpoolerError::Rejected(format!("unexpected scheduler reply: {}", stdout.trim()))
        })
    }

    async fn active_jobs(&self, printer: &str) -> Result<HashMap<i32, JobCode>, SpoolerError> {
        let output = Self::lpstat(&["-o", printer]).await?;
        if !output.status.success() {
            return Err(SpoolerError::Query(stderr_text(&output)));
        }

        let mut jobs = HashMap::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if let Some(id) = parse_job_line(line) {
                // `lpstat -o` only lists jobs still on the queue and carries no
                // terminal codes; a finished or cancelled job simply vanishes.
                jobs.insert(id, JobCode::Processing);
            }
        }
        Ok(jobs)
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// `lp` reports `request id is PRINTER-ID (1 file(s))` on success.
fn parse_request_id(stdout: &str) -> Option<i32> {
    let token = stdout.split_whitespace().nth(3)?;
    let (_, id) = token.rsplit_once('-')?;
    id.parse().ok()
}

/// `lpstat -o` lines lead with `PRINTER-ID`.
fn parse_job_line(line: &str) -> Option<i32> {
    let token = line.split_whitespace().next()?;
    let (_, id) = token.rsplit_once('-')?;
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_id() {
        assert_eq!(
            parse_request_id("request id is HP_LaserJet_M208dw-42 (1 file(s))\n"),
            Some(42)
        );
        // Printer names may themselves contain hyphens.
        assert_eq!(parse_request_id("request id is front-desk-7 (1 file(s))"), Some(7));
        assert_eq!(parse_request_id(""), None);
        assert_eq!(parse_request_id("request id is garbage"), None);
    }

    #[test]
    fn test_parse_job_line() {
        let line = "HP_LaserJet_M208dw-123  kiosk  1024  Thu 06 Aug 2026 10:15:00 AM UTC";
        assert_eq!(parse_job_line(line), Some(123));
        assert_eq!(parse_job_line(""), None);
        assert_eq!(parse_job_line("no job id here"), None);
    }
}
