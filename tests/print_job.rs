//! Print controller state machine, driven by a scripted spooler.

mod common;

use common::{MockSpooler, SubmitBehavior, fast_poll};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use revive_kiosk::document::{DocumentHandle, UploadedDocument};
use revive_kiosk::kiosk::KioskEvent;
use revive_kiosk::print_job::{
    JobOutcome, JobState, PollPolicy, PrintController, PrintError, build_job_options,
};
use revive_kiosk::session::{Duplex, Orientation, PageSelection, PrintSettings};
use revive_kiosk::spooler::JobCode;

fn fake_document() -> DocumentHandle {
    UploadedDocument::new("report.pdf", PathBuf::from("/nonexistent/report.pdf"), 512)
}

fn controller(
    spooler: Arc<MockSpooler>,
    poll: PollPolicy,
) -> (PrintController, mpsc::Receiver<KioskEvent>) {
    let (tx, rx) = mpsc::channel(64);
    (PrintController::new(spooler, "HP_LaserJet_M208dw".to_string(), poll, tx), rx)
}

fn drain_job_states(rx: &mut mpsc::Receiver<KioskEvent>) -> Vec<JobState> {
    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let KioskEvent::JobUpdate(state) = event {
            states.push(state);
        }
    }
    states
}

#[test]
fn test_options_for_landscape_long_edge_all_pages() {
    let settings = PrintSettings {
        page_range: PageSelection::All,
        orientation: Orientation::Landscape,
        duplex: Duplex::LongEdge,
    };
    let options = build_job_options(&settings);
    assert_eq!(options.get("orientation-requested").map(String::as_str), Some("4"));
    assert_eq!(options.get("sides").map(String::as_str), Some("two-sided-long-edge"));
    assert!(!options.contains_key("page-ranges"), "'all' must omit the page-range restriction");
}

#[test]
fn test_options_for_custom_range() {
    let settings = PrintSettings {
        page_range: PageSelection::Range("1-3,5".to_string()),
        orientation: Orientation::Portrait,
        duplex: Duplex::ShortEdge,
    };
    let options = build_job_options(&settings);
    assert_eq!(options.get("page-ranges").map(String::as_str), Some("1-3,5"));
    assert_eq!(options.get("orientation-requested").map(String::as_str), Some("3"));
    assert_eq!(options.get("sides").map(String::as_str), Some("two-sided-short-edge"));
}

#[test]
fn test_options_for_single_sided() {
    let options = build_job_options(&PrintSettings::default());
    assert_eq!(options.get("sides").map(String::as_str), Some("one-sided"));
}

#[tokio::test]
async fn test_happy_path_transitions_exactly_once() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Accept(7),
        vec![
            vec![(7, JobCode::Processing)],
            vec![(7, JobCode::Processing)],
            vec![(7, JobCode::Completed)],
        ],
    ));
    let (controller, mut rx) = controller(spooler.clone(), fast_poll());

    let outcome = controller.run(fake_document(), PrintSettings::default()).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed);

    let states = drain_job_states(&mut rx);
    assert_eq!(
        states,
        vec![JobState::Submitting, JobState::Polling { job_id: 7 }, JobState::Completed]
    );

    let submissions = spooler.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].printer, "HP_LaserJet_M208dw");
    assert_eq!(submissions[0].title, "report.pdf");
}

#[tokio::test]
async fn test_job_vanishing_from_queue_counts_as_completed() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Accept(9),
        vec![vec![(9, JobCode::Processing)]],
    ));
    let (controller, mut rx) = controller(spooler, fast_poll());

    let outcome = controller.run(fake_document(), PrintSettings::default()).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(drain_job_states(&mut rx).last(), Some(&JobState::Completed));
}

#[tokio::test]
async fn test_cancelled_job_is_reported() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Accept(3),
        vec![vec![(3, JobCode::Cancelled)]],
    ));
    let (controller, mut rx) = controller(spooler, fast_poll());

    let outcome = controller.run(fake_document(), PrintSettings::default()).await.unwrap();
    assert_eq!(outcome, JobOutcome::Cancelled);
    assert_eq!(drain_job_states(&mut rx).last(), Some(&JobState::Cancelled));
}

#[tokio::test]
async fn test_rejected_submission_fails_without_polling() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Reject("unknown printer".to_string()),
        vec![],
    ));
    let (controller, mut rx) = controller(spooler, fast_poll());

    let error = controller.run(fake_document(), PrintSettings::default()).await.unwrap_err();
    assert!(matches!(error, PrintError::Submission(_)));
    assert!(error.to_string().contains("unknown printer"));

    let states = drain_job_states(&mut rx);
    assert_eq!(states.len(), 2);
    assert_eq!(states[0], JobState::Submitting);
    assert!(matches!(states[1], JobState::Failed(_)));
}

#[tokio::test]
async fn test_unreachable_spooler_fails_fast() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Unavailable("scheduler is not running".to_string()),
        vec![],
    ));
    let (controller, _rx) = controller(spooler, fast_poll());

    let error = controller.run(fake_document(), PrintSettings::default()).await.unwrap_err();
    assert!(matches!(error, PrintError::SpoolerUnavailable(_)));
}

#[tokio::test]
async fn test_status_query_failure_surfaces_as_failed() {
    let mut spooler =
        MockSpooler::new(SubmitBehavior::Accept(5), vec![vec![(5, JobCode::Processing)]]);
    spooler.query_error = Some("scheduler went away".to_string());
    let (controller, mut rx) = controller(Arc::new(spooler), fast_poll());

    let error = controller.run(fake_document(), PrintSettings::default()).await.unwrap_err();
    assert!(matches!(error, PrintError::Failed(_)));
    assert!(matches!(drain_job_states(&mut rx).last(), Some(JobState::Failed(_))));
}

#[tokio::test]
async fn test_poll_timeout_is_distinct_from_failure() {
    let spooler = Arc::new(MockSpooler::new(
        SubmitBehavior::Accept(11),
        vec![vec![(11, JobCode::Processing)]],
    ));
    let poll = PollPolicy {
        interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(2),
        max_wait: Duration::ZERO,
    };
    let (controller, mut rx) = controller(spooler, poll);

    let error = controller.run(fake_document(), PrintSettings::default()).await.unwrap_err();
    assert!(matches!(error, PrintError::Timeout { job_id: 11 }));
    assert_eq!(drain_job_states(&mut rx).last(), Some(&JobState::TimedOut));
}
