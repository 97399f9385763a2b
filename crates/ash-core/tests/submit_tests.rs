//! Submission flow against the recording VCS

use std::collections::BTreeSet;
use std::sync::Arc;

use ash_core::{Error, ItemOutcome, Selection, Submitter};
use ash_test_utils::git::fake_git_dir;
use ash_test_utils::vcs::{FakeVcs, VcsCall};
use ash_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;

/// Lab1 dirty checkout, Lab2 clean checkout, Lab3 never cloned.
fn setup() -> (TestWorkspace, Arc<FakeVcs>) {
    let ws = TestWorkspace::new();
    ws.write_intermediate_snapshot(".", (20, "Session01"), &[(1, "Lab1"), (2, "Lab2"), (3, "Lab3")]);
    fake_git_dir(&ws.mkdir("Lab1"));
    fake_git_dir(&ws.mkdir("Lab2"));
    let vcs = Arc::new(FakeVcs::new());
    vcs.mark_dirty("Lab1");
    (ws, vcs)
}

fn submitter(vcs: &Arc<FakeVcs>) -> Submitter {
    Submitter::new(vcs.clone(), 5).unwrap()
}

#[tokio::test]
async fn test_submit_all_pushes_only_dirty_checkouts() {
    let (ws, vcs) = setup();

    let report = submitter(&vcs)
        .submit(ws.root(), &Selection::All, "Submit Baitap#")
        .await
        .unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            ItemOutcome::ok("Lab1", "submitted: Submit Baitap1"),
            ItemOutcome::skipped("Lab2", "no changes"),
            ItemOutcome::skipped("Lab3", "not cloned"),
        ]
    );
    assert_eq!(
        vcs.calls(),
        vec![VcsCall::CommitAndPush {
            dest: ws.path("Lab1"),
            message: "Submit Baitap1".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_numbers_select_by_trailing_digits() {
    let (ws, vcs) = setup();
    let selection = Selection::Numbers(BTreeSet::from([1, 3]));

    let report = submitter(&vcs)
        .submit(ws.root(), &selection, "Fix #")
        .await
        .unwrap();

    let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Lab1", "Lab3"]);
}

#[tokio::test]
async fn test_names_select_interactive_picks() {
    let (ws, vcs) = setup();
    let selection = Selection::Names(vec!["Lab2".to_string()]);

    let report = submitter(&vcs)
        .submit(ws.root(), &selection, "msg")
        .await
        .unwrap();

    assert_eq!(report.outcomes, vec![ItemOutcome::skipped("Lab2", "no changes")]);
}

#[tokio::test]
async fn test_unmatched_numbers_are_rejected() {
    let (ws, vcs) = setup();
    let selection = Selection::parse_numbers("9").unwrap();
    let err = submitter(&vcs)
        .submit(ws.root(), &selection, "msg")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSubmission { .. }));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let (ws, vcs) = setup();
    let err = submitter(&vcs)
        .submit(ws.root(), &Selection::All, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSubmission { .. }));
    assert!(vcs.calls().is_empty());
}

#[tokio::test]
async fn test_single_failure_surfaces_the_action_error() {
    let (ws, vcs) = setup();
    vcs.fail_on("Lab1");
    let selection = Selection::Numbers(BTreeSet::from([1]));

    let err = submitter(&vcs)
        .submit(ws.root(), &selection, "msg")
        .await
        .unwrap_err();
    match err {
        Error::SubmissionFailed { report, source } => {
            assert!(matches!(*source, Error::Action(_)), "{source:?}");
            assert!(report.outcome("Lab1").unwrap().is_error());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_every_failure_is_all_actions_failed() {
    let (ws, vcs) = setup();
    vcs.mark_dirty("Lab2");
    vcs.fail_on("Lab1");
    vcs.fail_on("Lab2");
    let selection = Selection::Numbers(BTreeSet::from([1, 2]));

    let err = submitter(&vcs)
        .submit(ws.root(), &selection, "msg")
        .await
        .unwrap_err();
    let report = err.report().cloned().unwrap();
    assert!(matches!(
        err,
        Error::SubmissionFailed { source, .. } if matches!(*source, Error::AllActionsFailed { count: 2 })
    ));
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| o.is_error()));
    assert!(report.outcome("Lab2").unwrap().message.contains("scripted failure"));
}

#[tokio::test]
async fn test_partial_failure_is_reported_per_item() {
    let (ws, vcs) = setup();
    vcs.mark_dirty("Lab2");
    vcs.fail_on("Lab2");

    let report = submitter(&vcs)
        .submit(ws.root(), &Selection::All, "msg")
        .await
        .unwrap();
    assert!(report.has_errors());
    assert!(report.outcome("Lab2").unwrap().is_error());
}

#[tokio::test]
async fn test_group_directory_cannot_submit() {
    let ws = TestWorkspace::new();
    ws.write_root_snapshot(".", (10, "Course"), &[]);
    let vcs = Arc::new(FakeVcs::new());
    let err = submitter(&vcs)
        .submit(ws.root(), &Selection::All, "msg")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSubmission { .. }));
}

#[test]
fn test_candidates_follow_snapshot_order() {
    let (ws, vcs) = setup();
    let names: Vec<String> = submitter(&vcs)
        .candidates(ws.root())
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Lab1", "Lab2", "Lab3"]);
}
