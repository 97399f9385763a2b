//! Submitting work back through real git pushes

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash_core::{Error, ItemStatus, Selection, SyncOptions, Synchronizer, Submitter};
use ash_git::{CommitIdentity, GitExecutor};
use ash_remote::NodeIdentity;
use ash_test_utils::git::bare_remote;
use ash_test_utils::remote::{FakeRemote, leaf, sub_node};
use git2::Repository;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn git() -> GitExecutor {
    GitExecutor::new().with_fallback_identity(CommitIdentity {
        name: "Student".to_string(),
        email: "student@example.com".to_string(),
    })
}

fn head_message(bare: &Path) -> String {
    let repo = Repository::open_bare(bare).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    head.message().unwrap().to_string()
}

/// A synced sub-group with three checkouts; returns its directory and bare repos.
async fn synced_lab(temp: &TempDir) -> (PathBuf, Vec<PathBuf>) {
    let bares: Vec<PathBuf> = ["baitap01", "baitap02", "baitap03"]
        .iter()
        .map(|name| bare_remote(temp.path(), name))
        .collect();

    let remote = Arc::new(FakeRemote::new());
    remote.set_node(NodeIdentity::new(10, "Course", "course"));
    remote.set_sub_nodes(10, vec![sub_node(11, "Lab")]);
    remote.set_leaves(
        11,
        bares
            .iter()
            .enumerate()
            .map(|(i, bare)| {
                leaf(
                    21 + i as i64,
                    &format!("Baitap0{}", i + 1),
                    &bare.to_string_lossy(),
                )
            })
            .collect(),
    );

    let engine = Synchronizer::new(remote, Arc::new(git()), SyncOptions::default()).unwrap();
    let root = engine.bootstrap(10, temp.path(), None).await.unwrap();
    let report = engine.sync(&root).await.unwrap();
    assert!(!report.has_errors(), "{report:?}");
    (root.join("Lab"), bares)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_all_pushes_only_changed_checkouts() {
    let temp = TempDir::new().unwrap();
    let (lab, bares) = synced_lab(&temp).await;
    std::fs::write(lab.join("Baitap02/main.c"), "int main() {}\n").unwrap();

    let report = Submitter::new(Arc::new(git()), 2)
        .unwrap()
        .submit(&lab, &Selection::All, "Submit Baitap#")
        .await
        .unwrap();

    let submitted = report.outcome("Baitap02").unwrap();
    assert_eq!(submitted.status, ItemStatus::Ok);
    assert_eq!(submitted.message, "submitted: Submit Baitap02");
    assert_eq!(report.outcome("Baitap01").unwrap().status, ItemStatus::Skipped);
    assert_eq!(report.outcome("Baitap03").unwrap().message, "no changes");

    assert_eq!(head_message(&bares[1]), "Submit Baitap02");
    assert_eq!(head_message(&bares[0]), "Initial commit");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_by_number_ignores_other_changes() {
    let temp = TempDir::new().unwrap();
    let (lab, bares) = synced_lab(&temp).await;
    std::fs::write(lab.join("Baitap01/a.txt"), "a").unwrap();
    std::fs::write(lab.join("Baitap03/c.txt"), "c").unwrap();

    let selection = Selection::parse_numbers("3").unwrap();
    let report = Submitter::new(Arc::new(git()), 5)
        .unwrap()
        .submit(&lab, &selection, "Lab #")
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(head_message(&bares[2]), "Lab 03");
    assert_eq!(head_message(&bares[0]), "Initial commit");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_from_group_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let (lab, _) = synced_lab(&temp).await;

    let err = Submitter::new(Arc::new(git()), 5)
        .unwrap()
        .submit(lab.parent().unwrap(), &Selection::All, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSubmission { .. }));
}
