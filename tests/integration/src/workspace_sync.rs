//! End-to-end sync against real git repositories
//!
//! The forge listing is served by the in-memory remote; every checkout is a
//! real libgit2 clone of a local bare repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash_core::{ItemStatus, MetadataStore, SnapshotKind, SyncOptions, Synchronizer};
use ash_fs::AshPath;
use ash_git::GitExecutor;
use ash_remote::NodeIdentity;
use ash_test_utils::git::{bare_remote, head_commit, push_commit};
use ash_test_utils::remote::{FakeRemote, leaf, sub_node};
use git2::Repository;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const COURSE: i64 = 10;

/// Forge with one course, two sub-groups and one project in each.
struct Forge {
    temp: TempDir,
    remote: Arc<FakeRemote>,
    lab1_bare: PathBuf,
    lab2_bare: PathBuf,
}

impl Forge {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let lab1_bare = bare_remote(temp.path(), "baitap01");
        let lab2_bare = bare_remote(temp.path(), "baitap02");

        let remote = Arc::new(FakeRemote::new());
        remote.set_node(NodeIdentity::new(COURSE, "Course", "course"));
        remote.set_sub_nodes(COURSE, vec![sub_node(11, "Lab 1"), sub_node(12, "Lab 2")]);
        remote.set_leaves(11, vec![leaf(21, "Baitap01", &url(&lab1_bare))]);
        remote.set_leaves(12, vec![leaf(22, "Baitap02", &url(&lab2_bare))]);

        Self {
            temp,
            remote,
            lab1_bare,
            lab2_bare,
        }
    }

    fn work(&self) -> PathBuf {
        let work = self.temp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        work
    }

    fn synchronizer(&self, options: SyncOptions) -> Synchronizer {
        Synchronizer::new(self.remote.clone(), Arc::new(GitExecutor::new()), options).unwrap()
    }

    /// Bootstrap the course under `work/` and run the first sync.
    async fn clone_course(&self) -> PathBuf {
        let engine = self.synchronizer(SyncOptions::default());
        let root = engine.bootstrap(COURSE, &self.work(), None).await.unwrap();
        let report = engine.sync(&root).await.unwrap();
        assert!(!report.has_errors(), "first sync failed: {report:?}");
        root
    }
}

fn url(bare: &Path) -> String {
    bare.to_string_lossy().into_owned()
}

fn origin_url(checkout: &Path) -> String {
    let repo = Repository::open(checkout).unwrap();
    let origin = repo.find_remote("origin").unwrap();
    origin.url().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clone_builds_the_whole_tree() {
    let forge = Forge::new();
    let root = forge.clone_course().await;

    assert_eq!(root.file_name().unwrap(), "Course");
    let metadata = MetadataStore::new();
    assert_eq!(metadata.kind(&root).unwrap(), Some(SnapshotKind::Root));
    assert_eq!(
        metadata.kind(&root.join("Lab 1")).unwrap(),
        Some(SnapshotKind::Intermediate)
    );

    assert!(root.join("Lab 1/Baitap01/README.md").is_file());
    assert!(root.join("Lab 2/Baitap02/README.md").is_file());
    assert!(root.join("Lab 1").join(AshPath::AshDir.as_str()).is_dir());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_second_sync_pulls_new_commits() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    let engine = forge.synchronizer(SyncOptions::default());

    let report = engine.sync(&root).await.unwrap();
    let lab1 = report.node(&root.join("Lab 1")).unwrap();
    assert_eq!(lab1.outcome("Baitap01").unwrap().status, ItemStatus::Ok);
    assert_eq!(lab1.outcome("Baitap01").unwrap().message, "up to date");

    let pushed = push_commit(&forge.lab1_bare, "hint.txt", "use a loop\n");
    let report = engine.sync(&root).await.unwrap();
    let lab1 = report.node(&root.join("Lab 1")).unwrap();
    assert_eq!(lab1.outcome("Baitap01").unwrap().message, "updated");

    assert_eq!(head_commit(&root.join("Lab 1/Baitap01")), pushed);
    assert!(root.join("Lab 1/Baitap01/hint.txt").is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_from_a_sub_group_only_touches_it() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    push_commit(&forge.lab1_bare, "a.txt", "a\n");
    push_commit(&forge.lab2_bare, "b.txt", "b\n");

    let report = forge
        .synchronizer(SyncOptions::default())
        .sync(&root.join("Lab 2"))
        .await
        .unwrap();

    assert_eq!(report.nodes.len(), 1);
    assert!(root.join("Lab 2/Baitap02/b.txt").is_file());
    assert!(!root.join("Lab 1/Baitap01/a.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_renamed_project_keeps_its_checkout() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    std::fs::write(root.join("Lab 1/Baitap01/draft.txt"), "wip").unwrap();

    forge
        .remote
        .set_leaves(11, vec![leaf(21, "Baitap01-final", &url(&forge.lab1_bare))]);
    let report = forge
        .synchronizer(SyncOptions::default())
        .sync(&root)
        .await
        .unwrap();

    assert!(!root.join("Lab 1/Baitap01").exists());
    assert_eq!(
        std::fs::read_to_string(root.join("Lab 1/Baitap01-final/draft.txt")).unwrap(),
        "wip"
    );
    let outcome = report
        .node(&root.join("Lab 1"))
        .unwrap()
        .outcome("Baitap01-final")
        .unwrap();
    assert_eq!(outcome.status, ItemStatus::Ok);
    assert!(outcome.message.contains("renamed from 'Baitap01'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_moved_repository_rewrites_origin() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    let moved = forge.temp.path().join("archive/baitap01.git");
    std::fs::create_dir_all(moved.parent().unwrap()).unwrap();
    std::fs::rename(&forge.lab1_bare, &moved).unwrap();

    forge.remote.set_leaves(11, vec![leaf(21, "Baitap01", &url(&moved))]);
    let report = forge
        .synchronizer(SyncOptions::default())
        .sync(&root)
        .await
        .unwrap();

    assert!(!report.has_errors(), "{report:?}");
    assert_eq!(origin_url(&root.join("Lab 1/Baitap01")), url(&moved));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_removes_dropped_project() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    forge.remote.set_leaves(12, Vec::new());

    let report = forge
        .synchronizer(SyncOptions::default())
        .sync(&root)
        .await
        .unwrap();
    assert!(root.join("Lab 2/Baitap02").is_dir());
    assert_eq!(
        report.node(&root.join("Lab 2")).unwrap().orphans,
        vec!["Baitap02".to_string()]
    );

    let options = SyncOptions {
        clean: true,
        ..SyncOptions::default()
    };
    let report = forge.synchronizer(options).sync(&root).await.unwrap();
    assert!(!root.join("Lab 2/Baitap02").exists());
    assert_eq!(
        report
            .node(&root.join("Lab 2"))
            .unwrap()
            .outcome("Baitap02")
            .unwrap()
            .status,
        ItemStatus::Removed
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_repository_is_isolated() {
    let forge = Forge::new();
    let root = forge.clone_course().await;
    let missing = forge.temp.path().join("gone.git");
    forge.remote.set_leaves(
        11,
        vec![
            leaf(21, "Baitap01", &url(&forge.lab1_bare)),
            leaf(23, "Baitap03", &url(&missing)),
        ],
    );

    let report = forge
        .synchronizer(SyncOptions::default())
        .sync(&root)
        .await
        .unwrap();

    let lab1 = report.node(&root.join("Lab 1")).unwrap();
    assert_eq!(lab1.outcome("Baitap01").unwrap().status, ItemStatus::Ok);
    assert_eq!(lab1.outcome("Baitap03").unwrap().status, ItemStatus::Error);
    assert!(!root.join("Lab 1/Baitap03").exists());
    assert!(report.has_errors());
}
