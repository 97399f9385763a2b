//! Git repository fixtures at two realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};

/// Creates an empty `.git` directory **without** initialising a repository.
///
/// Realism level: **FAKE**: marker only, no object store.
///
/// Use for: tests that only need a directory to look like a checkout.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@test.com").expect("valid test signature")
}

/// Write `file` in the working tree of `repo` and commit it on HEAD.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("commit_file: repository is bare");
    fs::write(workdir.join(file), content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {file}: {e}"));

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_file: commit failed: {e}"))
}

fn current_branch(repo: &Repository) -> String {
    repo.head()
        .ok()
        .and_then(|h| h.shorthand().map(str::to_string))
        .unwrap_or_else(|| "main".to_string())
}

/// Creates a bare repository at `<root>/<name>.git` holding one commit.
///
/// Realism level: **REAL WITH HISTORY**: usable as a clone/pull/push remote
/// through its filesystem path, no network or credentials involved.
///
/// # Panics
/// Panics if any git operation fails.
pub fn bare_remote(root: &Path, name: &str) -> PathBuf {
    let bare_path = root.join(format!("{name}.git"));
    let bare = Repository::init_bare(&bare_path)
        .unwrap_or_else(|e| panic!("bare_remote: init_bare failed: {e}"));

    let seed_path = root.join(format!(".{name}-seed"));
    {
        let seed = Repository::init(&seed_path)
            .unwrap_or_else(|e| panic!("bare_remote: init seed failed: {e}"));
        commit_file(&seed, "README.md", &format!("# {name}\n"), "Initial commit");

        let branch = current_branch(&seed);
        let mut origin = seed
            .remote("origin", &bare_path.to_string_lossy())
            .unwrap();
        origin
            .push(&[format!("refs/heads/{branch}:refs/heads/{branch}")], None)
            .unwrap_or_else(|e| panic!("bare_remote: seed push failed: {e}"));
        bare.set_head(&format!("refs/heads/{branch}")).unwrap();
    }
    fs::remove_dir_all(&seed_path).ok();

    bare_path
}

/// Adds a commit to a bare remote, as another contributor would.
///
/// # Panics
/// Panics if any git operation fails.
pub fn push_commit(bare: &Path, file: &str, content: &str) -> Oid {
    let scratch = tempfile::tempdir().unwrap();
    let work = Repository::clone(&bare.to_string_lossy(), scratch.path())
        .unwrap_or_else(|e| panic!("push_commit: clone failed: {e}"));
    let oid = commit_file(&work, file, content, &format!("Update {file}"));

    let branch = current_branch(&work);
    work.find_remote("origin")
        .unwrap()
        .push(&[format!("refs/heads/{branch}:refs/heads/{branch}")], None)
        .unwrap_or_else(|e| panic!("push_commit: push failed: {e}"));
    oid
}

/// Commit id the default branch of `repo_path` points at.
///
/// # Panics
/// Panics if the repository has no HEAD commit.
pub fn head_commit(repo_path: &Path) -> Oid {
    let repo = Repository::open(repo_path)
        .unwrap_or_else(|e| panic!("head_commit: open {} failed: {e}", repo_path.display()));
    let id = repo.head().unwrap().peel_to_commit().unwrap().id();
    id
}
