//! Executor trait for version-control actions

use std::path::Path;

use crate::Result;

/// What a pull did to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The local branch already matched the remote
    UpToDate,
    /// The local branch was fast-forwarded
    Updated,
}

/// Blocking version-control operations against one working directory.
///
/// Every method is a potentially slow call (network, disk) and is expected
/// to be run off the async executor by the caller.
pub trait VcsExecutor: Send + Sync {
    /// Clone `url` into `dest`. `dest` must not exist or be empty.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch the current branch from `origin` and fast-forward onto it.
    fn pull(&self, dest: &Path) -> Result<PullOutcome>;

    /// Point `origin` at `url`.
    fn set_remote_url(&self, dest: &Path, url: &str) -> Result<()>;

    /// Whether `dest` is the root of a working copy.
    fn is_repository(&self, dest: &Path) -> bool;

    /// Whether the working copy has staged, unstaged or untracked changes.
    fn has_changes(&self, dest: &Path) -> Result<bool>;

    /// Stage everything, commit with `message` and push the current branch.
    fn commit_and_push(&self, dest: &Path, message: &str) -> Result<()>;
}
