//! Command implementations for ash-cli

pub mod clone;
pub mod submit;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash_core::{SyncOptions, Synchronizer};
use ash_git::GitExecutor;
use ash_remote::{GlabRemote, RetryPolicy, RetryingRemote};

use crate::cli::{RemoteArgs, TreeArgs};
use crate::error::Result;

pub use clone::run_clone;
pub use submit::run_submit;
pub use sync::run_sync;

/// Resolve `dir` (or the current directory) to an absolute path.
pub fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(dunce::canonicalize(dir)?)
}

pub fn sync_options(tree: &TreeArgs, clean: bool, dry_run: bool) -> SyncOptions {
    SyncOptions {
        clean,
        dry_run,
        protocol: tree.protocol,
        concurrency: tree.concurrency,
        node_concurrency: tree.node_concurrency,
    }
}

/// Synchronizer backed by glab and libgit2.
pub fn synchronizer(remote: &RemoteArgs, options: SyncOptions) -> Result<Synchronizer> {
    let mut glab = GlabRemote::new().with_program(&remote.glab);
    if let Some(host) = &remote.hostname {
        glab = glab.with_hostname(host);
    }
    let remote = RetryingRemote::new(glab, RetryPolicy::default());
    Ok(Synchronizer::new(
        Arc::new(remote),
        Arc::new(GitExecutor::new()),
        options,
    )?)
}

/// Multi-thread runtime for one command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
