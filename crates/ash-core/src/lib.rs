//! Workspace synchronization engine for the ash forge mirror
//!
//! This crate mirrors a forge group tree (group, sub-groups, projects) onto
//! local directories:
//!
//! - **Metadata Store**: the `.ash/group.json` and `.ash/subgroup.json` snapshots
//! - **Diff Engine**: id-keyed added / removed / renamed / unchanged classification
//! - **Orphan Scanner**: local directories the remote no longer lists
//! - **Bounded Action Executor**: semaphore-gated batches with per-item results
//! - **Synchronizer**: the fetch, diff, reconcile, persist, recurse pass
//! - **Submitter**: commit and push of selected working copies
//!
//! # Architecture
//!
//! `ash-core` sits above the layer 0 crates and below the CLI:
//!
//! ```text
//!              ash-cli
//!                 |
//!             ash-core
//!                 |
//!     +-----------+-----------+
//!     |           |           |
//!  ash-fs      ash-git    ash-remote
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ash_core::{SyncOptions, Synchronizer};
//! use ash_git::GitExecutor;
//! use ash_remote::{GlabRemote, RetryPolicy, RetryingRemote};
//!
//! async fn run(dir: &std::path::Path) -> ash_core::Result<()> {
//!     let remote = Arc::new(RetryingRemote::new(GlabRemote::new(), RetryPolicy::default()));
//!     let sync = Synchronizer::new(remote, Arc::new(GitExecutor::new()), SyncOptions::default())?;
//!     let report = sync.sync(dir).await?;
//!     println!("{} errors", report.counts().error);
//!     Ok(())
//! }
//! ```

pub mod diff;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod options;
pub mod orphan;
pub mod report;
pub mod submit;
pub mod sync;

pub use diff::{Diff, DiffSummary, Renamed, diff};
pub use error::{ActionError, Error, Result};
pub use executor::{BatchItem, BatchOutcome, BoundedExecutor, ItemResult};
pub use metadata::{IntermediateSnapshot, MetadataStore, RootSnapshot, Snapshot, SnapshotKind};
pub use options::{DEFAULT_CONCURRENCY, DEFAULT_NODE_CONCURRENCY, SyncOptions};
pub use report::{ItemOutcome, ItemStatus, NodeReport, StatusCounts, SyncReport};
pub use submit::{Selection, Submitter, render_message, trailing_digits};
pub use sync::Synchronizer;
