//! Version-control executor for the ash workspace mirror
//!
//! The sync engine only talks to [`VcsExecutor`]; [`GitExecutor`] is the
//! git2-backed implementation used by the CLI.

pub mod credentials;
pub mod error;
pub mod executor;
pub mod git;
pub mod helpers;

pub use error::{Error, Result};
pub use executor::{PullOutcome, VcsExecutor};
pub use git::{CommitIdentity, GitExecutor};
