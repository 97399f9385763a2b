//! Error types for ash-git

use std::path::PathBuf;

/// Result type for ash-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ash-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Clone destination {path} already exists and is not empty")]
    DestinationExists { path: PathBuf },

    #[error("Clone of {url} failed: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("HEAD is detached in {path}; check out a branch first")]
    DetachedHead { path: PathBuf },

    #[error("Pull failed: {message}")]
    PullFailed { message: String },

    #[error("{message}")]
    CannotFastForward { message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },
}
