//! Error types for ash-core

use std::path::PathBuf;

use crate::report::NodeReport;

/// Result type for ash-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the synchronization of one node.
///
/// Item-level failures never appear here during a sync; they are carried as
/// [`ActionError`]s inside the batch and reported per item.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listing the children of a node failed; nothing was written
    #[error("Failed to fetch children of node {node_id}: {source}")]
    Fetch {
        node_id: i64,
        #[source]
        source: ash_remote::Error,
    },

    /// A snapshot file exists but cannot be trusted
    #[error("Corrupt metadata at {path}: {message}")]
    CorruptMetadata { path: PathBuf, message: String },

    /// The remote returned the same id twice in one listing
    #[error("Inconsistent remote state: id {id} listed more than once")]
    InconsistentRemoteState { id: i64 },

    /// A directory holds both a root and an intermediate snapshot
    #[error("Ambiguous metadata in {dir}: both group.json and subgroup.json are present")]
    AmbiguousMetadata { dir: PathBuf },

    /// A directory holds no snapshot at all
    #[error("{dir} is not managed by ash (no .ash/group.json or .ash/subgroup.json)")]
    NotManaged { dir: PathBuf },

    /// A sub-node directory holds a root snapshot
    #[error("Unexpected root snapshot in sub-group directory {dir}")]
    UnexpectedSnapshot { dir: PathBuf },

    /// Bootstrapping into a directory that already has a snapshot
    #[error("{dir} is already managed by ash")]
    AlreadyManaged { dir: PathBuf },

    /// The only item of a batch failed
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Every item of a non-empty batch failed
    #[error("All {count} actions failed")]
    AllActionsFailed { count: usize },

    /// Every selected project failed to submit; `report` still lists why
    #[error("{source}")]
    SubmissionFailed {
        report: Box<NodeReport>,
        #[source]
        source: Box<Error>,
    },

    /// The batch could not be driven to completion
    #[error("Action executor unavailable: {message}")]
    ExecutorUnavailable { message: String },

    /// Rejected configuration values
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// Rejected submission request
    #[error("Invalid submission: {message}")]
    InvalidSubmission { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from ash-fs
    #[error(transparent)]
    Fs(#[from] ash_fs::Error),

    /// Remote error from ash-remote outside of a listing
    #[error(transparent)]
    Remote(#[from] ash_remote::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running the same node later may succeed without operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::InconsistentRemoteState { .. } | Self::Remote(_)
        )
    }

    /// Per-item report carried by a failed submission.
    pub fn report(&self) -> Option<&NodeReport> {
        match self {
            Self::SubmissionFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Failure of one item inside a batch.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Vcs(#[from] ash_git::Error),

    /// The action panicked; its slot was released
    #[error("action panicked: {message}")]
    Panicked { message: String },
}

impl ActionError {
    pub(crate) fn from_join(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            let payload = err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string())
        } else {
            err.to_string()
        };
        Self::Panicked { message }
    }
}
