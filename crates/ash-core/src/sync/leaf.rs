//! Clone or pull one leaf working copy

use std::path::PathBuf;
use std::sync::Arc;

use ash_git::{PullOutcome, VcsExecutor};

use crate::ActionError;
use crate::executor::BatchItem;
use crate::report::ItemOutcome;

/// A leaf resource resolved to its working directory.
pub(crate) struct LeafJob {
    pub name: String,
    pub dest: PathBuf,
    pub url: String,
    /// Rename note to append to the outcome message
    pub note: Option<String>,
}

impl BatchItem for LeafJob {
    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Clone,
    Pull,
    NotRepository,
}

fn plan(vcs: &dyn VcsExecutor, job: &LeafJob) -> Plan {
    if !job.dest.exists() {
        Plan::Clone
    } else if vcs.is_repository(&job.dest) {
        Plan::Pull
    } else {
        Plan::NotRepository
    }
}

pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ActionError>
where
    F: FnOnce() -> ash_git::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ActionError::from_join)?
        .map_err(ActionError::from)
}

fn with_note(message: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{message}, {note}"),
        None => message.to_string(),
    }
}

/// Bring one leaf in line with the remote.
pub(crate) async fn sync_leaf(
    vcs: Arc<dyn VcsExecutor>,
    job: LeafJob,
    dry_run: bool,
) -> Result<ItemOutcome, ActionError> {
    let plan = plan(vcs.as_ref(), &job);
    let note = job.note.as_deref();

    if dry_run {
        let message = match plan {
            Plan::Clone => "would clone",
            Plan::Pull => "would pull",
            Plan::NotRepository => "exists but is not a git repository",
        };
        return Ok(ItemOutcome::skipped(&job.name, with_note(message, note)));
    }

    match plan {
        Plan::Clone => {
            tracing::info!(name = %job.name, url = %job.url, "cloning");
            let (url, dest) = (job.url.clone(), job.dest.clone());
            blocking(move || vcs.clone_repo(&url, &dest)).await?;
            Ok(ItemOutcome::created(&job.name, with_note("cloned", note)))
        }
        Plan::Pull => {
            tracing::debug!(name = %job.name, "pulling");
            let (url, dest) = (job.url.clone(), job.dest.clone());
            let outcome = blocking(move || {
                if let Err(e) = vcs.set_remote_url(&dest, &url) {
                    tracing::warn!(dest = %dest.display(), error = %e, "could not update origin url");
                }
                vcs.pull(&dest)
            })
            .await?;
            let message = match outcome {
                PullOutcome::UpToDate => "up to date",
                PullOutcome::Updated => "updated",
            };
            Ok(ItemOutcome::ok(&job.name, with_note(message, note)))
        }
        Plan::NotRepository => {
            tracing::warn!(name = %job.name, dest = %job.dest.display(), "not a git repository");
            Ok(ItemOutcome::skipped(
                &job.name,
                with_note("exists but is not a git repository", note),
            ))
        }
    }
}
