//! git2-backed implementation of [`VcsExecutor`]

use std::fs;
use std::path::Path;

use ash_fs::AshPath;
use git2::Signature;

use crate::{Error, PullOutcome, Result, VcsExecutor, credentials, helpers};

const ORIGIN: &str = "origin";

/// Author used when the repository and global config carry no user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Runs clone, pull and push through libgit2.
#[derive(Debug, Clone, Default)]
pub struct GitExecutor {
    fallback_identity: Option<CommitIdentity>,
}

impl GitExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `identity` for commits when git config has no `user.name`/`user.email`.
    pub fn with_fallback_identity(mut self, identity: CommitIdentity) -> Self {
        self.fallback_identity = Some(identity);
        self
    }

    fn signature(&self, repo: &git2::Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(e) => match &self.fallback_identity {
                Some(identity) => Ok(Signature::now(&identity.name, &identity.email)?),
                None => Err(e.into()),
            },
        }
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

impl VcsExecutor for GitExecutor {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let existed = dest.exists();
        if existed && !is_empty_dir(dest) {
            return Err(Error::DestinationExists {
                path: dest.to_path_buf(),
            });
        }

        tracing::debug!(url, dest = %dest.display(), "cloning");
        let result = git2::build::RepoBuilder::new()
            .fetch_options(credentials::fetch_options())
            .clone(url, dest);

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if !existed {
                    let _ = fs::remove_dir_all(dest);
                }
                Err(Error::CloneFailed {
                    url: url.to_string(),
                    message: e.message().to_string(),
                })
            }
        }
    }

    fn pull(&self, dest: &Path) -> Result<PullOutcome> {
        let repo = helpers::open(dest)?;
        helpers::pull(&repo, ORIGIN)
    }

    fn set_remote_url(&self, dest: &Path, url: &str) -> Result<()> {
        let repo = helpers::open(dest)?;
        repo.remote_set_url(ORIGIN, url)?;
        Ok(())
    }

    fn is_repository(&self, dest: &Path) -> bool {
        dest.join(AshPath::GitDir.as_str()).exists()
    }

    fn has_changes(&self, dest: &Path) -> Result<bool> {
        let repo = helpers::open(dest)?;
        helpers::has_changes(&repo)
    }

    fn commit_and_push(&self, dest: &Path, message: &str) -> Result<()> {
        let repo = helpers::open(dest)?;
        let signature = self.signature(&repo)?;
        let oid = helpers::commit_all(&repo, message, &signature)?;
        tracing::debug!(dest = %dest.display(), commit = %oid, "committed");
        helpers::push(&repo, ORIGIN)
    }
}
