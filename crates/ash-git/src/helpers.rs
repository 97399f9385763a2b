//! Shared git2 helper functions for working-copy operations
//!
//! These functions encapsulate the git2 patterns behind [`crate::GitExecutor`].

use std::path::Path;

use git2::{IndexAddOption, Repository, Signature, StatusOptions};

use crate::credentials;
use crate::{Error, PullOutcome, Result};

/// Get the current branch name from a repository.
///
/// Returns the branch name if HEAD points to a branch, or `None` if HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
    } else {
        Ok(None)
    }
}

fn require_branch(repo: &Repository) -> Result<String> {
    get_current_branch(repo)?.ok_or_else(|| Error::DetachedHead {
        path: repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf(),
    })
}

fn find_remote<'r>(repo: &'r Repository, name: &str) -> Result<git2::Remote<'r>> {
    repo.find_remote(name).map_err(|_| Error::RemoteNotFound {
        name: name.to_string(),
    })
}

/// Pull the current branch from `remote` using fetch + fast-forward.
///
/// The working tree is checked out with the safe strategy before the branch
/// reference moves, so local modifications that would be overwritten abort
/// the pull instead of being discarded.
pub fn pull(repo: &Repository, remote: &str) -> Result<PullOutcome> {
    if let Err(e) = repo.head() {
        if e.code() == git2::ErrorCode::UnbornBranch {
            tracing::debug!("HEAD is unborn, nothing to fast-forward");
            return Ok(PullOutcome::UpToDate);
        }
        return Err(e.into());
    }
    let branch_name = require_branch(repo)?;

    let mut remote = find_remote(repo, remote)?;
    remote
        .fetch(&[&branch_name], Some(&mut credentials::fetch_options()), None)
        .map_err(|e| Error::PullFailed {
            message: format!("Fetch failed: {}", e.message()),
        })?;

    let fetch_head = repo
        .find_reference("FETCH_HEAD")
        .map_err(|e| Error::PullFailed {
            message: format!("Could not find FETCH_HEAD: {}", e.message()),
        })?;
    let fetch_commit = fetch_head.peel_to_commit().map_err(|e| Error::PullFailed {
        message: format!("Could not resolve FETCH_HEAD: {}", e.message()),
    })?;

    let head_commit = repo.head()?.peel_to_commit()?;
    let annotated = repo.find_annotated_commit(fetch_commit.id())?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        return Ok(PullOutcome::UpToDate);
    }

    if analysis.is_fast_forward() {
        repo.checkout_tree(
            fetch_commit.as_object(),
            Some(git2::build::CheckoutBuilder::new().safe()),
        )?;
        let refname = format!("refs/heads/{}", branch_name);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(
            fetch_commit.id(),
            &format!("pull: fast-forward to {}", fetch_commit.id()),
        )?;
        return Ok(PullOutcome::Updated);
    }

    Err(Error::CannotFastForward {
        message: format!(
            "Cannot fast-forward {} from {} to {}. Manual merge required.",
            branch_name,
            head_commit.id(),
            fetch_commit.id()
        ),
    })
}

/// Whether the working tree differs from HEAD in any way, untracked files included.
pub fn has_changes(repo: &Repository) -> Result<bool> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo.statuses(Some(&mut options))?;
    Ok(!statuses.is_empty())
}

/// Stage every change (additions, modifications, deletions) and commit.
pub fn commit_all(repo: &Repository, message: &str, signature: &Signature<'_>) -> Result<git2::Oid> {
    let mut index = repo.index()?;
    index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"], None)?;
    index.write()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e.into()),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo.commit(Some("HEAD"), signature, signature, message, &tree, &parents)?;
    Ok(oid)
}

/// Push the current branch to `remote`.
pub fn push(repo: &Repository, remote: &str) -> Result<()> {
    let branch_name = require_branch(repo)?;
    let mut remote = find_remote(repo, remote)?;
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch_name, branch_name);

    let mut rejected = Vec::new();
    {
        let mut options = credentials::push_options(&mut rejected);
        remote
            .push(&[&refspec], Some(&mut options))
            .map_err(|e| Error::PushFailed {
                message: e.message().to_string(),
            })?;
    }

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(Error::PushFailed {
            message: rejected.join("; "),
        })
    }
}

/// Open the repository rooted exactly at `path`.
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| match e.code() {
        git2::ErrorCode::NotFound => Error::NotARepository {
            path: path.to_path_buf(),
        },
        _ => Error::Git(e),
    })
}
