//! The submit command

use std::path::Path;
use std::sync::Arc;

use ash_core::{Selection, Submitter, SyncReport};
use ash_git::{CommitIdentity, GitExecutor};
use colored::Colorize;
use dialoguer::MultiSelect;

use crate::cli::AuthorArgs;
use crate::commands::{resolve_dir, runtime};
use crate::error::{CliError, Result};
use crate::render;

/// Pick repositories in a terminal prompt. `None` when nothing was chosen.
fn pick_interactively(submitter: &Submitter, dir: &Path) -> Result<Option<Selection>> {
    let names: Vec<String> = submitter
        .candidates(dir)?
        .into_iter()
        .map(|p| p.name)
        .collect();
    if names.is_empty() {
        return Err(CliError::user("this sub-group lists no repositories"));
    }

    let picked = MultiSelect::new()
        .with_prompt("Select assignments to submit (space to toggle, enter to confirm)")
        .items(&names)
        .interact()?;
    if picked.is_empty() {
        return Ok(None);
    }
    Ok(Some(Selection::Names(
        picked.into_iter().map(|i| names[i].clone()).collect(),
    )))
}

/// Run the submit command
///
/// Returns whether every selected repository was submitted or skipped cleanly.
pub fn run_submit(
    all: bool,
    repos: Option<&str>,
    message: Option<&str>,
    concurrency: usize,
    author: AuthorArgs,
) -> Result<bool> {
    let message = message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| CliError::user("missing commit message: use -m or -c to provide one"))?;
    let dir = resolve_dir(None)?;
    let mut git = GitExecutor::new();
    if let (Some(name), Some(email)) = (author.author_name, author.author_email) {
        git = git.with_fallback_identity(CommitIdentity { name, email });
    }
    let submitter = Submitter::new(Arc::new(git), concurrency)?;

    let selection = if all {
        Selection::All
    } else if let Some(list) = repos {
        Selection::parse_numbers(list)?
    } else {
        match pick_interactively(&submitter, &dir)? {
            Some(selection) => selection,
            None => {
                println!("No repositories selected. Aborting.");
                return Ok(true);
            }
        }
    };

    println!("{} Submitting...", "=>".blue().bold());
    let report = match runtime()?.block_on(submitter.submit(&dir, &selection, message)) {
        Ok(report) => report,
        Err(e) => {
            if let Some(report) = e.report() {
                render::print_report(&SyncReport::single(report.clone()), &dir);
            }
            return Err(e.into());
        }
    };

    let failed = report.has_errors();
    render::print_report(&SyncReport::single(report), &dir);
    Ok(!failed)
}
