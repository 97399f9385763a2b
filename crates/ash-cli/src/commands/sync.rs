//! The sync command

use std::path::Path;

use ash_core::SyncOptions;
use colored::Colorize;

use crate::cli::RemoteArgs;
use crate::commands::{resolve_dir, runtime, synchronizer};
use crate::error::Result;
use crate::render;

/// Run the sync command
///
/// Returns whether every item succeeded.
pub fn run_sync(
    remote: &RemoteArgs,
    dir: Option<&Path>,
    options: SyncOptions,
    json: bool,
) -> Result<bool> {
    let dir = resolve_dir(dir)?;
    let engine = synchronizer(remote, options)?;

    if !json {
        let mode = if options.dry_run { " (dry run)" } else { "" };
        println!(
            "{} Syncing {}{}...",
            "=>".blue().bold(),
            dir.display().to_string().cyan(),
            mode
        );
    }

    let report = runtime()?.block_on(engine.sync(&dir))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report, &dir);
    }
    Ok(!report.has_errors())
}
