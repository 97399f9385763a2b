//! The clone command

use std::path::PathBuf;

use ash_core::SyncOptions;
use colored::Colorize;

use crate::cli::RemoteArgs;
use crate::commands::{resolve_dir, runtime, synchronizer};
use crate::error::Result;
use crate::render;

/// Create a directory for `group_id` and run a first sync in it.
pub fn run_clone(
    remote: &RemoteArgs,
    group_id: i64,
    dir: Option<PathBuf>,
    options: SyncOptions,
) -> Result<bool> {
    let cwd = resolve_dir(None)?;
    let target = dir.map(|d| if d.is_absolute() { d } else { cwd.join(d) });
    let engine = synchronizer(remote, options)?;

    let (root, report) = runtime()?.block_on(async {
        let root = engine.bootstrap(group_id, &cwd, target).await?;
        println!(
            "{} Cloning group {} into {}...",
            "=>".blue().bold(),
            group_id,
            root.display().to_string().cyan()
        );
        let report = engine.sync(&root).await?;
        Ok::<_, ash_core::Error>((root, report))
    })?;

    render::print_report(&report, &root);
    Ok(!report.has_errors())
}
