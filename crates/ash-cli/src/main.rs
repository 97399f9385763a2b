//! ash CLI
//!
//! Mirrors a forge group tree into local directories and submits work back.

mod cli;
mod commands;
mod error;
mod logging;
mod render;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(&cli.remote, cmd),
        None => {
            // No command provided - show help hint
            println!("{} forge workspace mirror", "ash".green().bold());
            println!();
            println!("Run {} for available commands.", "ash --help".cyan());
            Ok(true)
        }
    }
}

fn execute_command(remote: &cli::RemoteArgs, cmd: Commands) -> Result<bool> {
    match cmd {
        Commands::Sync {
            clean,
            dry_run,
            json,
            dir,
            tree,
        } => commands::run_sync(
            remote,
            dir.as_deref(),
            commands::sync_options(&tree, clean, dry_run),
            json,
        ),
        Commands::Clone {
            group_id,
            dir,
            tree,
        } => commands::run_clone(
            remote,
            group_id,
            dir,
            commands::sync_options(&tree, false, false),
        ),
        Commands::Submit {
            all,
            repos,
            message,
            concurrency,
            author,
        } => commands::run_submit(
            all,
            repos.as_deref(),
            message.as_deref(),
            concurrency,
            author,
        ),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ash", &mut std::io::stdout());
            Ok(true)
        }
    }
}
