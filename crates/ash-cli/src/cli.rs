//! CLI argument parsing using clap derive

use std::path::PathBuf;

use ash_core::{DEFAULT_CONCURRENCY, DEFAULT_NODE_CONCURRENCY};
use ash_remote::Protocol;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// ash - mirror a forge group tree into local working copies
#[derive(Parser, Debug)]
#[command(name = "ash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How the forge is reached.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RemoteArgs {
    /// Forge hostname passed to glab
    #[arg(long, global = true, env = "ASH_HOSTNAME")]
    pub hostname: Option<String>,

    /// glab executable used for API requests
    #[arg(long, global = true, env = "ASH_GLAB", default_value = "glab")]
    pub glab: String,
}

/// Options shared by commands that walk the tree.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TreeArgs {
    /// Clone protocol (ssh or https)
    #[arg(long, env = "ASH_PROTOCOL", default_value = "https")]
    pub protocol: Protocol,

    /// Concurrent clone/pull actions per sub-group
    #[arg(long, env = "ASH_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Concurrent sub-group synchronizations per group
    #[arg(long, default_value_t = DEFAULT_NODE_CONCURRENCY)]
    pub node_concurrency: usize,
}

/// Commit author used when git config has none.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorArgs {
    /// Author name for commits without a configured user.name
    #[arg(long, env = "ASH_AUTHOR_NAME", requires = "author_email")]
    pub author_name: Option<String>,

    /// Author email for commits without a configured user.email
    #[arg(long, env = "ASH_AUTHOR_EMAIL", requires = "author_name")]
    pub author_email: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize the managed directory with the forge
    ///
    /// Run inside a group directory (.ash/group.json) to sync every sub-group,
    /// or inside a sub-group directory (.ash/subgroup.json) to sync its projects.
    ///
    /// Examples:
    ///   ash sync                  # Clone new projects, pull existing ones
    ///   ash sync --dry-run        # Show what would happen
    ///   ash sync --clean          # Also delete folders removed on the forge
    Sync {
        /// Delete local folders that no longer exist on the forge
        #[arg(long)]
        clean: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Managed directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Clone a whole group hierarchy into a new directory
    ///
    /// Examples:
    ///   ash clone 1234            # Creates ./<group name>
    ///   ash clone 1234 --dir lab  # Creates ./lab
    Clone {
        /// Numeric id of the group on the forge
        group_id: i64,

        /// Target directory (defaults to the group name)
        #[arg(long)]
        dir: Option<PathBuf>,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Commit and push assignments in the current sub-group
    ///
    /// Examples:
    ///   ash submit --all -m "Submit Session01 Baitap#"
    ///   ash submit -r 3,5,7 -c "Fix Baitap#"
    ///   ash submit -m "Done"      # Pick repositories interactively
    Submit {
        /// Submit every repository with changes
        #[arg(long, conflicts_with = "repos")]
        all: bool,

        /// Submit repositories whose names end with these numbers (comma separated)
        #[arg(short, long)]
        repos: Option<String>,

        /// Commit message template; '#' is replaced by the repository number
        #[arg(short = 'm', long = "message", visible_short_alias = 'c', visible_alias = "commit")]
        message: Option<String>,

        /// Concurrent pushes
        #[arg(long, env = "ASH_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        author: AuthorArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
