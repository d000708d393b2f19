//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pysync - Keep setup.py in step with Pipfile and Pipfile.lock
#[derive(Parser, Debug)]
#[command(name = "pysync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding Pipfile, Pipfile.lock and setup.py
    #[arg(
        short = 'C',
        long,
        global = true,
        env = "PYSYNC_PROJECT_DIR",
        default_value = "."
    )]
    pub project_dir: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Rewrite install_requires and dependency_links in setup.py
    ///
    /// Creates setup.py from a template when it does not exist.
    ///
    /// Examples:
    ///   pysync sync              # Pin every package to its locked version
    ///   pysync sync --pipfile    # Keep the version ranges from the Pipfile
    ///   pysync sync --dry-run    # Print the diff without writing
    Sync {
        /// Use the Pipfile's version ranges instead of the locked versions
        #[arg(long)]
        pipfile: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check setup.py against Pipfile.lock without modifying it
    ///
    /// Exits with status 1 when a package is missing or conflicts.
    Check {
        /// Require every package to be pinned to exactly the locked version
        #[arg(long)]
        strict: bool,

        /// Skip packages installed from a path, VCS checkout or URL
        #[arg(long)]
        ignore_local: bool,
    },
}
