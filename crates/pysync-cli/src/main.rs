//! pysync CLI
//!
//! Keeps the dependency lists of setup.py in step with Pipfile and
//! Pipfile.lock.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    let root = cli.project_dir;
    match cli.command {
        Commands::Sync { pipfile, dry_run } => commands::run_sync(&root, pipfile, dry_run),
        Commands::Check {
            strict,
            ignore_local,
        } => commands::run_check(&root, strict, ignore_local),
    }
}
