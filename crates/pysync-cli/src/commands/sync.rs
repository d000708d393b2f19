//! Sync command implementation

use std::path::Path;

use colored::Colorize;
use pysync_core::{ProjectPaths, SyncEngine, SyncOptions, SyncReport, VersionSource};

use crate::error::Result;

/// Run the sync command
///
/// Rewrites `install_requires` and `dependency_links` in setup.py from the
/// lock file, or from the Pipfile's ranges with `pipfile`.
pub fn run_sync(path: &Path, pipfile: bool, dry_run: bool) -> Result<()> {
    let options = SyncOptions {
        source: if pipfile {
            VersionSource::Pipfile
        } else {
            VersionSource::Lockfile
        },
        dry_run,
    };

    let engine = SyncEngine::new(ProjectPaths::new(path));
    let report = engine.sync(&options)?;

    if dry_run {
        print_dry_run(&report);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &SyncReport) {
    if report.is_unchanged() {
        println!("{} setup.py already up to date", "OK".green().bold());
        return;
    }

    if report.created {
        println!("{} setup.py was not found and has been created", "+".green());
    }
    println!(
        "{} setup.py successfully updated: {} {} added or changed",
        "OK".green().bold(),
        report.edit_count(),
        plural(report.edit_count(), "entry", "entries"),
    );
    if report.removed() > 0 {
        println!(
            "   {} {} {} removed",
            "-".yellow(),
            report.removed(),
            plural(report.removed(), "entry", "entries"),
        );
    }
}

fn print_dry_run(report: &SyncReport) {
    if report.is_unchanged() {
        println!("{} setup.py already up to date", "OK".green().bold());
        return;
    }

    println!(
        "{} Dry run: {} {} would be added or changed, {} removed",
        "=>".blue().bold(),
        report.edit_count(),
        plural(report.edit_count(), "entry", "entries"),
        report.removed(),
    );
    println!();
    for line in report.diff.unified.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
