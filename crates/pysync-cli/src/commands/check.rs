//! Check command implementation

use std::path::Path;

use colored::Colorize;
use pysync_core::{CheckOptions, CheckReport, ConflictKind, ConflictReport, ProjectPaths, SyncEngine};

use crate::error::{CliError, Result};

/// Run the check command
///
/// Compares setup.py with Pipfile.lock. Returns an error, and so exit
/// status 1, when any package is missing or conflicting.
pub fn run_check(path: &Path, strict: bool, ignore_local: bool) -> Result<()> {
    let options = CheckOptions {
        strict,
        ignore_local,
    };
    let engine = SyncEngine::new(ProjectPaths::new(path));
    let report = engine.check(&options)?;

    print_report(&report);

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "found {} {} in setup.py",
            report.problems().count(),
            if report.problems().count() == 1 { "problem" } else { "problems" },
        )))
    }
}

fn print_report(report: &CheckReport) {
    for item in report.problems() {
        println!("{}", describe(item));
    }
    for item in report.of_kind(ConflictKind::ExtraInDescriptor) {
        println!(
            "   {} setup.py declares {} which is not in the Pipfile",
            "note:".dimmed(),
            quoted(item.declared.as_deref().unwrap_or(&item.name)).dimmed(),
        );
    }

    if report.is_clean() {
        println!(
            "{} No version conflict or missing packages/dependencies found in setup.py",
            "OK".green().bold()
        );
    } else {
        println!();
        println!("Run {} to update setup.py.", "pysync sync".cyan());
    }
}

fn describe(item: &ConflictReport) -> String {
    match item.kind {
        ConflictKind::MissingFromDescriptor => format!(
            "{} package {} in Pipfile.lock not found in setup.py {}",
            "MISSING".yellow().bold(),
            quoted(&item.name).cyan(),
            item.keyword,
        ),
        ConflictKind::VersionConflict => {
            let declared = quoted(item.declared.as_deref().unwrap_or(&item.name));
            let locked = match &item.locked_version {
                Some(version) => format!("Pipfile.lock locks {version}"),
                None => "Pipfile.lock installs it from a local or VCS source".to_string(),
            };
            format!(
                "{} package {} conflicts: setup.py declares {}, {}",
                "CONFLICT".red().bold(),
                quoted(&item.name).cyan(),
                declared,
                locked,
            )
        }
        ConflictKind::Ok | ConflictKind::ExtraInDescriptor => String::new(),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}
