//! Check types for SyncEngine validation
//!
//! Provides types for reporting how `setup.py` compares with the locked
//! dependencies.

use serde::Serialize;

/// Outcome for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// The declared constraint admits the locked version
    Ok,
    /// The dependency is locked but not declared in setup.py
    MissingFromDescriptor,
    /// setup.py declares a package the Pipfile does not (informational)
    ExtraInDescriptor,
    /// The declared constraint excludes the locked version or source
    VersionConflict,
}

/// Finding for a single package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Normalized package name
    pub name: String,
    pub kind: ConflictKind,
    /// The `setup()` keyword the finding is about
    pub keyword: &'static str,
    /// Version from the lock file, if the package is pinned
    pub locked_version: Option<String>,
    /// Entry as written in setup.py, if any
    pub declared: Option<String>,
    /// Whether the dependency comes from a path, VCS checkout or URL
    pub local: bool,
}

impl ConflictReport {
    pub fn is_problem(&self) -> bool {
        matches!(
            self.kind,
            ConflictKind::MissingFromDescriptor | ConflictKind::VersionConflict
        )
    }
}

/// Status of the check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// Every dependency is declared with a compatible constraint
    Clean,
    /// Some dependencies are not declared
    Missing,
    /// Some declared constraints conflict with the lock
    Conflicting,
}

/// Report from a compatibility check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub reports: Vec<ConflictReport>,
    pub strict: bool,
    pub ignore_local: bool,
}

impl CheckReport {
    pub fn new(reports: Vec<ConflictReport>, strict: bool, ignore_local: bool) -> Self {
        let status = if reports.iter().any(|r| r.kind == ConflictKind::VersionConflict) {
            CheckStatus::Conflicting
        } else if reports.iter().any(|r| r.kind == ConflictKind::MissingFromDescriptor) {
            CheckStatus::Missing
        } else {
            CheckStatus::Clean
        };
        Self {
            status,
            reports,
            strict,
            ignore_local,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.status == CheckStatus::Clean
    }

    /// Missing and conflicting findings, in report order.
    pub fn problems(&self) -> impl Iterator<Item = &ConflictReport> {
        self.reports.iter().filter(|r| r.is_problem())
    }

    pub fn of_kind(&self, kind: ConflictKind) -> impl Iterator<Item = &ConflictReport> {
        self.reports.iter().filter(move |r| r.kind == kind)
    }
}
