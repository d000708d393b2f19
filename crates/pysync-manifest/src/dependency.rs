//! Canonical dependency records produced by the manifest reader.

use serde::Serialize;

use crate::requirement::Requirement;
use crate::version::Version;

/// Where a dependency comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Resolved from a package index to one exact version.
    PinnedVersion,
    /// A directory or archive on the local filesystem.
    LocalPath,
    /// A git / hg / svn / bzr checkout.
    VersionControl,
    /// A remote archive URL.
    Url,
    /// Declared only to request extras; resolved from the index like a pin.
    ExtrasOnly,
}

impl SourceKind {
    /// Local dependencies carry no exact version.
    pub fn is_local(self) -> bool {
        matches!(self, Self::LocalPath | Self::VersionControl | Self::Url)
    }
}

/// One dependency as it should appear in the build descriptor.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub requirement: Requirement,
    pub source: SourceKind,
    /// Entry for `dependency_links`, set for version-control sources.
    pub link: Option<String>,
}

impl Dependency {
    /// Normalized package name.
    pub fn key(&self) -> String {
        self.requirement.key()
    }

    pub fn is_local(&self) -> bool {
        self.source.is_local()
    }
}

/// A dependency together with what the lock file resolved it to.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub dependency: Dependency,
    /// The exact version from the lock; `None` for local sources.
    pub locked_version: Option<Version>,
}

impl ResolvedDependency {
    pub fn key(&self) -> String {
        self.dependency.key()
    }

    pub fn is_local(&self) -> bool {
        self.dependency.is_local()
    }
}
