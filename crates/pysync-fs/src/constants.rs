//! Well-known file names inside a Python project.

use std::path::Path;

/// The files pysync reads and writes in a project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFile {
    /// The human-edited dependency manifest
    Pipfile,
    /// The resolved, exact-version companion of the manifest
    PipfileLock,
    /// The build descriptor holding the `setup(...)` call
    SetupPy,
}

impl ProjectFile {
    /// Get the file name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pipfile => "Pipfile",
            Self::PipfileLock => "Pipfile.lock",
            Self::SetupPy => "setup.py",
        }
    }

    /// Check if this file exists under `root`.
    pub fn exists_in(&self, root: &Path) -> bool {
        root.join(self.as_str()).is_file()
    }
}

impl std::fmt::Display for ProjectFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
