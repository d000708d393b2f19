//! Project locations and behavior switches for sync and check.

use pysync_fs::{NormalizedPath, ProjectFile};
pub use pysync_manifest::VersionSource;

/// The three files pysync works on, resolved from one project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: NormalizedPath,
}

impl ProjectPaths {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// The root as an absolute path, falling back to the given spelling when
    /// it cannot be resolved.
    pub fn absolute_root(&self) -> NormalizedPath {
        self.root.canonicalize().unwrap_or_else(|_| self.root.clone())
    }

    pub fn file(&self, file: ProjectFile) -> NormalizedPath {
        self.root.join(file.as_str())
    }

    pub fn pipfile(&self) -> NormalizedPath {
        self.file(ProjectFile::Pipfile)
    }

    pub fn lockfile(&self) -> NormalizedPath {
        self.file(ProjectFile::PipfileLock)
    }

    pub fn setup_py(&self) -> NormalizedPath {
        self.file(ProjectFile::SetupPy)
    }

    /// Name used for a freshly created `setup.py`: the directory name.
    pub fn project_name(&self) -> String {
        self.absolute_root()
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "project".to_string())
    }
}

/// Options for `sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Where version constraints come from.
    pub source: VersionSource,
    /// Compute and report the change without writing `setup.py`.
    pub dry_run: bool,
}

/// Options for `check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Require an exact `==` pin matching the lock for every package.
    pub strict: bool,
    /// Skip packages installed from a path, VCS checkout or URL.
    pub ignore_local: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_locations() {
        let paths = ProjectPaths::new("/work/proj");
        assert_eq!(paths.pipfile().as_str(), "/work/proj/Pipfile");
        assert_eq!(paths.lockfile().as_str(), "/work/proj/Pipfile.lock");
        assert_eq!(paths.setup_py().as_str(), "/work/proj/setup.py");
    }

    #[test]
    fn test_project_name_from_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("my-service");
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(ProjectPaths::new(dir.as_path()).project_name(), "my-service");
    }

    #[test]
    fn test_defaults() {
        let sync = SyncOptions::default();
        assert_eq!(sync.source, VersionSource::Lockfile);
        assert!(!sync.dry_run);

        let check = CheckOptions::default();
        assert!(!check.strict && !check.ignore_local);
    }
}
