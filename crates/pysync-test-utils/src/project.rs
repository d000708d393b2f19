//! [`TestProject`] builder for pysync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// One `default` entry of a generated `Pipfile.lock`.
#[derive(Debug, Clone)]
pub struct LockedPackage {
    pub name: String,
    /// Pipfile value for the package, as TOML text (`"*"`, `{ git = ... }`).
    pub pipfile: String,
    /// Lock object for the package.
    pub lock: Value,
}

impl LockedPackage {
    /// Registry package pinned to `version`, declared as `*` in the Pipfile.
    pub fn pinned(name: &str, version: &str) -> Self {
        Self::ranged(name, "*", version)
    }

    /// Registry package declared with `range` and locked to `version`.
    pub fn ranged(name: &str, range: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            pipfile: format!("\"{range}\""),
            lock: json!({
                "hashes": ["sha256:0000000000000000000000000000000000000000000000000000000000000000"],
                "index": "pypi",
                "version": format!("=={version}"),
            }),
        }
    }

    /// Package checked out from a git repository at `reference`.
    pub fn git(name: &str, url: &str, reference: &str) -> Self {
        Self {
            name: name.to_string(),
            pipfile: format!("{{ git = \"{url}\", ref = \"{reference}\" }}"),
            lock: json!({ "git": url, "ref": reference }),
        }
    }

    /// Editable package from a directory relative to the project.
    pub fn path(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            pipfile: format!("{{ path = \"{path}\", editable = true }}"),
            lock: json!({ "editable": true, "path": path }),
        }
    }

    /// Lock-only entry: a transitive dependency the Pipfile never names.
    pub fn transitive(name: &str, version: &str) -> Self {
        Self {
            pipfile: String::new(),
            ..Self::pinned(name, version)
        }
    }
}

/// Render a Pipfile declaring `packages`.
pub fn pipfile_text(packages: &[LockedPackage]) -> String {
    let mut text = String::from(
        "[[source]]\nname = \"pypi\"\nurl = \"https://pypi.org/simple\"\nverify_ssl = true\n\n[packages]\n",
    );
    for package in packages.iter().filter(|p| !p.pipfile.is_empty()) {
        text.push_str(&format!("{} = {}\n", package.name, package.pipfile));
    }
    text.push_str("\n[dev-packages]\n\n[requires]\npython_version = \"3.11\"\n");
    text
}

/// Render a `Pipfile.lock` locking `packages` in the default group.
pub fn lock_text(packages: &[LockedPackage]) -> String {
    let default: Map<String, Value> = packages
        .iter()
        .map(|p| (p.name.clone(), p.lock.clone()))
        .collect();
    let lock = json!({
        "_meta": {
            "hash": { "sha256": "test" },
            "pipfile-spec": 6,
            "requires": { "python_version": "3.11" },
            "sources": [{ "name": "pypi", "url": "https://pypi.org/simple", "verify_ssl": true }],
        },
        "default": default,
        "develop": {},
    });
    // to_string_pretty on a Value cannot fail
    serde_json::to_string_pretty(&lock).unwrap()
}

/// A temporary Python project directory with helpers for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use pysync_test_utils::{LockedPackage, TestProject};
///
/// let project = TestProject::new()
///     .with_packages(&[LockedPackage::pinned("requests", "2.31.0")])
///     .with_setup_py("from setuptools import setup\nsetup(name='demo')\n");
/// project.assert_file_exists("Pipfile.lock");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a Pipfile and lock declaring and locking `packages`.
    pub fn with_packages(self, packages: &[LockedPackage]) -> Self {
        self.with_pipfile(&pipfile_text(packages))
            .with_lock(&lock_text(packages))
    }

    pub fn with_pipfile(self, text: &str) -> Self {
        self.write("Pipfile", text);
        self
    }

    pub fn with_lock(self, text: &str) -> Self {
        self.write("Pipfile.lock", text);
        self
    }

    pub fn with_setup_py(self, text: &str) -> Self {
        self.write("setup.py", text);
        self
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }

    /// Read `relative` as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn setup_py(&self) -> String {
        self.read("setup.py")
    }

    /// Assert that `path` (relative to the project root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
