//! Named sample projects stored under `test-fixtures/projects/`.
//!
//! Each fixture is a directory holding a `Pipfile`, a `Pipfile.lock` and
//! usually a `setup.py`. [`load`] copies one into a fresh [`TestProject`] so
//! tests can modify it freely.

use std::fs;
use std::path::{Path, PathBuf};

use crate::project::TestProject;

/// Locked `requests` and `click`, setup.py declaring an outdated `requests`.
pub const BASIC: &str = "basic";
/// Git and path dependencies next to a pinned registry package.
pub const LOCAL_SOURCES: &str = "local-sources";
/// setup.py whose `install_requires` is a variable.
pub const NON_LITERAL: &str = "non-literal";
/// Pipfile and lock with no setup.py.
pub const NO_SETUP: &str = "no-setup";

/// Root of the fixture projects.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/projects")
}

/// Copy fixture `name` into a new temporary project.
///
/// # Panics
/// Panics if the fixture does not exist.
pub fn load(name: &str) -> TestProject {
    let source = fixtures_dir().join(name);
    assert!(source.is_dir(), "Unknown fixture: {}", source.display());
    let project = TestProject::new();
    copy_dir(&source, project.root());
    project
}

fn copy_dir(from: &Path, to: &Path) {
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            fs::create_dir_all(&target).unwrap();
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}
