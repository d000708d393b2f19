//! Dependency manifests for pysync
//!
//! This crate reads a project's `Pipfile` and `Pipfile.lock` and models the
//! Python packaging syntax the rest of the workspace compares against:
//!
//! - **Versions and specifiers**: PEP 440 versions ordered through `semver`,
//!   and specifier sets such as `>=2.0,<3.0` or `~=1.4`
//! - **Requirements**: PEP 508 requirement strings as they appear in
//!   `install_requires`, with name normalization
//! - **Manifest reader**: joins Pipfile declarations with lock resolutions
//!   into [`ResolvedDependency`] records
//!
//! # Example
//!
//! ```
//! use pysync_manifest::{Group, Manifest};
//!
//! let pipfile = "[packages]\nrequests = \"*\"\n";
//! let lock = r#"{"default": {"requests": {"version": "==2.31.0"}}}"#;
//!
//! let manifest = Manifest::load(pipfile, lock, "/project").unwrap();
//! let resolved = manifest.resolved(Group::Default).unwrap();
//! assert_eq!(resolved[0].dependency.requirement.to_string(), "requests==2.31.0");
//! ```

pub mod dependency;
pub mod error;
pub mod lock;
pub mod pipfile;
pub mod reader;
pub mod requirement;
pub mod version;

pub use dependency::{Dependency, ResolvedDependency, SourceKind};
pub use error::{Error, Result};
pub use lock::Lockfile;
pub use pipfile::{PackageSpec, Pipfile};
pub use reader::{DeclaredPackage, Group, Manifest, VersionSource};
pub use requirement::{Requirement, normalize_name};
pub use version::{Specifier, SpecifierSet, Version};
