//! Joins the Pipfile and its lock into the dependency records the sync and
//! check engines consume.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use pysync_fs::ProjectFile;
use serde::Serialize;
use tracing::debug;

use crate::dependency::{Dependency, ResolvedDependency, SourceKind};
use crate::error::{Error, Result};
use crate::lock::Lockfile;
use crate::pipfile::{PackageSpec, Pipfile};
use crate::requirement::{Requirement, normalize_name};
use crate::version::{SpecifierSet, Version};

const PIPFILE: &str = ProjectFile::Pipfile.as_str();
const LOCKFILE: &str = ProjectFile::PipfileLock.as_str();

/// Which file supplies the version constraint written to the descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// Pin every package to the version the lock resolved (`name==X`).
    #[default]
    Lockfile,
    /// Keep the range declared in the Pipfile (`*` means unconstrained).
    Pipfile,
}

/// Dependency group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Group {
    /// `[packages]` / `"default"`.
    #[default]
    Default,
    /// `[dev-packages]` / `"develop"`.
    Develop,
}

/// A package as declared in the Pipfile.
#[derive(Debug, Clone)]
pub struct DeclaredPackage {
    pub name: String,
    pub spec: PackageSpec,
}

/// A loaded Pipfile + Pipfile.lock pair.
#[derive(Debug, Clone)]
pub struct Manifest {
    pipfile: Pipfile,
    lock: Lockfile,
    base_dir: PathBuf,
}

impl Manifest {
    /// Parse both files. `base_dir` anchors relative `path` / `file` entries.
    pub fn load(pipfile: &str, lock: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            pipfile: Pipfile::parse(pipfile)?,
            lock: Lockfile::parse(lock)?,
            base_dir: base_dir.into(),
        })
    }

    pub fn pipfile(&self) -> &Pipfile {
        &self.pipfile
    }

    pub fn lock(&self) -> &Lockfile {
        &self.lock
    }

    /// Packages declared in `group`, in Pipfile order.
    ///
    /// A path entry pointing at the project itself (`path = "."`) is skipped.
    pub fn declared(&self, group: Group) -> Result<Vec<DeclaredPackage>> {
        let table = match group {
            Group::Default => &self.pipfile.packages,
            Group::Develop => &self.pipfile.dev_packages,
        };

        let mut seen = HashSet::new();
        let mut declared = Vec::with_capacity(table.len());
        for (name, value) in table {
            if !seen.insert(normalize_name(name)) {
                return Err(Error::DuplicatePackage {
                    file: PIPFILE,
                    name: name.clone(),
                });
            }
            let spec = PackageSpec::from_pipfile_value(name, value)?;
            if spec.local_path().is_some_and(is_project_root) {
                debug!(package = %name, "Skipping self-reference to the project directory");
                continue;
            }
            declared.push(DeclaredPackage {
                name: name.clone(),
                spec,
            });
        }
        Ok(declared)
    }

    /// Declared packages joined with their lock entries.
    pub fn resolved(&self, group: Group) -> Result<Vec<ResolvedDependency>> {
        let locked = match group {
            Group::Default => &self.lock.default,
            Group::Develop => &self.lock.develop,
        };

        let mut by_key: HashMap<String, &PackageSpec> = HashMap::with_capacity(locked.len());
        for (name, spec) in locked {
            if by_key.insert(normalize_name(name), spec).is_some() {
                return Err(Error::DuplicatePackage {
                    file: LOCKFILE,
                    name: name.clone(),
                });
            }
        }

        let mut resolved = Vec::new();
        for package in self.declared(group)? {
            let entry = by_key
                .get(&normalize_name(&package.name))
                .ok_or_else(|| Error::MissingLockEntry {
                    name: package.name.clone(),
                })?;
            resolved.push(self.resolve(&package, entry)?);
        }
        debug!(count = resolved.len(), "Resolved dependencies from lock file");
        Ok(resolved)
    }

    /// The dependencies to write into the descriptor.
    pub fn targets(&self, group: Group, source: VersionSource) -> Result<Vec<Dependency>> {
        match source {
            VersionSource::Lockfile => Ok(self
                .resolved(group)?
                .into_iter()
                .map(|r| r.dependency)
                .collect()),
            VersionSource::Pipfile => self
                .declared(group)?
                .iter()
                .map(|package| self.pipfile_dependency(package))
                .collect(),
        }
    }

    fn resolve(&self, package: &DeclaredPackage, entry: &PackageSpec) -> Result<ResolvedDependency> {
        let mut source = entry.source_kind();
        if source == SourceKind::PinnedVersion && package.spec.source_kind() == SourceKind::ExtrasOnly {
            source = SourceKind::ExtrasOnly;
        }

        let extras = if entry.extras.is_empty() {
            package.spec.extras.clone()
        } else {
            entry.extras.clone()
        };
        let marker = entry.markers.clone().or_else(|| package.spec.markers.clone());

        let mut requirement = Requirement {
            name: package.name.clone(),
            extras,
            specifier: SpecifierSet::default(),
            url: None,
            marker,
        };

        if source.is_local() {
            requirement.url = Some(self.direct_url(&package.name, entry)?);
            let link = self.link(&package.name, entry);
            return Ok(ResolvedDependency {
                dependency: Dependency {
                    requirement,
                    source,
                    link,
                },
                locked_version: None,
            });
        }

        let version = locked_version(&package.name, entry)?;
        requirement.specifier = SpecifierSet::exact(version.clone());
        Ok(ResolvedDependency {
            dependency: Dependency {
                requirement,
                source,
                link: None,
            },
            locked_version: Some(version),
        })
    }

    fn pipfile_dependency(&self, package: &DeclaredPackage) -> Result<Dependency> {
        let spec = &package.spec;
        let source = spec.source_kind();
        let mut requirement = Requirement {
            name: package.name.clone(),
            extras: spec.extras.clone(),
            specifier: SpecifierSet::default(),
            url: None,
            marker: spec.markers.clone(),
        };

        if source.is_local() {
            requirement.url = Some(self.direct_url(&package.name, spec)?);
        } else if let Some(version) = &spec.version {
            requirement.specifier = SpecifierSet::parse(version).map_err(|e| Error::InvalidEntry {
                file: PIPFILE,
                name: package.name.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(Dependency {
            requirement,
            source,
            link: self.link(&package.name, spec),
        })
    }

    /// `git+url@ref`, `file:///abs/path` or the archive URL.
    fn direct_url(&self, name: &str, spec: &PackageSpec) -> Result<String> {
        if let Some(mut url) = spec.vcs_url() {
            if let Some(sub) = &spec.subdirectory {
                url.push_str(&format!("#subdirectory={sub}"));
            }
            return Ok(url);
        }
        if let Some(path) = spec.local_path() {
            return Ok(file_url(&self.base_dir, path));
        }
        spec.file.clone().ok_or_else(|| Error::InvalidEntry {
            file: LOCKFILE,
            name: name.to_string(),
            reason: "local entry has no source location".to_string(),
        })
    }

    /// `dependency_links` entry: `git+url@ref#egg=name`.
    fn link(&self, name: &str, spec: &PackageSpec) -> Option<String> {
        let mut link = spec.vcs_url()?;
        link.push_str(&format!("#egg={name}"));
        if let Some(sub) = &spec.subdirectory {
            link.push_str(&format!("&subdirectory={sub}"));
        }
        Some(link)
    }
}

fn locked_version(name: &str, entry: &PackageSpec) -> Result<Version> {
    let invalid = |reason: String| Error::InvalidEntry {
        file: LOCKFILE,
        name: name.to_string(),
        reason,
    };

    let raw = entry
        .version
        .as_deref()
        .ok_or_else(|| invalid("missing exact `==` version".to_string()))?;
    let exact = raw
        .strip_prefix("===")
        .or_else(|| raw.strip_prefix("=="))
        .ok_or_else(|| invalid(format!("expected an exact `==` version, found '{raw}'")))?;
    Version::parse(exact).map_err(|e| invalid(e.to_string()))
}

fn is_project_root(path: &str) -> bool {
    matches!(path.trim().trim_end_matches(['/', '\\']), "" | ".")
}

fn file_url(base_dir: &Path, path: &str) -> String {
    let mut relative = path.trim();
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }
    let absolute = base_dir.join(relative);
    let text = absolute.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}
