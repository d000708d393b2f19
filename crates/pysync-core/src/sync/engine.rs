//! SyncEngine implementation
//!
//! The SyncEngine reads the Pipfile, its lock and `setup.py` from one project
//! directory, then either rewrites `setup.py` to match the lock (`sync`) or
//! reports how far apart they are (`check`).

use pysync_descriptor::{
    DEPENDENCY_LINKS, Descriptor, DescriptorDiff, INSTALL_REQUIRES, extract, new_descriptor,
    rewrite,
};
use pysync_fs::io::{read_text, read_text_if_exists, write_atomic};
use pysync_fs::{NormalizedPath, ProjectFile};
use pysync_manifest::{Dependency, Group, Manifest};
use serde::Serialize;
use tracing::{debug, info};

use super::check::CheckReport;
use crate::checker::check_compatibility;
use crate::config::{CheckOptions, ProjectPaths, SyncOptions};
use crate::merge::{MergeResult, MergeTarget, merge_links, merge_requirements};
use crate::{Error, Result};

/// Report from a sync operation
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// `setup.py` did not exist and was created from the template
    pub created: bool,
    /// Changes to `install_requires`
    pub install_requires: MergeResult,
    /// Changes to `dependency_links`
    pub dependency_links: MergeResult,
    /// Line diff of `setup.py`; empty when nothing changed
    #[serde(skip)]
    pub diff: DescriptorDiff,
    /// Whether `setup.py` was written
    pub written: bool,
    pub dry_run: bool,
}

impl SyncReport {
    /// Entries added or rewritten across both lists.
    pub fn edit_count(&self) -> usize {
        self.install_requires.edit_count() + self.dependency_links.edit_count()
    }

    pub fn removed(&self) -> usize {
        self.install_requires.removed + self.dependency_links.removed
    }

    pub fn is_unchanged(&self) -> bool {
        !self.created && self.diff.is_empty()
    }
}

/// The rewritten descriptor text and what changed in each list.
struct Plan {
    text: String,
    install_requires: MergeResult,
    dependency_links: MergeResult,
}

/// Engine for keeping `setup.py` in line with the Pipfile
///
/// The SyncEngine provides two operations:
/// - **sync**: rewrite `install_requires` / `dependency_links` from the lock
/// - **check**: classify every locked package against `setup.py`
pub struct SyncEngine {
    paths: ProjectPaths,
}

impl SyncEngine {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Rewrite `setup.py` so its lists match the manifest.
    ///
    /// Every input is read and every edit computed before anything is
    /// written; a failure leaves `setup.py` untouched.
    pub fn sync(&self, options: &SyncOptions) -> Result<SyncReport> {
        let manifest = self.load_manifest()?;
        let targets = manifest.targets(Group::Default, options.source)?;

        let setup_py = self.paths.setup_py();
        let existing = read_text_if_exists(&setup_py)?;
        let created = existing.is_none();
        let original = existing.unwrap_or_default();
        let base = if created {
            debug!(path = %setup_py, "setup.py not found, starting from template");
            new_descriptor(&self.paths.project_name())
        } else {
            original.clone()
        };

        let plan = plan_sync(base, &targets)?;
        let diff = DescriptorDiff::compute(&original, &plan.text, ProjectFile::SetupPy.as_str());

        let must_write = created || plan.text != original;
        let written = must_write && !options.dry_run;
        if written {
            write_atomic(&setup_py, plan.text.as_bytes())?;
            info!(path = %setup_py, "Updated setup.py");
        }

        Ok(SyncReport {
            created,
            install_requires: plan.install_requires,
            dependency_links: plan.dependency_links,
            diff,
            written,
            dry_run: options.dry_run,
        })
    }

    /// Compare `setup.py` with the lock without modifying anything.
    pub fn check(&self, options: &CheckOptions) -> Result<CheckReport> {
        let manifest = self.load_manifest()?;
        let setup_py = self.require(ProjectFile::SetupPy)?;
        let resolved = manifest.resolved(Group::Default)?;

        let descriptor = Descriptor::parse(read_text(&setup_py)?)?;
        let call = descriptor.setup_call()?;
        let install_requires = extract(&call, INSTALL_REQUIRES).require_literal(INSTALL_REQUIRES)?;
        let dependency_links = extract(&call, DEPENDENCY_LINKS).into_literal(DEPENDENCY_LINKS)?;

        let requirements: Vec<&str> = install_requires.values().collect();
        let links: Vec<&str> = dependency_links
            .as_ref()
            .map(|list| list.values().collect())
            .unwrap_or_default();

        let report = check_compatibility(&requirements, &links, &resolved, *options);
        debug!(status = ?report.status, findings = report.reports.len(), "Checked setup.py");
        Ok(report)
    }

    fn load_manifest(&self) -> Result<Manifest> {
        let pipfile = self.require(ProjectFile::Pipfile)?;
        let lockfile = self.require(ProjectFile::PipfileLock)?;
        let manifest = Manifest::load(
            &read_text(&pipfile)?,
            &read_text(&lockfile)?,
            self.paths.absolute_root().to_native(),
        )?;
        Ok(manifest)
    }

    fn require(&self, file: ProjectFile) -> Result<NormalizedPath> {
        let path = self.paths.file(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::MissingInputFile {
                file,
                path: path.to_native(),
            })
        }
    }
}

/// Apply both list merges to `text`, re-parsing between them.
fn plan_sync(text: String, targets: &[Dependency]) -> Result<Plan> {
    let requirements: Vec<MergeTarget> = targets.iter().map(MergeTarget::requirement).collect();
    let links: Vec<MergeTarget> = targets.iter().filter_map(MergeTarget::link).collect();

    let (text, install_requires) = sync_keyword(text, INSTALL_REQUIRES, &requirements, merge_requirements)?;
    let (text, dependency_links) = sync_keyword(text, DEPENDENCY_LINKS, &links, merge_links)?;

    Ok(Plan {
        text,
        install_requires,
        dependency_links,
    })
}

fn sync_keyword(
    text: String,
    keyword: &str,
    targets: &[MergeTarget],
    merge: fn(&[&str], &[MergeTarget]) -> MergeResult,
) -> Result<(String, MergeResult)> {
    let descriptor = Descriptor::parse(text)?;
    let call = descriptor.setup_call()?;
    let current = extract(&call, keyword).into_literal(keyword)?;

    let values: Vec<&str> = current
        .as_ref()
        .map(|list| list.values().collect())
        .unwrap_or_default();
    let result = merge(&values, targets);

    let updated = match rewrite(&call, keyword, current.as_ref(), &result.entries) {
        Some(edit) => edit.apply(descriptor.source()),
        None => descriptor.source().to_string(),
    };
    Ok((updated, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pysync_manifest::{Requirement, SourceKind};

    fn dependency(requirement: &str, link: Option<&str>) -> Dependency {
        Dependency {
            requirement: Requirement::parse(requirement).unwrap(),
            source: if link.is_some() {
                SourceKind::VersionControl
            } else {
                SourceKind::PinnedVersion
            },
            link: link.map(str::to_string),
        }
    }

    #[test]
    fn test_plan_sync_fills_template() {
        let plan = plan_sync(
            new_descriptor("demo"),
            &[
                dependency("requests==2.31.0", None),
                dependency(
                    "tools @ git+https://h/o/tools.git@v1",
                    Some("git+https://h/o/tools.git@v1#egg=tools"),
                ),
            ],
        )
        .unwrap();

        assert_eq!(plan.install_requires.added, 2);
        assert_eq!(plan.dependency_links.added, 1);
        assert_eq!(
            plan.text,
            "from setuptools import find_packages, setup\n\nsetup(\n    name=\"demo\",\n    version=\"0.1.0\",\n    packages=find_packages(),\n    install_requires=[\n        \"requests==2.31.0\",\n        \"tools @ git+https://h/o/tools.git@v1\",\n    ],\n    dependency_links=[\n        \"git+https://h/o/tools.git@v1#egg=tools\",\n    ],\n)\n"
        );
    }

    #[test]
    fn test_plan_sync_rejects_non_literal_links() {
        let text = "setup(install_requires=[], dependency_links=LINKS)\n".to_string();
        let err = plan_sync(text, &[dependency("requests==2.31.0", None)]).err();
        assert!(matches!(
            err,
            Some(Error::Descriptor(pysync_descriptor::Error::NotALiteralList { .. }))
        ));
    }
}
