//! `Pipfile` model.
//!
//! # Example
//!
//! ```toml
//! [[source]]
//! url = "https://pypi.org/simple"
//! verify_ssl = true
//! name = "pypi"
//!
//! [packages]
//! requests = "*"
//! django = ">=3.0"
//! celery = { version = "~=5.2", extras = ["redis"] }
//! tools = { git = "https://github.com/org/tools.git", ref = "v1.2", editable = true }
//! pywin32 = { version = "*", sys_platform = "== 'win32'" }
//!
//! [dev-packages]
//! pytest = "*"
//! ```

use std::collections::BTreeMap;

use pysync_fs::ProjectFile;
use serde::{Deserialize, Serialize};

use crate::dependency::SourceKind;
use crate::error::{Error, Result};

const PIPFILE: &str = ProjectFile::Pipfile.as_str();

/// PEP 508 environment markers pipenv accepts as top-level package keys.
const MARKER_KEYS: &[&str] = &[
    "os_name",
    "sys_platform",
    "platform_machine",
    "platform_python_implementation",
    "platform_release",
    "platform_system",
    "platform_version",
    "python_version",
    "python_full_version",
    "implementation_name",
    "implementation_version",
];

const VCS_SCHEMES: &[&str] = &["git", "hg", "svn", "bzr"];

/// The parsed `Pipfile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pipfile {
    /// Package indexes.
    #[serde(default)]
    pub source: Vec<Source>,
    /// Runtime packages, in declaration order.
    #[serde(default)]
    pub packages: toml::Table,
    /// Development packages, in declaration order.
    #[serde(default, rename = "dev-packages")]
    pub dev_packages: toml::Table,
    /// Interpreter requirements such as `python_version`.
    #[serde(default)]
    pub requires: BTreeMap<String, String>,
}

impl Pipfile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// A package index declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Source {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub verify_ssl: Option<bool>,
}

/// One package entry, shared by the Pipfile and the lock file.
///
/// In a Pipfile a plain string entry (`requests = ">=2"`) is read as a spec
/// with only `version` set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackageSpec {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub markers: Option<String>,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub git: Option<String>,
    #[serde(default)]
    pub hg: Option<String>,
    #[serde(default)]
    pub svn: Option<String>,
    #[serde(default)]
    pub bzr: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub subdirectory: Option<String>,
}

impl PackageSpec {
    /// Read a Pipfile package value: either a version string or a table.
    pub fn from_pipfile_value(name: &str, value: &toml::Value) -> Result<Self> {
        match value {
            toml::Value::String(version) => Ok(Self {
                version: Some(version.clone()),
                ..Self::default()
            }),
            toml::Value::Table(table) => {
                let mut spec: Self =
                    value
                        .clone()
                        .try_into()
                        .map_err(|e: toml::de::Error| Error::InvalidEntry {
                            file: PIPFILE,
                            name: name.to_string(),
                            reason: e.to_string(),
                        })?;
                spec.markers = merge_markers(spec.markers.take(), table, name)?;
                Ok(spec)
            }
            other => Err(Error::InvalidEntry {
                file: PIPFILE,
                name: name.to_string(),
                reason: format!("expected a version string or a table, found {}", other.type_str()),
            }),
        }
    }

    /// The version-control system and repository URL, if any.
    pub fn vcs(&self) -> Option<(&'static str, &str)> {
        let urls = [&self.git, &self.hg, &self.svn, &self.bzr];
        VCS_SCHEMES
            .iter()
            .zip(urls)
            .find_map(|(scheme, url)| url.as_deref().map(|u| (*scheme, u)))
    }

    pub fn source_kind(&self) -> SourceKind {
        if self.vcs().is_some() {
            return SourceKind::VersionControl;
        }
        if self.path.is_some() {
            return SourceKind::LocalPath;
        }
        if let Some(file) = &self.file {
            return if file.contains("://") {
                SourceKind::Url
            } else {
                SourceKind::LocalPath
            };
        }
        let unconstrained = self.version.as_deref().is_none_or(|v| v.trim() == "*");
        if !self.extras.is_empty() && unconstrained {
            SourceKind::ExtrasOnly
        } else {
            SourceKind::PinnedVersion
        }
    }

    /// The version-control URL in pip syntax: `git+https://host/repo.git@ref`.
    pub fn vcs_url(&self) -> Option<String> {
        let (scheme, url) = self.vcs()?;
        let prefix = format!("{scheme}+");
        let mut out = if url.starts_with(&prefix) {
            url.to_string()
        } else {
            format!("{prefix}{url}")
        };
        if let Some(reference) = &self.reference {
            out.push('@');
            out.push_str(reference);
        }
        Some(out)
    }

    /// The local path this entry points at, relative paths kept as written.
    pub fn local_path(&self) -> Option<&str> {
        match (&self.path, &self.file) {
            (Some(path), _) => Some(path),
            (None, Some(file)) if !file.contains("://") => Some(file),
            _ => None,
        }
    }
}

/// Fold pipenv's marker shorthand keys (`sys_platform = "== 'win32'"`) into
/// one marker expression.
fn merge_markers(markers: Option<String>, table: &toml::Table, name: &str) -> Result<Option<String>> {
    let mut clauses: Vec<String> = markers.into_iter().collect();
    for key in MARKER_KEYS {
        match table.get(*key) {
            Some(toml::Value::String(condition)) => clauses.push(format!("{key} {}", condition.trim())),
            Some(other) => {
                return Err(Error::InvalidEntry {
                    file: PIPFILE,
                    name: name.to_string(),
                    reason: format!("marker '{key}' must be a string, found {}", other.type_str()),
                });
            }
            None => {}
        }
    }

    Ok(match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(
            clauses
                .iter()
                .map(|c| if c.contains(" or ") { format!("({c})") } else { c.clone() })
                .collect::<Vec<_>>()
                .join(" and "),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPFILE_TEXT: &str = r#"
[[source]]
url = "https://pypi.org/simple"
verify_ssl = true
name = "pypi"

[packages]
requests = "*"
Django = ">=3.0"
celery = { extras = ["redis"] }
tools = { git = "https://github.com/org/tools.git", ref = "v1.2", editable = true }
pywin32 = { version = "*", sys_platform = "== 'win32'", markers = "python_version >= '3.8'" }

[dev-packages]
pytest = "*"

[requires]
python_version = "3.11"
"#;

    #[test]
    fn test_parse_keeps_declaration_order() {
        let pipfile = Pipfile::parse(PIPFILE_TEXT).unwrap();
        let names: Vec<&str> = pipfile.packages.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["requests", "Django", "celery", "tools", "pywin32"]);
        assert_eq!(pipfile.dev_packages.len(), 1);
        assert_eq!(pipfile.source[0].url, "https://pypi.org/simple");
        assert_eq!(pipfile.requires["python_version"], "3.11");
    }

    #[test]
    fn test_string_entry() {
        let spec = PackageSpec::from_pipfile_value("django", &toml::Value::String(">=3.0".into()))
            .unwrap();
        assert_eq!(spec.version.as_deref(), Some(">=3.0"));
        assert_eq!(spec.source_kind(), SourceKind::PinnedVersion);
    }

    #[test]
    fn test_source_kinds() {
        let pipfile = Pipfile::parse(PIPFILE_TEXT).unwrap();
        let kind = |name: &str| {
            PackageSpec::from_pipfile_value(name, &pipfile.packages[name])
                .unwrap()
                .source_kind()
        };
        assert_eq!(kind("requests"), SourceKind::PinnedVersion);
        assert_eq!(kind("celery"), SourceKind::ExtrasOnly);
        assert_eq!(kind("tools"), SourceKind::VersionControl);
    }

    #[test]
    fn test_vcs_url() {
        let spec = PackageSpec {
            git: Some("https://github.com/org/tools.git".into()),
            reference: Some("v1.2".into()),
            ..PackageSpec::default()
        };
        assert_eq!(
            spec.vcs_url().as_deref(),
            Some("git+https://github.com/org/tools.git@v1.2")
        );

        let already_prefixed = PackageSpec {
            hg: Some("hg+https://hg.example.com/repo".into()),
            ..PackageSpec::default()
        };
        assert_eq!(
            already_prefixed.vcs_url().as_deref(),
            Some("hg+https://hg.example.com/repo")
        );
    }

    #[test]
    fn test_marker_keys_are_merged() {
        let pipfile = Pipfile::parse(PIPFILE_TEXT).unwrap();
        let spec = PackageSpec::from_pipfile_value("pywin32", &pipfile.packages["pywin32"]).unwrap();
        assert_eq!(
            spec.markers.as_deref(),
            Some("python_version >= '3.8' and sys_platform == 'win32'")
        );
    }

    #[test]
    fn test_file_entry_kinds() {
        let remote = PackageSpec {
            file: Some("https://example.com/pkg-1.0.tar.gz".into()),
            ..PackageSpec::default()
        };
        assert_eq!(remote.source_kind(), SourceKind::Url);
        assert_eq!(remote.local_path(), None);

        let local = PackageSpec {
            file: Some("./dist/pkg-1.0.whl".into()),
            ..PackageSpec::default()
        };
        assert_eq!(local.source_kind(), SourceKind::LocalPath);
        assert_eq!(local.local_path(), Some("./dist/pkg-1.0.whl"));
    }

    #[test]
    fn test_invalid_entry_type() {
        let err = PackageSpec::from_pipfile_value("bad", &toml::Value::Integer(3)).unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_invalid_pipfile_toml() {
        assert!(matches!(
            Pipfile::parse("[packages\nrequests = "),
            Err(Error::PipfileParse(_))
        ));
    }
}
