//! PEP 508 requirement strings, as they appear in `install_requires`.
//!
//! Supported shape: `name[extra,...] specifier-set ; marker` or
//! `name[extra,...] @ url ; marker`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::version::SpecifierSet;

static REQUIREMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)
        \s*
        (?:\[(?P<extras>[^\]]*)\])?
        \s*
        (?:@\s*(?P<url>\S+?)|(?P<spec>[^;@]*?))
        \s*
        (?:;\s*(?P<marker>.*?))?
        \s*$",
    )
    .unwrap()
});

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a distribution name: lowercase, runs of `-`, `_`, `.` folded to `-`.
///
/// `Flask_SQLAlchemy`, `flask.sqlalchemy` and `flask-sqlalchemy` all
/// normalize to `flask-sqlalchemy`.
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(&name.trim().to_ascii_lowercase(), "-")
        .into_owned()
}

/// A parsed requirement.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Name as written.
    pub name: String,
    /// Extras as written, in order.
    pub extras: Vec<String>,
    /// Version constraint; empty means any version.
    pub specifier: SpecifierSet,
    /// Direct reference (`name @ url`).
    pub url: Option<String>,
    /// Environment marker, without the leading `;`.
    pub marker: Option<String>,
}

impl Requirement {
    /// A requirement on `name` with no constraint.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            specifier: SpecifierSet::default(),
            url: None,
            marker: None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRequirement {
            requirement: s.to_string(),
            reason,
        };

        let caps = REQUIREMENT_PATTERN
            .captures(s)
            .ok_or_else(|| invalid("expected `name[extras] specifier ; marker`".to_string()))?;

        let extras = caps
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let specifier = match caps.name("spec") {
            Some(spec) => SpecifierSet::parse(spec.as_str()).map_err(|e| invalid(e.to_string()))?,
            None => SpecifierSet::default(),
        };

        let marker = caps
            .name("marker")
            .map(|m| m.as_str().trim().to_string())
            .filter(|m| !m.is_empty());
        if s.contains(';') && marker.is_none() {
            return Err(invalid("empty environment marker".to_string()));
        }

        Ok(Self {
            name: caps["name"].to_string(),
            extras,
            specifier,
            url: caps.name("url").map(|m| m.as_str().to_string()),
            marker,
        })
    }

    /// The normalized name used as the identity of this requirement.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// A canonical spelling used to decide whether two requirements differ.
    ///
    /// Names and extras are normalized, extras sorted, specifier whitespace
    /// removed and marker whitespace collapsed.
    pub fn canonical(&self) -> String {
        let mut extras: Vec<String> = self.extras.iter().map(|e| normalize_name(e)).collect();
        extras.sort();
        extras.dedup();

        let mut out = self.key();
        if !extras.is_empty() {
            out.push_str(&format!("[{}]", extras.join(",")));
        }
        match &self.url {
            Some(url) => out.push_str(&format!(" @ {url}")),
            None => out.push_str(&self.specifier.to_string()),
        }
        if let Some(marker) = &self.marker {
            let collapsed: Vec<&str> = marker.split_whitespace().collect();
            out.push_str(&format!("; {}", collapsed.join(" ")));
        }
        out
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        match &self.url {
            Some(url) => write!(f, " @ {url}")?,
            None => write!(f, "{}", self.specifier)?,
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Flask_SQLAlchemy"), "flask-sqlalchemy");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a--_.b"), "a-b");
        assert_eq!(normalize_name("requests"), "requests");
    }

    #[test]
    fn test_parse_name_only() {
        let req = Requirement::parse("requests").unwrap();
        assert_eq!(req.name, "requests");
        assert!(req.specifier.is_empty());
        assert!(req.url.is_none());
        assert_eq!(req.to_string(), "requests");
    }

    #[test]
    fn test_parse_full() {
        let req =
            Requirement::parse("Requests[socks, security] >= 2.0, <3.0 ; python_version >= '3.7'")
                .unwrap();
        assert_eq!(req.name, "Requests");
        assert_eq!(req.extras, vec!["socks", "security"]);
        assert_eq!(req.specifier.to_string(), ">=2.0,<3.0");
        assert_eq!(req.marker.as_deref(), Some("python_version >= '3.7'"));
        assert_eq!(
            req.to_string(),
            "Requests[socks,security]>=2.0,<3.0; python_version >= '3.7'"
        );
    }

    #[test]
    fn test_parse_parenthesized_specifier() {
        let req = Requirement::parse("django (>=3.0,<4)").unwrap();
        assert_eq!(req.specifier.to_string(), ">=3.0,<4");
    }

    #[test]
    fn test_parse_direct_reference() {
        let req = Requirement::parse("pkg @ git+https://github.com/o/pkg.git@v1 ; os_name == 'nt'")
            .unwrap();
        assert_eq!(req.url.as_deref(), Some("git+https://github.com/o/pkg.git@v1"));
        assert_eq!(req.marker.as_deref(), Some("os_name == 'nt'"));
        assert!(req.specifier.is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Requirement::parse("").is_err());
        assert!(Requirement::parse("-bad").is_err());
        assert!(Requirement::parse("pkg >= not-a-version").is_err());
        assert!(Requirement::parse("pkg>=1.0;").is_err());
    }

    #[test]
    fn test_canonical_ignores_spelling() {
        let a = Requirement::parse("Flask_Login[B,a] >= 0.5").unwrap();
        let b = Requirement::parse("flask-login[a,b]>=0.5").unwrap();
        assert_eq!(a.canonical(), b.canonical());

        let c = Requirement::parse("flask-login>=0.6").unwrap();
        assert_ne!(a.canonical(), c.canonical());
    }

    #[test]
    fn test_named() {
        let req = Requirement::named("numpy");
        assert_eq!(req.key(), "numpy");
        assert_eq!(req.to_string(), "numpy");
    }
}
