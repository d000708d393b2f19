//! PEP 440 versions and version specifier sets.
//!
//! Versions compare by their zero-padded release components first. Two
//! versions with the same release of at most three significant components
//! are then ordered by mapping them onto `semver::Version`:
//!
//! - the release becomes `major.minor.patch` (missing components default
//!   to 0);
//! - pre-releases become semver pre-release identifiers (`a.1`, `b.2`,
//!   `rc.1`), and a bare dev release becomes `0dev.N`, which sorts before
//!   `a`;
//! - post-releases are folded into build metadata, which semver orders
//!   after the plain release.
//!
//! Longer releases (`1.2.3.4rc1`) skip the mapping and compare their
//! pre, post and dev segments directly.
//!
//! Known gaps: non-zero epochs are rejected, and on the semver path dev
//! releases of pre- or post-releases sort slightly off (`1.0a1.dev1` lands
//! after `1.0a1`). Neither shows up in lock files in practice.
//!
//! # Examples
//!
//! ```
//! use pysync_manifest::version::{SpecifierSet, Version};
//!
//! let range = SpecifierSet::parse(">=2.0,<3.0").unwrap();
//! assert!(range.contains(&Version::parse("2.31.0").unwrap()));
//! assert!(!range.contains(&Version::parse("3.0").unwrap()));
//!
//! let compatible = SpecifierSet::parse("~=1.2").unwrap();
//! assert!(compatible.contains(&Version::parse("1.9.1").unwrap()));
//! assert!(!compatible.contains(&Version::parse("2.0").unwrap()));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre>[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?P<post>(?:-(?P<post_n1>[0-9]+))|(?:[-_.]?(?:post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?))?
        (?P<dev>[-_.]?dev[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .unwrap()
});

static CLAUSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(===|~=|==|!=|<=|>=|<|>)?\s*([^\s,]+)\s*$").unwrap());

/// Pre-release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreKind {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreKind {
    fn label(self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::ReleaseCandidate => "rc",
        }
    }
}

/// A parsed PEP 440 version.
///
/// Equality and ordering ignore the local label (`+ubuntu1`); use
/// [`Version::local`] when it matters.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
    key: semver::Version,
}

impl Version {
    /// Parse a version string such as `2.31.0`, `1.0rc1`, `2023.3.post1`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| invalid("not a PEP 440 version"))?;

        if let Some(epoch) = caps.name("epoch")
            && !epoch.as_str().trim_start_matches('0').is_empty()
        {
            return Err(invalid("non-zero epochs are not supported"));
        }

        let release = caps["release"]
            .split('.')
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("release segment out of range"))?;

        let number = |m: Option<regex::Match<'_>>| -> Result<u64> {
            m.map_or(Ok(0), |m| {
                m.as_str()
                    .parse()
                    .map_err(|_| invalid("number out of range"))
            })
        };

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let kind = match label.as_str().to_ascii_lowercase().as_str() {
                    "a" | "alpha" => PreKind::Alpha,
                    "b" | "beta" => PreKind::Beta,
                    _ => PreKind::ReleaseCandidate,
                };
                Some((kind, number(caps.name("pre_n"))?))
            }
            None => None,
        };
        let post = match caps.name("post") {
            Some(_) => Some(number(caps.name("post_n1").or(caps.name("post_n2")))?),
            None => None,
        };
        let dev = match caps.name("dev") {
            Some(_) => Some(number(caps.name("dev_n"))?),
            None => None,
        };
        let local = caps
            .name("local")
            .map(|m| m.as_str().to_ascii_lowercase().replace(['-', '_'], "."));

        let key = semver_key(&release, pre, post, dev).map_err(|e| invalid(&e))?;

        Ok(Self {
            release,
            pre,
            post,
            dev,
            local,
            key,
        })
    }

    /// The release components (`[2, 31, 0]` for `2.31.0`).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The normalized local label, if any.
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// True for alpha, beta, release-candidate and dev releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// The semver value that orders versions of up to three release components.
    pub fn semver_key(&self) -> &semver::Version {
        &self.key
    }

    /// Release components match `prefix` after zero padding.
    fn has_release_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, p)| self.release.get(i).copied().unwrap_or(0) == *p)
    }

    /// Release length without trailing zero components.
    fn significant_len(&self) -> usize {
        self.release.iter().rposition(|&part| part != 0).map_or(0, |i| i + 1)
    }

    /// Sort key of the pre, post and dev segments: a bare dev release
    /// sorts first, then pre-releases, the final release, post-releases.
    /// Within each, a dev release precedes its parent.
    fn suffix_rank(&self) -> ((u8, u64), Option<u64>, (u8, u64)) {
        let pre = match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => (0, 0),
            (Some((PreKind::Alpha, n)), _, _) => (1, n),
            (Some((PreKind::Beta, n)), _, _) => (2, n),
            (Some((PreKind::ReleaseCandidate, n)), _, _) => (3, n),
            (None, _, _) => (4, 0),
        };
        let dev = match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        };
        (pre, self.post, dev)
    }

    fn same_release(&self, other: &Version) -> bool {
        let len = self.release.len().max(other.release.len());
        (0..len).all(|i| {
            self.release.get(i).copied().unwrap_or(0) == other.release.get(i).copied().unwrap_or(0)
        })
    }
}

fn semver_key(
    release: &[u64],
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
) -> std::result::Result<semver::Version, String> {
    let part = |i: usize| release.get(i).copied().unwrap_or(0);
    let mut key = semver::Version::new(part(0), part(1), part(2));

    let mut pre_ids: Vec<String> = Vec::new();
    if let Some((kind, n)) = pre {
        pre_ids.push(kind.label().to_string());
        pre_ids.push(n.to_string());
    }

    let mut extra: Vec<u64> = release.iter().skip(3).copied().collect();
    while extra.last() == Some(&0) {
        extra.pop();
    }
    let mut build_ids: Vec<String> = extra.iter().map(u64::to_string).collect();

    match (post, dev) {
        (Some(post), dev) => {
            if build_ids.is_empty() {
                build_ids.push("0".to_string());
            }
            build_ids.push("post".to_string());
            build_ids.push(post.to_string());
            if let Some(dev) = dev {
                build_ids.push("0dev".to_string());
                build_ids.push(dev.to_string());
            }
        }
        (None, Some(dev)) => {
            pre_ids.push("0dev".to_string());
            pre_ids.push(dev.to_string());
        }
        (None, None) => {}
    }

    if !pre_ids.is_empty() {
        key.pre = semver::Prerelease::new(&pre_ids.join(".")).map_err(|e| e.to_string())?;
    }
    if !build_ids.is_empty() {
        key.build = semver::BuildMetadata::new(&build_ids.join(".")).map_err(|e| e.to_string())?;
    }
    Ok(key)
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        let padded = |v: &Version, i: usize| v.release.get(i).copied().unwrap_or(0);
        let release = (0..len)
            .map(|i| padded(self, i).cmp(&padded(other, i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal);

        release.then_with(|| {
            if self.significant_len() <= 3 {
                self.key.cmp(&other.key)
            } else {
                self.suffix_rank().cmp(&other.suffix_rank())
            }
        })
    }
}

impl std::str::FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{}", kind.label(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

/// A single version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    /// `~=`
    Compatible,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `===`
    Arbitrary,
}

impl CompareOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Arbitrary => "===",
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    Exact(Version),
    /// `==1.2.*` / `!=1.2.*`
    Prefix(Vec<u64>),
    /// Operand of `===`, compared as a string.
    Literal(String),
}

/// One clause of a specifier set, e.g. `>=2.0`.
#[derive(Debug, Clone)]
pub struct Specifier {
    op: CompareOp,
    target: Target,
}

impl Specifier {
    /// Parse a single clause. A bare version implies `==`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSpecifier {
            specifier: s.to_string(),
            reason,
        };

        let caps = CLAUSE_PATTERN
            .captures(s)
            .ok_or_else(|| invalid("expected an operator followed by a version".to_string()))?;
        let op = match caps.get(1).map(|m| m.as_str()) {
            Some("===") => CompareOp::Arbitrary,
            Some("~=") => CompareOp::Compatible,
            Some("!=") => CompareOp::Ne,
            Some("<=") => CompareOp::Lte,
            Some(">=") => CompareOp::Gte,
            Some("<") => CompareOp::Lt,
            Some(">") => CompareOp::Gt,
            Some(_) | None => CompareOp::Eq,
        };
        let operand = &caps[2];

        let target = if op == CompareOp::Arbitrary {
            Target::Literal(operand.to_string())
        } else if let Some(prefix) = operand.strip_suffix(".*") {
            if !matches!(op, CompareOp::Eq | CompareOp::Ne) {
                return Err(invalid(format!(
                    "wildcards are only allowed with == and !=, not {}",
                    op.as_str()
                )));
            }
            let version = Version::parse(prefix).map_err(|e| invalid(e.to_string()))?;
            if version.pre.is_some() || version.post.is_some() || version.dev.is_some() {
                return Err(invalid("wildcard prefix must be a plain release".to_string()));
            }
            Target::Prefix(version.release)
        } else {
            let version = Version::parse(operand).map_err(|e| invalid(e.to_string()))?;
            if op == CompareOp::Compatible && version.release.len() < 2 {
                return Err(invalid("~= needs at least two release components".to_string()));
            }
            Target::Exact(version)
        };

        Ok(Self { op, target })
    }

    /// Check if `candidate` satisfies this clause.
    pub fn matches(&self, candidate: &Version) -> bool {
        match (&self.target, self.op) {
            (Target::Literal(text), _) => candidate.to_string().eq_ignore_ascii_case(text),
            (Target::Prefix(prefix), CompareOp::Eq) => candidate.has_release_prefix(prefix),
            (Target::Prefix(prefix), _) => !candidate.has_release_prefix(prefix),
            (Target::Exact(v), CompareOp::Eq) => exact_match(candidate, v),
            (Target::Exact(v), CompareOp::Ne) => !exact_match(candidate, v),
            (Target::Exact(v), CompareOp::Compatible) => {
                candidate >= v && candidate.has_release_prefix(&v.release[..v.release.len() - 1])
            }
            (Target::Exact(v), CompareOp::Lte) => candidate <= v,
            (Target::Exact(v), CompareOp::Gte) => candidate >= v,
            // `<V` never admits a pre-release of V itself unless V is one.
            (Target::Exact(v), CompareOp::Lt) => {
                candidate < v
                    && !(!v.is_prerelease() && candidate.is_prerelease() && candidate.same_release(v))
            }
            // `>V` never admits a post-release of V itself unless V is one.
            (Target::Exact(v), CompareOp::Gt) => {
                candidate > v
                    && !(!v.is_postrelease()
                        && candidate.is_postrelease()
                        && candidate.same_release(v))
            }
            (Target::Exact(_), CompareOp::Arbitrary) => false,
        }
    }

    /// Check if this clause pins exactly `version` and nothing else.
    fn pins(&self, version: &Version) -> bool {
        match (&self.target, self.op) {
            (Target::Exact(v), CompareOp::Eq) => v == version && v.local() == version.local(),
            (Target::Literal(text), CompareOp::Arbitrary) => {
                version.to_string().eq_ignore_ascii_case(text)
            }
            _ => false,
        }
    }
}

fn exact_match(candidate: &Version, v: &Version) -> bool {
    match v.local() {
        Some(local) => candidate == v && candidate.local() == Some(local),
        None => candidate == v,
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.as_str())?;
        match &self.target {
            Target::Exact(v) => write!(f, "{v}"),
            Target::Prefix(prefix) => {
                let parts: Vec<String> = prefix.iter().map(u64::to_string).collect();
                write!(f, "{}.*", parts.join("."))
            }
            Target::Literal(text) => f.write_str(text),
        }
    }
}

/// A comma-separated set of clauses; a version must satisfy all of them.
///
/// The empty set (from `""` or `"*"`) accepts every version.
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parse a specifier set like `>=2.0,<3.0`, `(==1.4)` or `*`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut text = s.trim();
        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            text = inner.trim();
        }
        if text.is_empty() || text == "*" {
            return Ok(Self::default());
        }

        let specifiers = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { specifiers })
    }

    /// A set holding the single clause `==version`.
    pub fn exact(version: Version) -> Self {
        Self {
            specifiers: vec![Specifier {
                op: CompareOp::Eq,
                target: Target::Exact(version),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specifiers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.specifiers.iter()
    }

    /// Check if `version` satisfies every clause.
    pub fn contains(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// Check if the set denotes exactly one version and it is `version`.
    pub fn pins(&self, version: &Version) -> bool {
        matches!(self.specifiers.as_slice(), [only] if only.pins(version))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}
