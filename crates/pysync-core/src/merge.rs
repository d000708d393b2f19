//! Reconciling the current descriptor list with the manifest's entries.
//!
//! Entries are matched by key. Matched entries stay where they are and are
//! only rewritten when they differ semantically; unmatched target entries
//! are appended in manifest order; current entries with no target are
//! dropped.

use std::collections::{HashMap, HashSet};

use pysync_descriptor::ListEntry;
use pysync_manifest::{Dependency, Requirement, normalize_name};
use serde::Serialize;
use tracing::{debug, warn};

/// One entry the list should end up holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTarget {
    pub key: String,
    pub text: String,
}

impl MergeTarget {
    /// `install_requires` entry for a dependency.
    pub fn requirement(dependency: &Dependency) -> Self {
        Self {
            key: dependency.key(),
            text: dependency.requirement.to_string(),
        }
    }

    /// `dependency_links` entry for a dependency, if it has one.
    pub fn link(dependency: &Dependency) -> Option<Self> {
        dependency.link.as_ref().map(|link| Self {
            key: link_key(link),
            text: link.clone(),
        })
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeResult {
    #[serde(skip)]
    pub entries: Vec<ListEntry>,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl MergeResult {
    /// Entries added or rewritten. Removals are reported separately.
    pub fn edit_count(&self) -> usize {
        self.added + self.updated
    }

    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Merge `current` list values with `targets`.
///
/// `key_of` maps a current value to its key; `equivalent` decides whether a
/// current value already says the same as a target text.
pub fn merge(
    current: &[&str],
    targets: &[MergeTarget],
    key_of: impl Fn(&str) -> String,
    equivalent: impl Fn(&str, &str) -> bool,
) -> MergeResult {
    let by_key: HashMap<&str, &MergeTarget> = targets.iter().map(|t| (t.key.as_str(), t)).collect();

    let mut result = MergeResult::default();
    let mut seen = HashSet::new();
    for (index, value) in current.iter().enumerate() {
        let key = key_of(value);
        if !seen.insert(key.clone()) {
            warn!(entry = %value, "Dropping duplicate entry in setup.py");
            result.removed += 1;
            continue;
        }
        match by_key.get(key.as_str()) {
            Some(target) if equivalent(value, &target.text) => {
                result.entries.push(ListEntry::kept(index, *value));
            }
            Some(target) => {
                result.entries.push(ListEntry::kept(index, target.text.clone()));
                result.updated += 1;
            }
            None => result.removed += 1,
        }
    }

    for target in targets {
        if !seen.contains(&target.key) {
            result.entries.push(ListEntry::added(target.text.clone()));
            result.added += 1;
        }
    }

    debug!(
        added = result.added,
        updated = result.updated,
        removed = result.removed,
        "Merged list"
    );
    result
}

/// Merge an `install_requires` list.
pub fn merge_requirements(current: &[&str], targets: &[MergeTarget]) -> MergeResult {
    merge(current, targets, requirement_key, |value, target| {
        match (Requirement::parse(value), Requirement::parse(target)) {
            (Ok(a), Ok(b)) => a.canonical() == b.canonical(),
            _ => false,
        }
    })
}

/// Merge a `dependency_links` list.
pub fn merge_links(current: &[&str], targets: &[MergeTarget]) -> MergeResult {
    merge(current, targets, link_key, |value, target| {
        canonical_link(value) == canonical_link(target)
    })
}

/// Key of an `install_requires` entry: its normalized name.
pub fn requirement_key(value: &str) -> String {
    match Requirement::parse(value) {
        Ok(requirement) => requirement.key(),
        Err(_) => {
            let name: String = value
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect();
            if name.is_empty() {
                value.trim().to_string()
            } else {
                normalize_name(&name)
            }
        }
    }
}

/// Key of a `dependency_links` entry: the normalized `egg=` name from its
/// fragment, or the URL itself.
pub fn link_key(link: &str) -> String {
    let (_, fragment) = split_link(link);
    fragment
        .into_iter()
        .find(|(key, value)| *key == "egg" && !value.is_empty())
        .map(|(_, egg)| normalize_name(egg))
        .unwrap_or_else(|| link.trim().to_string())
}

/// A link with its fragment fields sorted and the egg name normalized, so
/// `#egg=a&subdirectory=b` and `#subdirectory=b&egg=a` compare equal.
fn canonical_link(link: &str) -> String {
    let (base, mut fragment) = split_link(link);
    if fragment.is_empty() {
        return base.to_string();
    }
    fragment.sort_unstable();
    let fields: Vec<String> = fragment
        .into_iter()
        .map(|(key, value)| match key {
            "egg" => format!("egg={}", normalize_name(value)),
            _ => format!("{key}={value}"),
        })
        .collect();
    format!("{base}#{}", fields.join("&"))
}

/// Split a link into its URL and `key=value` fragment fields.
fn split_link(link: &str) -> (&str, Vec<(&str, &str)>) {
    let link = link.trim();
    match link.split_once('#') {
        Some((base, fragment)) => {
            let fields = fragment
                .split('&')
                .filter(|field| !field.is_empty())
                .map(|field| field.split_once('=').unwrap_or((field, "")))
                .collect();
            (base, fields)
        }
        None => (link, Vec::new()),
    }
}
