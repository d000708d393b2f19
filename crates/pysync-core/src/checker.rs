//! Classifying each locked dependency against what setup.py declares.

use std::collections::HashSet;

use pysync_descriptor::{DEPENDENCY_LINKS, INSTALL_REQUIRES};
use pysync_manifest::{Requirement, ResolvedDependency};
use tracing::debug;

use crate::config::CheckOptions;
use crate::merge::{link_key, requirement_key};
use crate::sync::{CheckReport, ConflictKind, ConflictReport};

/// One `install_requires` entry as found in setup.py.
struct Declared<'a> {
    key: String,
    raw: &'a str,
    requirement: Option<Requirement>,
}

/// Compare the descriptor lists with the resolved dependencies.
pub fn check_compatibility(
    install_requires: &[&str],
    dependency_links: &[&str],
    resolved: &[ResolvedDependency],
    options: CheckOptions,
) -> CheckReport {
    let declared: Vec<Declared<'_>> = install_requires
        .iter()
        .map(|&raw| Declared {
            key: requirement_key(raw),
            raw,
            requirement: Requirement::parse(raw).ok(),
        })
        .collect();
    let link_keys: HashSet<String> = dependency_links.iter().map(|l| link_key(l)).collect();

    let mut reports = Vec::new();
    for dependency in resolved {
        if dependency.is_local() && options.ignore_local {
            debug!(package = %dependency.key(), "Skipping local dependency");
            continue;
        }

        let key = dependency.key();
        let locked_version = dependency.locked_version.as_ref().map(ToString::to_string);
        let entry = declared.iter().find(|d| d.key == key);
        let kind = match entry {
            None => ConflictKind::MissingFromDescriptor,
            Some(entry) => classify(entry, dependency, options.strict),
        };
        reports.push(ConflictReport {
            name: key.clone(),
            kind,
            keyword: INSTALL_REQUIRES,
            locked_version,
            declared: entry.map(|e| e.raw.to_string()),
            local: dependency.is_local(),
        });

        if let Some(link) = &dependency.dependency.link {
            if !link_keys.contains(&link_key(link)) {
                reports.push(ConflictReport {
                    name: key,
                    kind: ConflictKind::MissingFromDescriptor,
                    keyword: DEPENDENCY_LINKS,
                    locked_version: None,
                    declared: None,
                    local: true,
                });
            }
        }
    }

    let known: HashSet<String> = resolved.iter().map(ResolvedDependency::key).collect();
    let mut extras_seen = HashSet::new();
    for entry in &declared {
        if !known.contains(&entry.key) && extras_seen.insert(entry.key.clone()) {
            reports.push(ConflictReport {
                name: entry.key.clone(),
                kind: ConflictKind::ExtraInDescriptor,
                keyword: INSTALL_REQUIRES,
                locked_version: None,
                declared: Some(entry.raw.to_string()),
                local: false,
            });
        }
    }

    CheckReport::new(reports, options.strict, options.ignore_local)
}

fn classify(entry: &Declared<'_>, dependency: &ResolvedDependency, strict: bool) -> ConflictKind {
    let Some(requirement) = &entry.requirement else {
        return ConflictKind::VersionConflict;
    };

    let Some(locked) = &dependency.locked_version else {
        let same = requirement.specifier.is_empty()
            && match (&requirement.url, &dependency.dependency.requirement.url) {
                (None, _) => true,
                (Some(declared), Some(source)) => same_source(declared, source),
                (Some(_), None) => false,
            };
        return if same {
            ConflictKind::Ok
        } else {
            ConflictKind::VersionConflict
        };
    };

    if requirement.url.is_some() {
        return ConflictKind::VersionConflict;
    }
    if requirement.specifier.is_empty() {
        return ConflictKind::Ok;
    }

    let compatible = requirement.specifier.contains(locked)
        && (!strict || requirement.specifier.pins(locked));
    if compatible {
        ConflictKind::Ok
    } else {
        ConflictKind::VersionConflict
    }
}

/// Check if two direct-reference URLs point at the same source, ignoring
/// the `#fragment` and the `@ref` revision.
pub fn same_source(a: &str, b: &str) -> bool {
    strip_revision(a) == strip_revision(b)
}

fn strip_revision(url: &str) -> &str {
    let url = url.trim();
    let url = url.split_once('#').map_or(url, |(base, _)| base);
    let last_segment = url.rfind('/').map_or(0, |i| i + 1);
    let url = match url[last_segment..].rfind('@') {
        Some(at) => &url[..last_segment + at],
        None => url,
    };
    url.trim_end_matches('/')
}
