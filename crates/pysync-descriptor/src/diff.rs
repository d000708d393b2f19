//! Unified diffs of descriptor changes, printed by `sync --dry-run`.

use std::fmt;

use similar::{ChangeTag, TextDiff};

/// Line diff between the current and the rewritten descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorDiff {
    /// Unified diff text with `a/` and `b/` headers.
    pub unified: String,
    pub insertions: usize,
    pub deletions: usize,
}

impl DescriptorDiff {
    pub fn compute(old: &str, new: &str, file_name: &str) -> Self {
        if old == new {
            return Self {
                unified: String::new(),
                insertions: 0,
                deletions: 0,
            };
        }

        let diff = TextDiff::from_lines(old, new);
        let (mut insertions, mut deletions) = (0, 0);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{file_name}"), &format!("b/{file_name}"))
            .to_string();

        Self {
            unified,
            insertions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

impl fmt::Display for DescriptorDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unified)
    }
}
