//! Text edits produced by the rewriter.

use std::ops::Range;

use serde::Serialize;

/// The kind of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditKind {
    /// A new keyword argument was added to the call.
    Insert,
    /// An existing list literal was re-rendered.
    Replace,
}

/// One contiguous change to the descriptor source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub kind: EditKind,
    /// Byte range in the original source.
    pub span: Range<usize>,
    pub old_content: String,
    pub new_content: String,
}

impl Edit {
    /// Apply this edit to the source it was computed from.
    pub fn apply(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + self.new_content.len());
        out.push_str(&source[..self.span.start]);
        out.push_str(&self.new_content);
        out.push_str(&source[self.span.end..]);
        out
    }

    /// Check if applying the edit leaves the source unchanged.
    pub fn is_noop(&self) -> bool {
        self.old_content == self.new_content
    }

    /// The edit that undoes this one on the edited text.
    pub fn inverse(&self) -> Self {
        Self {
            kind: EditKind::Replace,
            span: self.span.start..self.span.start + self.new_content.len(),
            old_content: self.new_content.clone(),
            new_content: self.old_content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_inverse() {
        let source = "setup(install_requires=[])";
        let edit = Edit {
            kind: EditKind::Replace,
            span: 23..25,
            old_content: "[]".to_string(),
            new_content: "[\"requests\"]".to_string(),
        };

        let edited = edit.apply(source);
        assert_eq!(edited, "setup(install_requires=[\"requests\"])");
        assert!(!edit.is_noop());

        let inverse = edit.inverse();
        assert_eq!(inverse.span, 23..35);
        assert_eq!(inverse.apply(&edited), source);
    }
}
