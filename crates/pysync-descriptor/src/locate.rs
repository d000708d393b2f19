//! Finding the single `setup(...)` call in a `setup.py`.
//!
//! The source is parsed with tree-sitter's Python grammar and every call
//! expression in the tree is checked against the names `setup` can be
//! reached through:
//!
//! ```python
//! from setuptools import setup           # setup(...)
//! from setuptools import setup as s      # s(...)
//! import setuptools as st                # st.setup(...)
//! import distutils.core                  # distutils.core.setup(...)
//! ```
//!
//! A bare `setup(...)` is accepted even when no import is visible.

use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{Error, Result};

const SETUP_MODULES: &[&str] = &["setuptools", "distutils.core"];
const SETUP_FUNCTION: &str = "setup";

/// A parsed `setup.py`.
#[derive(Debug)]
pub struct Descriptor {
    source: String,
    tree: Tree,
}

impl Descriptor {
    /// Parse `source`, rejecting it if the tree contains error or missing nodes.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        let tree = parser
            .parse(&source, None)
            .ok_or(Error::ParserUnavailable)?;

        if let Some(node) = first_error(tree.root_node()) {
            let position = node.start_position();
            return Err(Error::SyntaxError {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        Ok(Self { source, tree })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Locate the one call to `setup`.
    pub fn setup_call(&self) -> Result<SetupCall<'_>> {
        let root = self.tree.root_node();
        let imports = Imports::collect(root, &self.source);

        let mut calls = Vec::new();
        for_each_node(root, |node| {
            if node.kind() != "call" {
                return;
            }
            let callee = node.child_by_field_name("function");
            let arguments = node.child_by_field_name("arguments");
            if let (Some(callee), Some(arguments)) = (callee, arguments) {
                if arguments.kind() == "argument_list" && imports.is_setup(callee, &self.source) {
                    calls.push(SetupCall {
                        source: &self.source,
                        node,
                        arguments,
                    });
                }
            }
        });

        match calls.len() {
            0 => Err(Error::NoCallFound),
            1 => {
                let call = calls.remove(0);
                debug!(line = call.line(), "Located setup() call");
                Ok(call)
            }
            count => Err(Error::AmbiguousCall { count }),
        }
    }
}

/// The located `setup(...)` call.
#[derive(Debug, Clone, Copy)]
pub struct SetupCall<'a> {
    source: &'a str,
    node: Node<'a>,
    arguments: Node<'a>,
}

impl<'a> SetupCall<'a> {
    /// Byte span of the whole call expression.
    pub fn span(&self) -> Range<usize> {
        self.node.byte_range()
    }

    /// 1-based line of the call.
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The parenthesized argument list.
    pub(crate) fn arguments(&self) -> Node<'a> {
        self.arguments
    }

    /// The keyword argument `name=...`, if present. The first one wins when
    /// a keyword is repeated.
    pub fn keyword(&self, name: &str) -> Option<KeywordArgument<'a>> {
        let mut cursor = self.arguments.walk();
        self.arguments
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "keyword_argument")
            .find_map(|child| {
                let key = child.child_by_field_name("name")?;
                let value = child.child_by_field_name("value")?;
                (&self.source[key.byte_range()] == name).then_some(KeywordArgument { node: child, value })
            })
    }

    /// Names of all keyword arguments, in source order.
    pub fn keywords(&self) -> Vec<&'a str> {
        let mut cursor = self.arguments.walk();
        self.arguments
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "keyword_argument")
            .filter_map(|child| child.child_by_field_name("name"))
            .map(|name| &self.source[name.byte_range()])
            .collect()
    }
}

/// One `name=value` argument of the call.
#[derive(Debug, Clone, Copy)]
pub struct KeywordArgument<'a> {
    pub(crate) node: Node<'a>,
    pub(crate) value: Node<'a>,
}

impl KeywordArgument<'_> {
    pub fn span(&self) -> Range<usize> {
        self.node.byte_range()
    }

    pub fn value_span(&self) -> Range<usize> {
        self.value.byte_range()
    }
}

/// Names through which `setup` is reachable in this file.
#[derive(Debug)]
struct Imports {
    /// Plain names bound to the function itself.
    functions: HashSet<String>,
    /// Names bound to a module exposing `setup`.
    modules: HashSet<String>,
}

impl Imports {
    fn collect(root: Node<'_>, source: &str) -> Self {
        let mut imports = Self {
            functions: HashSet::from([SETUP_FUNCTION.to_string()]),
            modules: SETUP_MODULES.iter().map(|m| m.to_string()).collect(),
        };

        for_each_node(root, |node| match node.kind() {
            "import_from_statement" => imports.add_from_import(node, source),
            "import_statement" => imports.add_import(node, source),
            _ => {}
        });
        imports
    }

    /// `from setuptools import setup as s`, `from distutils import core`
    fn add_from_import(&mut self, node: Node<'_>, source: &str) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        let module = compact(&source[module.byte_range()]);

        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (imported, bound) = imported_name(name, source);
            if SETUP_MODULES.contains(&module.as_str()) && imported == SETUP_FUNCTION {
                self.functions.insert(bound);
            } else if SETUP_MODULES.contains(&format!("{module}.{imported}").as_str()) {
                self.modules.insert(bound);
            }
        }
    }

    /// `import setuptools as st`
    fn add_import(&mut self, node: Node<'_>, source: &str) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (imported, bound) = imported_name(name, source);
            if SETUP_MODULES.contains(&imported.as_str()) {
                self.modules.insert(bound);
            }
        }
    }

    fn is_setup(&self, callee: Node<'_>, source: &str) -> bool {
        match callee.kind() {
            "identifier" => self.functions.contains(&source[callee.byte_range()]),
            "attribute" => {
                let attribute = callee.child_by_field_name("attribute");
                let object = callee.child_by_field_name("object");
                match (attribute, object) {
                    (Some(attribute), Some(object)) => {
                        &source[attribute.byte_range()] == SETUP_FUNCTION
                            && self.modules.contains(&compact(&source[object.byte_range()]))
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// The imported dotted name and the local name it is bound to.
fn imported_name(node: Node<'_>, source: &str) -> (String, String) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .map(|n| compact(&source[n.byte_range()]))
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .map(|n| source[n.byte_range()].to_string())
            .unwrap_or_else(|| name.clone());
        (name, alias)
    } else {
        let name = compact(&source[node.byte_range()]);
        (name.clone(), name)
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    Some(found.unwrap_or(node))
}

/// Pre-order walk over every node under `root`.
pub(crate) fn for_each_node<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn locate(source: &str) -> Result<usize> {
        let descriptor = Descriptor::parse(source)?;
        let call = descriptor.setup_call()?;
        Ok(call.line())
    }

    #[rstest]
    #[case::direct("from setuptools import setup\nsetup(name='x')\n", 2)]
    #[case::bare("setup(name='x')\n", 1)]
    #[case::alias("from setuptools import setup as make\nmake(name='x')\n", 2)]
    #[case::module("import setuptools\nsetuptools.setup(name='x')\n", 2)]
    #[case::module_alias("import setuptools as st\nst.setup(name='x')\n", 2)]
    #[case::distutils("import distutils.core\ndistutils.core.setup(name='x')\n", 2)]
    #[case::distutils_from("from distutils.core import setup\nsetup(name='x')\n", 2)]
    #[case::distutils_submodule("from distutils import core\ncore.setup(name='x')\n", 2)]
    fn test_recognized_call_forms(#[case] source: &str, #[case] line: usize) {
        assert_eq!(locate(source).unwrap(), line);
    }

    #[test]
    fn test_call_nested_in_main_guard() {
        let source = "from setuptools import setup\n\nif __name__ == '__main__':\n    setup(name='x')\n";
        assert_eq!(locate(source).unwrap(), 4);
    }

    #[test]
    fn test_unrelated_calls_are_ignored() {
        let source = "import os\nprint('hi')\nother.setup()\nsetup(name='x')\n";
        assert_eq!(locate(source).unwrap(), 4);
    }

    #[test]
    fn test_no_call() {
        assert!(matches!(locate("import os\n"), Err(Error::NoCallFound)));
    }

    #[test]
    fn test_two_calls_are_ambiguous() {
        let source = "if x:\n    setup(name='a')\nelse:\n    setup(name='b')\n";
        assert!(matches!(locate(source), Err(Error::AmbiguousCall { count: 2 })));
    }

    #[test]
    fn test_syntax_error_position() {
        let err = locate("from setuptools import setup\nsetup(name='x'\n").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }), "got {err:?}");
    }

    #[test]
    fn test_keywords() {
        let descriptor =
            Descriptor::parse("setup(name='x', version='1', install_requires=[])").unwrap();
        let call = descriptor.setup_call().unwrap();
        assert_eq!(call.keywords(), vec!["name", "version", "install_requires"]);
        let arg = call.keyword("install_requires").unwrap();
        assert_eq!(&descriptor.source()[arg.value_span()], "[]");
        assert!(call.keyword("dependency_links").is_none());
    }
}
