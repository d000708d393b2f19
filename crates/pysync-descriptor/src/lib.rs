//! Build descriptor (`setup.py`) editing for pysync
//!
//! The descriptor is parsed with tree-sitter's Python grammar, the single
//! `setup(...)` call is located, and list-valued keyword arguments such as
//! `install_requires` are read and rewritten in place. Every byte outside
//! the edited list literal is left untouched.
//!
//! # Example
//!
//! ```
//! use pysync_descriptor::{Descriptor, ListEntry, extract, rewrite};
//!
//! let source = "from setuptools import setup\nsetup(name='x', install_requires=['a==1'])\n";
//! let descriptor = Descriptor::parse(source).unwrap();
//! let call = descriptor.setup_call().unwrap();
//! let current = extract(&call, "install_requires")
//!     .into_literal("install_requires")
//!     .unwrap();
//!
//! let entries = [ListEntry::kept(0, "a==2")];
//! let edit = rewrite(&call, "install_requires", current.as_ref(), &entries).unwrap();
//! assert_eq!(
//!     edit.apply(source),
//!     "from setuptools import setup\nsetup(name='x', install_requires=['a==2'])\n"
//! );
//! ```

pub mod diff;
pub mod edit;
pub mod error;
pub mod extract;
pub mod locate;
pub mod rewrite;
pub mod template;

pub use diff::DescriptorDiff;
pub use edit::{Edit, EditKind};
pub use error::{Error, Result};
pub use extract::{ArgumentList, ArgumentValue, Delimiter, ListElement, ListStyle, extract};
pub use locate::{Descriptor, KeywordArgument, SetupCall};
pub use rewrite::{ListEntry, rewrite};
pub use template::new_descriptor;

/// Keyword holding the requirement strings.
pub const INSTALL_REQUIRES: &str = "install_requires";

/// Keyword holding version-control links.
pub const DEPENDENCY_LINKS: &str = "dependency_links";
