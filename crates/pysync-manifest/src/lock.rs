//! `Pipfile.lock` model.
//!
//! The lock is JSON with a `_meta` header and one object per group:
//!
//! ```json
//! {
//!   "_meta": { "hash": { "sha256": "..." }, "pipfile-spec": 6, "requires": {}, "sources": [] },
//!   "default": { "requests": { "version": "==2.31.0", "hashes": ["sha256:..."] } },
//!   "develop": {}
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::pipfile::{PackageSpec, Source};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lockfile {
    #[serde(rename = "_meta", default)]
    pub meta: LockMeta,
    /// Runtime packages, keyed by name as pipenv wrote it.
    #[serde(default)]
    pub default: BTreeMap<String, PackageSpec>,
    /// Development packages.
    #[serde(default)]
    pub develop: BTreeMap<String, PackageSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockMeta {
    #[serde(default)]
    pub hash: BTreeMap<String, String>,
    #[serde(rename = "pipfile-spec", default)]
    pub pipfile_spec: Option<u32>,
    #[serde(default)]
    pub requires: BTreeMap<String, String>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Lockfile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
