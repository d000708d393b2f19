//! Core orchestration layer for pysync
//!
//! This crate ties the manifest and descriptor crates together:
//!
//! - **Merge**: reconcile the current `setup()` lists with the locked dependencies
//! - **Compatibility check**: classify each locked package as ok, missing or conflicting
//! - **SyncEngine**: the `sync` and `check` operations over one project directory
//!
//! # Architecture
//!
//! ```text
//!                      pysync-cli
//!                          |
//!                     pysync-core
//!                          |
//!      +-------------------+------------------+
//!      |                   |                  |
//!  pysync-fs        pysync-manifest   pysync-descriptor
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pysync_core::{ProjectPaths, SyncEngine, SyncOptions};
//!
//! fn example() -> pysync_core::Result<()> {
//!     let engine = SyncEngine::new(ProjectPaths::new("."));
//!     let report = engine.sync(&SyncOptions::default())?;
//!     println!("{} edits", report.edit_count());
//!     Ok(())
//! }
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod merge;
pub mod sync;

pub use checker::check_compatibility;
pub use config::{CheckOptions, ProjectPaths, SyncOptions, VersionSource};
pub use error::{Error, Result};
pub use merge::{MergeResult, MergeTarget, merge_links, merge_requirements};
pub use sync::{CheckReport, CheckStatus, ConflictKind, ConflictReport, SyncEngine, SyncReport};

#[cfg(test)]
mod tests {
    use super::*;
    use pysync_fs::ProjectFile;
    use std::path::PathBuf;

    #[test]
    fn error_missing_input_file_displays_correctly() {
        let error = Error::MissingInputFile {
            file: ProjectFile::PipfileLock,
            path: PathBuf::from("/work/proj/Pipfile.lock"),
        };

        let display = error.to_string();
        assert!(
            display.contains("/work/proj/Pipfile.lock"),
            "Error display should contain the path, got: {display}"
        );
        assert!(
            display.starts_with("Pipfile.lock not found"),
            "Error display should name the file, got: {display}"
        );
    }
}
