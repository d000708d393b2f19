//! Error types for pysync-core

use std::path::PathBuf;

use pysync_fs::ProjectFile;

/// Result type for pysync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pysync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required project file does not exist
    #[error("{file} not found at {path}")]
    MissingInputFile { file: ProjectFile, path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from pysync-fs
    #[error(transparent)]
    Fs(#[from] pysync_fs::Error),

    /// Pipfile / lock / requirement error from pysync-manifest
    #[error(transparent)]
    Manifest(#[from] pysync_manifest::Error),

    /// setup.py error from pysync-descriptor
    #[error(transparent)]
    Descriptor(#[from] pysync_descriptor::Error),
}
