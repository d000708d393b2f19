//! Filesystem layer for pysync
//!
//! Provides the well-known project file names, normalized path handling and
//! atomic text writes.

pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use constants::ProjectFile;
pub use error::{Error, Result};
pub use path::NormalizedPath;
