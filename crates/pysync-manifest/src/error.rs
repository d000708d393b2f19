/// Errors raised while reading manifests or parsing requirement syntax.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Pipfile is not valid TOML or has an unexpected shape.
    #[error("failed to parse Pipfile: {0}")]
    PipfileParse(#[from] toml::de::Error),

    /// The lock file is not valid JSON or has an unexpected shape.
    #[error("failed to parse Pipfile.lock: {0}")]
    LockParse(#[from] serde_json::Error),

    /// A single package entry could not be understood.
    #[error("invalid entry for package '{name}' in {file}: {reason}")]
    InvalidEntry {
        file: &'static str,
        name: String,
        reason: String,
    },

    /// A package declared in the Pipfile has no resolved entry in the lock.
    #[error("package '{name}' is declared in Pipfile but missing from Pipfile.lock (is the lock file outdated?)")]
    MissingLockEntry { name: String },

    /// Two entries of one collection share a normalized name.
    #[error("duplicate package '{name}' in {file}")]
    DuplicatePackage { file: &'static str, name: String },

    /// Invalid PEP 508 requirement string.
    #[error("invalid requirement '{requirement}': {reason}")]
    InvalidRequirement { requirement: String, reason: String },

    /// Invalid PEP 440 version string.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Invalid PEP 440 specifier clause or set.
    #[error("invalid version specifier '{specifier}': {reason}")]
    InvalidSpecifier { specifier: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
