//! Error types for the filter crate.

use std::path::PathBuf;

/// Errors raised while loading or applying filters.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Attributes are only defined for plain repository-relative paths.
    #[error("not a repository-relative path: {0:?}")]
    InvalidPath(String),

    /// An attribute pattern could not be compiled.
    #[error("invalid attribute pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A required driver has no command for the requested direction.
    #[error("required filter driver {0:?} is not configured")]
    DriverNotConfigured(String),

    /// The driver process could not be started or its pipes failed.
    #[error("filter driver {driver:?} could not run {command:?}: {source}")]
    DriverSpawn {
        driver: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A required driver exited unsuccessfully.
    #[error("filter driver {driver:?} failed on {path}: {reason}")]
    DriverFailed {
        driver: String,
        path: String,
        reason: String,
    },
}

impl FilterError {
    /// Returns `true` if the failure came from reading the source file
    /// rather than from a transform.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Convenience alias for filter results.
pub type FilterResult<T> = Result<T, FilterError>;
