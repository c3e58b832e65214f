//! Error types for the reader crate.

use std::collections::TryReserveError;
use std::path::PathBuf;

use quarry_filter::FilterError;
use quarry_store::StoreError;
use quarry_types::ObjectId;

/// Broad outcome classes callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReaderErrorKind {
    /// The path does not resolve in the backing store.
    NotFound,
    /// Working-tree content disagrees with what is staged.
    Mismatch,
    /// Filesystem or object storage failure.
    Io,
    /// A content filter failed.
    Filter,
    /// The output buffer could not grow.
    Allocation,
}

/// Errors returned by [`read`](crate::read).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// Post-filter working-tree content does not hash to the staged id, or
    /// the path is not staged at all.
    #[error("working tree content of {path} ({}) does not match the index ({})", .actual.short_hex(), expected_label(.expected))]
    Mismatch {
        path: String,
        expected: Option<ObjectId>,
        actual: ObjectId,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("filter error: {0}")]
    Filter(FilterError),

    #[error("cannot grow output buffer: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("repository has no working directory")]
    BareRepository,
}

impl ReaderError {
    pub fn kind(&self) -> ReaderErrorKind {
        match self {
            Self::NotFound { .. } => ReaderErrorKind::NotFound,
            Self::Mismatch { .. } => ReaderErrorKind::Mismatch,
            Self::Io { .. } | Self::Store(_) | Self::InvalidPath(_) | Self::BareRepository => {
                ReaderErrorKind::Io
            }
            Self::Filter(_) => ReaderErrorKind::Filter,
            Self::Allocation(_) => ReaderErrorKind::Allocation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ReaderErrorKind::NotFound
    }

    pub fn is_mismatch(&self) -> bool {
        self.kind() == ReaderErrorKind::Mismatch
    }

    pub(crate) fn not_found(path: &str) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }
}

impl From<FilterError> for ReaderError {
    fn from(e: FilterError) -> Self {
        match e {
            FilterError::Io { path, source } => Self::Io { path, source },
            FilterError::InvalidPath(path) => Self::InvalidPath(path),
            other => Self::Filter(other),
        }
    }
}

fn expected_label(expected: &Option<ObjectId>) -> String {
    match expected {
        Some(id) => id.short_hex(),
        None => "not staged".to_string(),
    }
}

/// Convenience alias for reader results.
pub type ReaderResult<T> = Result<T, ReaderError>;
