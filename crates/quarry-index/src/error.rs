//! Error types for the index crate.

use quarry_types::ObjectId;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The specified path was not found in the index.
    #[error("path not found in index: {0}")]
    PathNotFound(String),

    /// An object referenced by the index was not found in the store.
    #[error("object not found in store: {0:?}")]
    ObjectNotFound(ObjectId),

    /// One or more paths have conflicts that must be resolved first.
    #[error("unresolved conflict at path: {0}")]
    UnresolvedConflict(String),

    /// `resolve_conflict` was called on a path without conflict stages.
    #[error("no conflict at path: {0}")]
    NoConflict(String),

    /// A conflict needs at least one side.
    #[error("conflict at {0} has no sides")]
    EmptyConflict(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] quarry_store::StoreError),

    /// An invalid path was provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
