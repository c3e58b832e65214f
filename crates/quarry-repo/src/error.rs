use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("repository is bare; it has no working directory")]
    Bare,

    #[error("path is not inside the working directory: {0:?}")]
    OutsideWorkdir(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] quarry_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] quarry_index::IndexError),

    #[error("filter error: {0}")]
    Filter(#[from] quarry_filter::FilterError),
}

pub type RepoResult<T> = Result<T, RepoError>;
