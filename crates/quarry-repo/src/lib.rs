//! Repository handle for Quarry.
//!
//! A [`Repository`] ties together the working directory root, the object
//! store, the current staging index and the filter configuration loaded
//! from `.quarry/config.toml`.

pub mod config;
pub mod error;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use repository::Repository;

// Re-export key types
pub use quarry_filter::{Direction, FilterConfig, FilterList};
pub use quarry_index::{Index, IndexEntry, Stage};
pub use quarry_store::{Blob, EntryMode, ObjectStore, Tree, TreeEntry};
pub use quarry_types::ObjectId;
