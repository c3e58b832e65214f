//! Content-addressed object storage for Quarry.
//!
//! A hash-keyed object store analogous to git's `.git/objects/` directory.
//! File content is stored as [`Blob`]s and directory listings as [`Tree`]s,
//! each identified by its domain-separated BLAKE3 digest.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe.
//! 3. The store never interprets object contents; trees are decoded by the
//!    caller via [`Tree::from_stored_object`].
//! 4. All I/O errors are propagated, never silently ignored.

pub mod builder;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use builder::TreeBuilder;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
