use quarry_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, StoredObject, Tree};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; the same data always produces the
///   same ID.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// Writing an object that already exists is a no-op.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read an object that must exist and decode it as a blob.
    fn read_blob(&self, id: &ObjectId) -> StoreResult<Blob> {
        let stored = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        Blob::try_from(stored)
    }

    /// Read an object that must exist and decode it as a tree.
    fn read_tree(&self, id: &ObjectId) -> StoreResult<Tree> {
        let stored = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        Tree::from_stored_object(&stored)
    }
}
