use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use quarry_types::ObjectId;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` and
/// cloned on read/write. The store counts reads so callers can assert which
/// code paths touched object storage.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    reads: AtomicU64,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            reads: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Number of `read` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| {
            trace!(id = %id.short_hex(), kind = %object.kind, size = object.size, "object stored");
            object.clone()
        });
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, EntryMode, ObjectKind, Tree, TreeEntry};

    fn make_blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).to_stored_object()
    }

    #[test]
    fn write_and_read_blob() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello world");
        let id = store.write(&obj).unwrap();
        assert_eq!(store.read(&id).unwrap(), Some(obj));
        assert_eq!(store.read_blob(&id).unwrap().as_bytes(), b"hello world");
    }

    #[test]
    fn read_blob_rejects_tree() {
        let store = InMemoryObjectStore::new();
        let id = store
            .write(&Tree::empty().to_stored_object().unwrap())
            .unwrap();
        assert!(matches!(
            store.read_blob(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn read_tree_of_missing_id_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ObjectKind::Tree.hasher().hash(b"absent");
        assert!(matches!(store.read_tree(&id), Err(StoreError::NotFound(_))));
        assert!(store.read(&id).unwrap().is_none());
    }

    #[test]
    fn write_is_idempotent_and_dedups() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(&make_blob(b"same")).unwrap();
        let id2 = store.write(&make_blob(b"same")).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn exists_and_delete() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&make_blob(b"to-delete")).unwrap();
        assert!(store.exists(&id).unwrap());
        assert!(store.delete(&id).unwrap());
        assert!(!store.exists(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn read_count_tracks_reads() {
        let store = InMemoryObjectStore::new();
        let tree = Tree::new(vec![TreeEntry::new(
            EntryMode::Regular,
            "a",
            Blob::new(b"a".to_vec()).id(),
        )]);
        let id = store.write(&tree.to_stored_object().unwrap()).unwrap();
        assert_eq!(store.read_count(), 0);
        store.read_tree(&id).unwrap();
        store.exists(&id).unwrap();
        assert_eq!(store.read_count(), 1);
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let id = store.write(&make_blob(b"shared data")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let obj = store.read(&id).unwrap().unwrap();
                    assert_eq!(obj.compute_id(), id);
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.read_count(), 8);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.write(&make_blob(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("object_count: 1"));
    }
}
