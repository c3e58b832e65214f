//! The core Index structure managing staged entries in memory.
//!
//! The [`Index`] keeps a `BTreeMap<(path, stage), IndexEntry>`. All
//! operations are in-memory; the object store is only touched to write
//! staged blobs and to convert to and from trees.

use std::collections::BTreeMap;
use std::sync::Arc;

use quarry_store::{Blob, EntryMode, ObjectStore, TreeBuilder};
use quarry_types::ObjectId;
use tracing::debug;

use crate::entry::{IndexEntry, Stage};
use crate::error::{IndexError, IndexResult};

/// The staging index: what the next commit will contain.
pub struct Index {
    entries: BTreeMap<(String, Stage), IndexEntry>,
    /// Tree id of the current stage-0 state, invalidated on every change.
    pub tree_cache: Option<ObjectId>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("entries", &self.entries.len())
            .field("tree_cache", &self.tree_cache)
            .finish()
    }
}

impl Index {
    /// Create a new empty index backed by the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            entries: BTreeMap::new(),
            tree_cache: None,
            store,
        }
    }

    /// Number of entries across all stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The store blobs referenced by this index live in.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Get the unconflicted entry for `path`.
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.get_by_path(path, Stage::Normal)
    }

    /// Get the entry for `path` at a specific stage.
    pub fn get_by_path(&self, path: &str, stage: Stage) -> Option<&IndexEntry> {
        self.entries.get(&(path.to_string(), stage))
    }

    /// Iterate over all entries in path, then stage order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    // ---------------------------------------------------------------
    // Stage operations
    // ---------------------------------------------------------------

    /// Stage `content` at `path`.
    ///
    /// The content must already be in canonical form; the index stores it
    /// verbatim. Any pending conflict stages for the path are dropped.
    pub fn stage_file(
        &mut self,
        path: &str,
        content: &[u8],
        mode: EntryMode,
    ) -> IndexResult<ObjectId> {
        validate_path(path)?;
        let object_id = self
            .store
            .write(&Blob::new(content.to_vec()).to_stored_object())?;
        self.insert_normal(IndexEntry::new(path, object_id, mode, content.len() as u64));
        Ok(object_id)
    }

    /// Stage an object that is already in the store.
    pub fn stage_object(
        &mut self,
        path: &str,
        object_id: ObjectId,
        mode: EntryMode,
        size: u64,
    ) -> IndexResult<()> {
        validate_path(path)?;
        self.insert_normal(IndexEntry::new(path, object_id, mode, size));
        Ok(())
    }

    /// Remove `path` at every stage, returning the removed entries.
    pub fn remove(&mut self, path: &str) -> IndexResult<Vec<IndexEntry>> {
        let removed: Vec<IndexEntry> = stage_keys(path)
            .filter_map(|key| self.entries.remove(&key))
            .collect();
        if removed.is_empty() {
            return Err(IndexError::PathNotFound(path.to_string()));
        }
        self.tree_cache = None;
        Ok(removed)
    }

    fn insert_normal(&mut self, entry: IndexEntry) {
        for stage in Stage::CONFLICT {
            self.entries.remove(&(entry.path.clone(), stage));
        }
        debug!(path = %entry.path, id = %entry.object_id.short_hex(), "staged");
        self.entries
            .insert((entry.path.clone(), Stage::Normal), entry);
        self.tree_cache = None;
    }

    // ---------------------------------------------------------------
    // Conflict management
    // ---------------------------------------------------------------

    /// Record a merge conflict on `path`.
    ///
    /// The stage-0 entry is removed and each present side is written at its
    /// conflict stage.
    pub fn add_conflict(
        &mut self,
        path: &str,
        ancestor: Option<ObjectId>,
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    ) -> IndexResult<()> {
        validate_path(path)?;
        if ancestor.is_none() && ours.is_none() && theirs.is_none() {
            return Err(IndexError::EmptyConflict(path.to_string()));
        }

        for key in stage_keys(path) {
            self.entries.remove(&key);
        }
        for (stage, side) in Stage::CONFLICT.into_iter().zip([ancestor, ours, theirs]) {
            if let Some(id) = side {
                self.entries.insert(
                    (path.to_string(), stage),
                    IndexEntry::at_stage(path, stage, id, EntryMode::Regular, 0),
                );
            }
        }
        debug!(path, "conflict recorded");
        self.tree_cache = None;
        Ok(())
    }

    /// Resolve a conflict on `path` by staging `object_id` at stage 0.
    pub fn resolve_conflict(
        &mut self,
        path: &str,
        object_id: ObjectId,
        mode: EntryMode,
        size: u64,
    ) -> IndexResult<()> {
        let conflicted = Stage::CONFLICT
            .iter()
            .any(|s| self.get_by_path(path, *s).is_some());
        if !conflicted {
            return Err(IndexError::NoConflict(path.to_string()));
        }

        self.insert_normal(IndexEntry::new(path, object_id, mode, size));
        Ok(())
    }

    /// Returns `true` if any path has conflict stages.
    pub fn has_conflicts(&self) -> bool {
        self.entries.keys().any(|(_, stage)| stage.is_conflict())
    }

    /// Paths with unresolved conflicts, sorted and deduplicated.
    pub fn conflict_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries
            .keys()
            .filter(|(_, stage)| stage.is_conflict())
            .map(|(path, _)| path.clone())
            .collect();
        paths.dedup();
        paths
    }

    // ---------------------------------------------------------------
    // Tree conversion
    // ---------------------------------------------------------------

    /// Write all stage-0 entries as nested trees and return the root id.
    pub fn write_tree(&mut self) -> IndexResult<ObjectId> {
        if self.has_conflicts() {
            return Err(IndexError::UnresolvedConflict(self.conflict_paths().join(", ")));
        }

        let mut builder = TreeBuilder::new();
        for entry in self.entries.values() {
            builder.insert(&entry.path, entry.mode, entry.object_id);
        }
        let tree_id = builder.write(self.store.as_ref())?;

        self.tree_cache = Some(tree_id);
        Ok(tree_id)
    }

    /// Replace the index contents with the blobs of an existing tree.
    pub fn read_tree(&mut self, tree_id: &ObjectId) -> IndexResult<()> {
        let stored = self
            .store
            .read(tree_id)?
            .ok_or(IndexError::ObjectNotFound(*tree_id))?;
        let tree = quarry_store::Tree::from_stored_object(&stored)?;

        let mut entries = BTreeMap::new();
        for (path, te) in tree.flatten(self.store.as_ref())? {
            let size = self
                .store
                .read(&te.object_id)?
                .map(|obj| obj.size)
                .ok_or(IndexError::ObjectNotFound(te.object_id))?;
            entries.insert(
                (path.clone(), Stage::Normal),
                IndexEntry::new(path, te.object_id, te.mode, size),
            );
        }

        self.entries = entries;
        self.tree_cache = Some(*tree_id);
        Ok(())
    }
}

fn stage_keys(path: &str) -> impl Iterator<Item = (String, Stage)> {
    let path = path.to_string();
    [Stage::Normal, Stage::Ancestor, Stage::Ours, Stage::Theirs]
        .into_iter()
        .map(move |stage| (path.clone(), stage))
}

fn validate_path(path: &str) -> IndexResult<()> {
    let bad = path.is_empty()
        || path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(IndexError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_crypto::ContentHasher;
    use quarry_store::InMemoryObjectStore;

    fn make_store() -> Arc<dyn ObjectStore> {
        Arc::new(InMemoryObjectStore::new())
    }

    fn make_index() -> Index {
        Index::new(make_store())
    }

    fn id(data: &[u8]) -> ObjectId {
        ContentHasher::BLOB.hash(data)
    }

    #[test]
    fn new_index_is_empty() {
        let idx = make_index();
        assert!(idx.is_empty());
        assert!(!idx.has_conflicts());
        assert!(idx.get("anything").is_none());
    }

    #[test]
    fn stage_file_stores_blob_and_entry() {
        let mut idx = make_index();
        let oid = idx
            .stage_file("hello.txt", b"hello world", EntryMode::Regular)
            .unwrap();

        let entry = idx.get("hello.txt").unwrap();
        assert_eq!(entry.object_id, oid);
        assert_eq!(oid, id(b"hello world"));
        assert_eq!(entry.size, 11);
        assert_eq!(
            idx.store().read_blob(&oid).unwrap().as_bytes(),
            b"hello world"
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        let mut idx = make_index();
        for path in ["", "/abs", "a//b", "a/../b", "./a", "dir/"] {
            let result = idx.stage_file(path, b"data", EntryMode::Regular);
            assert!(
                matches!(result, Err(IndexError::InvalidPath(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn restaging_replaces_entry() {
        let mut idx = make_index();
        idx.stage_file("f.txt", b"v1", EntryMode::Regular).unwrap();
        idx.stage_file("f.txt", b"v2", EntryMode::Regular).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("f.txt").unwrap().object_id, id(b"v2"));
    }

    #[test]
    fn remove_drops_all_stages() {
        let mut idx = make_index();
        idx.add_conflict("c.txt", Some(id(b"base")), Some(id(b"ours")), None)
            .unwrap();
        let removed = idx.remove("c.txt").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(idx.is_empty());
        assert!(matches!(idx.remove("c.txt"), Err(IndexError::PathNotFound(_))));
    }

    #[test]
    fn conflict_hides_stage_zero() {
        let mut idx = make_index();
        idx.stage_file("conflict.txt", b"ours", EntryMode::Regular)
            .unwrap();
        idx.add_conflict(
            "conflict.txt",
            Some(id(b"base")),
            Some(id(b"ours")),
            Some(id(b"theirs")),
        )
        .unwrap();

        assert!(idx.get("conflict.txt").is_none());
        assert_eq!(
            idx.get_by_path("conflict.txt", Stage::Theirs)
                .unwrap()
                .object_id,
            id(b"theirs")
        );
        assert!(idx.has_conflicts());
        assert_eq!(idx.conflict_paths(), vec!["conflict.txt".to_string()]);
    }

    #[test]
    fn resolve_conflict_restores_stage_zero() {
        let mut idx = make_index();
        idx.add_conflict("c.txt", None, Some(id(b"ours")), Some(id(b"theirs")))
            .unwrap();
        idx.resolve_conflict("c.txt", id(b"merged"), EntryMode::Regular, 6)
            .unwrap();

        assert!(!idx.has_conflicts());
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("c.txt").unwrap().object_id, id(b"merged"));
    }

    #[test]
    fn resolve_without_conflict_errors() {
        let mut idx = make_index();
        idx.stage_file("f.txt", b"x", EntryMode::Regular).unwrap();
        let result = idx.resolve_conflict("f.txt", id(b"y"), EntryMode::Regular, 1);
        assert!(matches!(result, Err(IndexError::NoConflict(_))));
    }

    #[test]
    fn empty_conflict_rejected() {
        let mut idx = make_index();
        let result = idx.add_conflict("f.txt", None, None, None);
        assert!(matches!(result, Err(IndexError::EmptyConflict(_))));
    }

    #[test]
    fn write_tree_fails_with_conflicts() {
        let mut idx = make_index();
        idx.add_conflict("f.txt", None, Some(id(b"o")), None).unwrap();
        assert!(matches!(
            idx.write_tree(),
            Err(IndexError::UnresolvedConflict(_))
        ));
    }

    #[test]
    fn write_tree_and_read_tree_roundtrip_nested_paths() {
        let store = make_store();
        let mut idx = Index::new(Arc::clone(&store));
        idx.stage_file("docs/guide/intro.md", b"intro", EntryMode::Regular)
            .unwrap();
        idx.stage_file("run.sh", b"#!/bin/sh", EntryMode::Executable)
            .unwrap();

        let tree_id = idx.write_tree().unwrap();
        assert_eq!(idx.tree_cache, Some(tree_id));

        let root = store.read_tree(&tree_id).unwrap();
        assert_eq!(root.get("docs").unwrap().mode, EntryMode::Directory);

        let mut idx2 = Index::new(Arc::clone(&store));
        idx2.read_tree(&tree_id).unwrap();
        let intro = idx2.get("docs/guide/intro.md").unwrap();
        assert_eq!(intro.object_id, id(b"intro"));
        assert_eq!(intro.size, 5);
        assert_eq!(idx2.get("run.sh").unwrap().mode, EntryMode::Executable);
    }

    #[test]
    fn read_tree_of_unknown_id() {
        let mut idx = make_index();
        let missing = ContentHasher::TREE.hash(b"missing");
        assert!(matches!(
            idx.read_tree(&missing),
            Err(IndexError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn read_tree_with_missing_blob_fails() {
        let store = make_store();
        let dangling = id(b"never written");
        let tree = quarry_store::Tree::new(vec![quarry_store::TreeEntry::new(
            EntryMode::Regular,
            "gone.txt",
            dangling,
        )]);
        let tree_id = store.write(&tree.to_stored_object().unwrap()).unwrap();

        let mut idx = Index::new(store);
        idx.stage_file("keep.txt", b"keep", EntryMode::Regular).unwrap();
        assert!(matches!(
            idx.read_tree(&tree_id),
            Err(IndexError::ObjectNotFound(missing)) if missing == dangling
        ));
        // A failed read leaves the previous entries in place.
        assert!(idx.get("keep.txt").is_some());
        assert!(idx.get("gone.txt").is_none());
    }

    #[test]
    fn tree_cache_invalidated_on_changes() {
        let mut idx = make_index();
        idx.stage_file("a.txt", b"aaa", EntryMode::Regular).unwrap();
        idx.write_tree().unwrap();
        assert!(idx.tree_cache.is_some());

        idx.stage_object("b.txt", id(b"bbb"), EntryMode::Regular, 3)
            .unwrap();
        assert!(idx.tree_cache.is_none());
    }
}
