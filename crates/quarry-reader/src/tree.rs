//! Reading committed content from a tree snapshot.

use quarry_repo::Repository;
use quarry_store::{ObjectStore, Tree};
use quarry_types::ObjectId;
use tracing::trace;

use crate::error::{ReaderError, ReaderResult};
use crate::reader::{replace_contents, ContentReader, ReaderBackend};

/// Reads blobs out of a tree and its subtrees.
///
/// Content comes back exactly as stored: no filters run and nothing is
/// verified.
pub struct TreeReader<'a> {
    store: &'a dyn ObjectStore,
    tree: &'a Tree,
}

impl<'a> TreeReader<'a> {
    pub fn new(repo: &'a Repository, tree: &'a Tree) -> Self {
        Self::with_store(repo.store(), tree)
    }

    /// Read from `tree` using objects in `store`.
    pub fn with_store(store: &'a dyn ObjectStore, tree: &'a Tree) -> Self {
        Self { store, tree }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }
}

impl ContentReader for TreeReader<'_> {
    fn backend(&self) -> ReaderBackend {
        ReaderBackend::Tree
    }

    fn read(
        &self,
        path: &str,
        out: &mut Vec<u8>,
        id_out: Option<&mut ObjectId>,
    ) -> ReaderResult<()> {
        // Directories are not readable content.
        let entry = self
            .tree
            .entry_by_path(self.store, path)?
            .filter(|entry| entry.mode.is_blob())
            .ok_or_else(|| ReaderError::not_found(path))?;

        let blob = self.store.read_blob(&entry.object_id)?;
        replace_contents(out, blob.as_bytes())?;
        trace!(path, id = %entry.object_id.short_hex(), "resolved in tree");

        if let Some(id) = id_out {
            *id = entry.object_id;
        }
        Ok(())
    }
}
