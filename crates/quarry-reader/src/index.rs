//! Reading staged content from the index.

use quarry_index::{Index, Stage};
use quarry_repo::Repository;
use quarry_store::ObjectStore;
use quarry_types::ObjectId;
use tracing::trace;

use crate::error::{ReaderError, ReaderResult};
use crate::reader::{replace_contents, ContentReader, ReaderBackend};

/// Reads the unconflicted (stage 0) content of paths in a staging index.
///
/// A path that only has conflict stages reads as not found.
pub struct IndexReader<'a> {
    store: &'a dyn ObjectStore,
    index: &'a Index,
}

impl<'a> IndexReader<'a> {
    /// Read from `index`, or from the repository's current index when
    /// `None`.
    pub fn new(repo: &'a Repository, index: Option<&'a Index>) -> Self {
        Self::with_store(repo.store(), index.unwrap_or_else(|| repo.index()))
    }

    pub fn with_store(store: &'a dyn ObjectStore, index: &'a Index) -> Self {
        Self { store, index }
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }
}

impl ContentReader for IndexReader<'_> {
    fn backend(&self) -> ReaderBackend {
        ReaderBackend::Index
    }

    fn read(
        &self,
        path: &str,
        out: &mut Vec<u8>,
        id_out: Option<&mut ObjectId>,
    ) -> ReaderResult<()> {
        let entry = self
            .index
            .get_by_path(path, Stage::Normal)
            .ok_or_else(|| ReaderError::not_found(path))?;

        let blob = self.store.read_blob(&entry.object_id)?;
        replace_contents(out, blob.as_bytes())?;
        trace!(path, id = %entry.object_id.short_hex(), "resolved in index");

        if let Some(id) = id_out {
            *id = entry.object_id;
        }
        Ok(())
    }
}
