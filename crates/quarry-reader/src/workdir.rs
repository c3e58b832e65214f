//! Reading working-directory files in canonical (to-storage) form.

use std::path::{Component, Path};

use quarry_crypto::ContentHasher;
use quarry_filter::Direction;
use quarry_index::{Index, Stage};
use quarry_repo::Repository;
use quarry_types::ObjectId;
use tracing::{debug, trace};

use crate::error::{ReaderError, ReaderResult};
use crate::reader::{replace_contents, ContentReader, ReaderBackend};

/// When the workdir reader hashes content it has read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Hash only when the caller asks for the id or the read is verified
    /// against the index.
    #[default]
    WhenNeeded,
    /// Hash every read and log the id. Content and returned id are the same
    /// as with `WhenNeeded`; only the log output differs.
    Always,
}

/// Reads files from the working directory through the repository's
/// to-storage filters, optionally checking the result against the index.
///
/// The bytes returned are what staging the file would store, so their id is
/// directly comparable with index and tree ids.
pub struct WorkdirReader<'a> {
    repo: &'a Repository,
    root: &'a Path,
    index: Option<&'a Index>,
    policy: IdentityPolicy,
}

impl<'a> WorkdirReader<'a> {
    /// Create a reader over `repo`'s working directory.
    ///
    /// With `validate_index` set, every read must match the stage-0 entry of
    /// the repository's current index or fail with
    /// [`ReaderError::Mismatch`].
    pub fn new(repo: &'a Repository, validate_index: bool) -> ReaderResult<Self> {
        let root = repo.workdir().ok_or(ReaderError::BareRepository)?;
        Ok(Self {
            repo,
            root,
            index: validate_index.then(|| repo.index()),
            policy: IdentityPolicy::default(),
        })
    }

    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn identity_policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Returns `true` if reads are verified against the index.
    pub fn verifies_index(&self) -> bool {
        self.index.is_some()
    }

    fn verify(&self, index: &Index, path: &str, actual: ObjectId) -> ReaderResult<()> {
        let expected = index.get_by_path(path, Stage::Normal).map(|e| e.object_id);
        if expected == Some(actual) {
            return Ok(());
        }
        debug!(
            path,
            actual = %actual.short_hex(),
            staged = expected.is_some(),
            "working tree content differs from index"
        );
        Err(ReaderError::Mismatch {
            path: path.to_string(),
            expected,
            actual,
        })
    }
}

impl ContentReader for WorkdirReader<'_> {
    fn backend(&self) -> ReaderBackend {
        ReaderBackend::Workdir
    }

    fn read(
        &self,
        path: &str,
        out: &mut Vec<u8>,
        id_out: Option<&mut ObjectId>,
    ) -> ReaderResult<()> {
        if !is_relative_inside(path) {
            return Err(ReaderError::InvalidPath(path.to_string()));
        }
        let file = self.root.join(path);

        let filters = self.repo.filter_list(path, Direction::ToStore)?;
        let content = filters.apply_to_file(&file)?;

        let needs_id =
            id_out.is_some() || self.index.is_some() || self.policy == IdentityPolicy::Always;
        let id = needs_id.then(|| ContentHasher::BLOB.hash(&content));

        if let (Some(index), Some(actual)) = (self.index, id) {
            self.verify(index, path, actual)?;
        }

        replace_contents(out, &content)?;
        match id {
            Some(id) => trace!(path, id = %id.short_hex(), len = content.len(), "read from working tree"),
            None => trace!(path, len = content.len(), "read from working tree"),
        }

        if let (Some(slot), Some(id)) = (id_out, id) {
            *slot = id;
        }
        Ok(())
    }
}

/// Only plain relative paths below the working directory root are readable.
fn is_relative_inside(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
