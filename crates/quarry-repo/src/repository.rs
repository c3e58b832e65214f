use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use quarry_filter::{Direction, FilterList, FilterResult, Filters};
use quarry_index::Index;
use quarry_store::{Blob, EntryMode, InMemoryObjectStore, ObjectStore, Tree, TreeBuilder};
use quarry_types::ObjectId;
use tracing::{debug, info};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};

/// A Quarry repository: working directory, object store, current staging
/// index and configuration.
pub struct Repository {
    workdir: Option<PathBuf>,
    store: Arc<dyn ObjectStore>,
    index: Index,
    config: RepoConfig,
    filters: Filters,
}

impl Repository {
    /// Open a working directory, loading `.quarry/config.toml` if present.
    /// Objects are kept in memory.
    pub fn open(workdir: impl Into<PathBuf>) -> RepoResult<Self> {
        let workdir = workdir.into();
        let config = RepoConfig::load(&workdir.join(RepoConfig::PATH))?;
        Self::with_store(workdir, Arc::new(InMemoryObjectStore::new()), config)
    }

    /// Build a repository over an existing store.
    pub fn with_store(
        workdir: impl Into<PathBuf>,
        store: Arc<dyn ObjectStore>,
        config: RepoConfig,
    ) -> RepoResult<Self> {
        let workdir = workdir.into();
        info!(workdir = %workdir.display(), "repository opened");
        Self::build(Some(workdir), store, config)
    }

    /// A repository with no working directory.
    pub fn bare(store: Arc<dyn ObjectStore>, config: RepoConfig) -> RepoResult<Self> {
        Self::build(None, store, config)
    }

    fn build(
        workdir: Option<PathBuf>,
        store: Arc<dyn ObjectStore>,
        config: RepoConfig,
    ) -> RepoResult<Self> {
        let filters = Filters::new(config.filters.clone())?;
        Ok(Self {
            workdir,
            index: Index::new(Arc::clone(&store)),
            store,
            config,
            filters,
        })
    }

    // ---- Accessors ----

    /// Root of the working directory, or `None` for a bare repository.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    pub fn is_bare(&self) -> bool {
        self.workdir.is_none()
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// The repository's current staging index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Resolve a repository-relative path inside the working directory.
    ///
    /// Absolute paths and paths with `.` or `..` components are rejected.
    pub fn workdir_path(&self, path: &str) -> RepoResult<PathBuf> {
        let root = self.workdir.as_ref().ok_or(RepoError::Bare)?;
        let relative = !path.is_empty()
            && Path::new(path)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !relative {
            return Err(RepoError::OutsideWorkdir(path.to_string()));
        }
        Ok(root.join(path))
    }

    /// Load the filters that apply to `path` in `direction`.
    pub fn filter_list(&self, path: &str, direction: Direction) -> FilterResult<FilterList> {
        self.filters.load(path, direction)
    }

    // ---- Content operations ----

    pub fn write_blob(&self, data: &[u8]) -> RepoResult<ObjectId> {
        let id = self.store.write(&Blob::new(data.to_vec()).to_stored_object())?;
        Ok(id)
    }

    pub fn read_blob(&self, id: &ObjectId) -> RepoResult<Vec<u8>> {
        let obj = self
            .store
            .read(id)?
            .ok_or_else(|| RepoError::ObjectNotFound(id.to_hex()))?;
        Ok(Blob::try_from(obj)?.into_bytes())
    }

    /// Write blobs at slash-separated paths as a nested tree.
    pub fn write_tree<'p, I>(&self, files: I) -> RepoResult<ObjectId>
    where
        I: IntoIterator<Item = (&'p str, EntryMode, ObjectId)>,
    {
        let mut builder = TreeBuilder::new();
        for (path, mode, id) in files {
            builder.insert(path, mode, id);
        }
        Ok(builder.write(self.store.as_ref())?)
    }

    pub fn read_tree(&self, id: &ObjectId) -> RepoResult<Tree> {
        let obj = self
            .store
            .read(id)?
            .ok_or_else(|| RepoError::ObjectNotFound(id.to_hex()))?;
        Ok(Tree::from_stored_object(&obj)?)
    }

    /// Stage the working-directory file at `path` in canonical form.
    pub fn stage_path(&mut self, path: &str) -> RepoResult<ObjectId> {
        let file = self.workdir_path(path)?;
        let content = self
            .filter_list(path, Direction::ToStore)?
            .apply_to_file(&file)?;
        let id = self
            .index
            .stage_file(path, &content, EntryMode::Regular)?;
        debug!(path, id = %id.short_hex(), "staged from working directory");
        Ok(id)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .field("index", &self.index)
            .finish()
    }
}
