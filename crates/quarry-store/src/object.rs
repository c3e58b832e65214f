use serde::{Deserialize, Serialize};
use quarry_crypto::ContentHasher;
use quarry_types::ObjectId;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw file content.
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
}

impl ObjectKind {
    /// The hasher whose domain matches this kind.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data; it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The identity this blob is stored under.
    pub fn id(&self) -> ObjectId {
        ContentHasher::BLOB.hash(&self.data)
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl TryFrom<StoredObject> for Blob {
    type Error = StoreError;

    fn try_from(obj: StoredObject) -> StoreResult<Self> {
        expect_kind(&obj, ObjectKind::Blob)?;
        Ok(Self { data: obj.data })
    }
}

fn expect_kind(obj: &StoredObject, kind: ObjectKind) -> StoreResult<()> {
    if obj.kind != kind {
        return Err(StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: format!("expected {kind}, got {}", obj.kind),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Returns `true` for modes whose object is a blob.
    pub fn is_blob(&self) -> bool {
        !matches!(self, Self::Directory)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    /// A single path component; never contains `/`.
    pub name: String,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object (analogous to git tree).
///
/// A tree lists one directory level; deeper paths are reached through
/// [`EntryMode::Directory`] entries pointing at subtrees in the same store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Entries sorted by name for deterministic hashing.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Tree)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Resolve a slash-separated path through nested subtrees.
    ///
    /// Returns `Ok(None)` when any component is missing, when an intermediate
    /// component is not a directory, or when the path is empty or has empty
    /// components. Subtrees are loaded from `store`; a subtree id that is
    /// missing from the store is an error, not a miss.
    pub fn entry_by_path(
        &self,
        store: &dyn ObjectStore,
        path: &str,
    ) -> StoreResult<Option<TreeEntry>> {
        let mut components = path.split('/').peekable();
        let mut subtree: Option<Tree> = None;

        while let Some(name) = components.next() {
            if name.is_empty() {
                return Ok(None);
            }
            let current = subtree.as_ref().unwrap_or(self);
            let Some(entry) = current.get(name) else {
                return Ok(None);
            };
            if components.peek().is_none() {
                return Ok(Some(entry.clone()));
            }
            if entry.mode != EntryMode::Directory {
                return Ok(None);
            }
            trace!(subtree = %entry.object_id.short_hex(), name, "descending into subtree");
            subtree = Some(store.read_tree(&entry.object_id)?);
        }

        Ok(None)
    }

    /// Collect every blob entry below this tree, keyed by full path.
    pub fn flatten(&self, store: &dyn ObjectStore) -> StoreResult<Vec<(String, TreeEntry)>> {
        let mut out = Vec::new();
        self.flatten_into(store, "", &mut out)?;
        Ok(out)
    }

    fn flatten_into(
        &self,
        store: &dyn ObjectStore,
        prefix: &str,
        out: &mut Vec<(String, TreeEntry)>,
    ) -> StoreResult<()> {
        for entry in &self.entries {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };
            if entry.mode == EntryMode::Directory {
                store
                    .read_tree(&entry.object_id)?
                    .flatten_into(store, &path, out)?;
            } else {
                out.push((path, entry.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
