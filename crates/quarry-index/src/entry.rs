//! Index entry types.

use quarry_store::EntryMode;
use quarry_types::ObjectId;

/// Merge stage of an index entry.
///
/// Stage 0 holds the normal, unconflicted entry. Stages 1-3 exist only while
/// a merge conflict on the path is unresolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Normal = 0,
    Ancestor = 1,
    Ours = 2,
    Theirs = 3,
}

impl Stage {
    pub const CONFLICT: [Stage; 3] = [Stage::Ancestor, Stage::Ours, Stage::Theirs];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::Ancestor),
            2 => Some(Self::Ours),
            3 => Some(Self::Theirs),
            _ => None,
        }
    }

    pub fn is_conflict(self) -> bool {
        self != Self::Normal
    }
}

/// A tracked path at one stage of the staging index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Relative, slash-separated path from the workdir root.
    pub path: String,
    pub stage: Stage,
    /// Identity of the staged blob, in canonical (post-clean-filter) form.
    pub object_id: ObjectId,
    pub mode: EntryMode,
    /// Size of the staged blob in bytes.
    pub size: u64,
}

impl IndexEntry {
    /// Create an unconflicted entry.
    pub fn new(path: impl Into<String>, object_id: ObjectId, mode: EntryMode, size: u64) -> Self {
        Self::at_stage(path, Stage::Normal, object_id, mode, size)
    }

    pub fn at_stage(
        path: impl Into<String>,
        stage: Stage,
        object_id: ObjectId,
        mode: EntryMode,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            stage,
            object_id,
            mode,
            size,
        }
    }
}
