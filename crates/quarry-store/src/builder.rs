//! Builds nested trees from flat `path -> blob` listings.

use std::collections::BTreeMap;

use quarry_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{EntryMode, Tree, TreeEntry};
use crate::traits::ObjectStore;

#[derive(Debug, Default)]
enum Node {
    #[default]
    Dir,
    File(EntryMode, ObjectId),
}

/// Accumulates slash-separated paths and writes them as nested trees.
///
/// Later inserts for the same path replace earlier ones. A file inserted
/// where a directory already exists (or the reverse) replaces it.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    children: BTreeMap<String, (Node, TreeBuilder)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob at `path`. Empty path components are ignored.
    pub fn insert(&mut self, path: &str, mode: EntryMode, id: ObjectId) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };

        let mut dir = self;
        for part in parts {
            let slot = dir
                .children
                .entry(part.to_string())
                .or_insert_with(|| (Node::Dir, TreeBuilder::new()));
            if matches!(slot.0, Node::File(..)) {
                *slot = (Node::Dir, TreeBuilder::new());
            }
            dir = &mut slot.1;
        }
        dir.children
            .insert(file.to_string(), (Node::File(mode, id), TreeBuilder::new()));
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Write every subtree bottom-up and return the root tree's id.
    pub fn write(&self, store: &dyn ObjectStore) -> StoreResult<ObjectId> {
        let mut entries = Vec::with_capacity(self.children.len());
        for (name, (node, sub)) in &self.children {
            let entry = match node {
                Node::File(mode, id) => TreeEntry::new(*mode, name, *id),
                Node::Dir => TreeEntry::new(EntryMode::Directory, name, sub.write(store)?),
            };
            entries.push(entry);
        }
        store.write(&Tree::new(entries).to_stored_object()?)
    }
}
