use quarry_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (`"quarry-blob-v1"`, `"quarry-tree-v1"`)
/// that is fed to BLAKE3 ahead of the content. Hashing is deterministic and
/// depends only on the domain and the bytes, so two stores holding the same
/// content always agree on its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for file content.
    pub const BLOB: Self = Self {
        domain: "quarry-blob-v1",
    };
    /// Hasher for directory listings.
    pub const TREE: Self = Self {
        domain: "quarry-tree-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes under this hasher's domain.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = self.start();
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Returns `true` if `data` hashes to `expected` under this domain.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}
