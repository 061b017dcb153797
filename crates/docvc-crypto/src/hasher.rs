use docvc_types::Hash;
use serde_json::Value;

use crate::canonical::canonical_bytes;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is hashed ahead of the content, so a tree and a commit
/// with identical JSON never share a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for document trees.
    pub const TREE: Self = Self {
        domain: "docvc-tree-v1",
    };
    /// Hasher for commit records.
    pub const COMMIT: Self = Self {
        domain: "docvc-commit-v1",
    };
    /// Hasher for untyped entries.
    pub const ENTRY: Self = Self {
        domain: "docvc-entry-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Hash::from_digest(*hasher.finalize().as_bytes())
    }

    /// Hash the canonical serialization of a JSON value.
    pub fn hash_json(&self, value: &Value) -> Hash {
        self.hash(&canonical_bytes(value))
    }

    /// Verify that a value produces the expected hash.
    pub fn verify(&self, value: &Value, expected: &Hash) -> bool {
        self.hash_json(value) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::ENTRY
    }
}
