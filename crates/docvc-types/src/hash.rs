use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of hex characters in a digest produced by docvc.
pub const HASH_HEX_LEN: usize = 64;

/// Sentinel hash meaning "no parent" or "no commit yet".
pub const EMPTY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Hex digest naming a stored entry.
///
/// Freshly computed hashes are always [`HASH_HEX_LEN`] lowercase hex
/// characters. Hashes loaded from a snapshot are taken verbatim, so the
/// unchecked [`Hash::new`] constructor accepts any string; use
/// [`Hash::parse`] when the input must be a well-formed digest.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash(String);

impl Hash {
    /// Wrap a string without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The [`EMPTY_HASH`] sentinel.
    pub fn empty() -> Self {
        Self(EMPTY_HASH.to_owned())
    }

    /// Returns `true` if this is the [`EMPTY_HASH`] sentinel.
    pub fn is_empty_hash(&self) -> bool {
        self.0 == EMPTY_HASH
    }

    /// Hex-encode a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse a well-formed digest string.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        if value.len() != HASH_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HASH_HEX_LEN,
                actual: value.len(),
            });
        }
        hex::decode(value).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for logs.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Hash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for Hash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Hash {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<Hash> for String {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl PartialEq<str> for Hash {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Hash {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
