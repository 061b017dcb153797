//! Content hashing for docvc.
//!
//! Provides domain-separated BLAKE3 hashing over the canonical serialization
//! of JSON values. Canonical means object keys sorted and no insignificant
//! whitespace, so two documents that compare equal always hash equal.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod canonical;
pub mod hasher;

pub use canonical::{canonical_bytes, canonicalize};
pub use hasher::ContentHasher;
