//! Core reference types.

use docvc_types::Hash;
use serde::{Deserialize, Serialize};

/// The checked out position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// A branch, by name.
    Branch(String),
    /// A commit checked out directly.
    Detached(Hash),
}

impl Head {
    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }
}

/// Stored form of the `branch` ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub value: String,
}

/// Stored form of the `detached` ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedRecord {
    pub head: Hash,
}
