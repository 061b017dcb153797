//! Foundation types for docvc.
//!
//! This crate provides the identifiers and structural helpers shared by every
//! other docvc crate: content hashes, document paths, and the recursive tree
//! walker used by diffing and delta compression.
//!
//! # Key Types
//!
//! - [`Hash`]: Hex digest naming a stored entry, with the [`EMPTY_HASH`] sentinel
//! - [`Path`]: Ordered list of segments addressing a node inside a document
//! - [`NodeKind`]: Container/scalar classification of a JSON value
//!
//! Documents themselves are plain [`serde_json::Value`]s: objects and arrays
//! are containers, every other value (including `null`) is a scalar leaf.

pub mod error;
pub mod hash;
pub mod path;
pub mod tree;

pub use error::TypeError;
pub use hash::{Hash, EMPTY_HASH, HASH_HEX_LEN};
pub use path::Path;
pub use tree::{
    get_path, get_path_mut, has_path, kind, parse_index, set_path, walk_tree, NodeKind,
};
