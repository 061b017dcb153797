//! Merge engine for docvc.
//!
//! Finds the reference commit two heads are merged against and reconciles
//! the two patches leading away from it into a single patch.
//!
//! # Key Types
//!
//! - [`CommitGraph`] -- Parent lookup over stored commits
//! - [`find_merge_base`] -- Oldest commit shared by two ancestor chains
//! - [`build_merge_patch`] -- Target-side operations that survive conflict review

pub mod base;
pub mod error;
pub mod patch;

pub use base::{ancestry, find_merge_base, CommitGraph};
pub use error::{MergeError, MergeResult};
pub use patch::build_merge_patch;
