//! Reference management for docvc.
//!
//! References are the mutable part of a repository: the name of the checked
//! out branch, the head commit of every branch, and an optional detached head
//! that takes precedence over the branch while it exists.
//!
//! # Layout
//!
//! Refs live in an explicit-key [`Store`](docvc_store::Store) under three
//! keys, each rewritten as a whole value on every update:
//!
//! - `branch` -- `{ "value": <branch name> }`
//! - `heads` -- `{ <branch name>: <commit hash>, ... }` in creation order
//! - `detached` -- `{ "head": <commit hash> }`, present only while detached
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`Head`] and the serialized ref records
//! - [`names`] -- Branch name validation
//! - [`store`] -- [`RefStore`], the ref operations over a `Store`

pub mod error;
pub mod names;
pub mod store;
pub mod types;

pub use error::{RefError, RefResult};
pub use names::validate_branch_name;
pub use store::{RefStore, BRANCH_KEY, DEFAULT_BRANCH, DETACHED_KEY, HEADS_KEY};
pub use types::{BranchRecord, DetachedRecord, Head};
