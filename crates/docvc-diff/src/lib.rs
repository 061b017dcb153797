//! Structural diff and patch engine for docvc documents.
//!
//! A [`Patch`] is an ordered list of [`PatchOperation`]s (`add`, `remove`,
//! `replace`) addressed by [`Path`](docvc_types::Path). [`diff`] computes the
//! patch turning one document into another; [`apply_patch`] replays a patch
//! onto a copy of a document, optionally asking a resolver to accept or reject
//! conflicting operations.
//!
//! # Key Types
//!
//! - [`Patch`] / [`PatchOperation`] -- Ordered operation list and its entries
//! - [`OpKind`] -- Operation kind, ordered `add < remove < replace`
//! - [`Decision`] -- Resolver verdict for a conflicting operation

pub mod apply;
pub mod diff;
pub mod error;
pub mod patch;

pub use apply::{apply_patch, Decision};
pub use diff::diff;
pub use error::{DiffError, DiffResult};
pub use patch::{OpKind, Patch, PatchOperation};
