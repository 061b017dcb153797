//! Entry storage for docvc.
//!
//! [`Store`] is an in-memory key/value map of JSON entries that serves two
//! roles: a content-addressed blob store (commits and trees, keyed by the
//! hash of their content) and an explicit-key store (refs, keyed by name).
//! [`CompressedStore`] layers delta compression on top of a content-addressed
//! store: subtrees identical to those of a designated parent entry are
//! replaced by reference tokens on write and restored on read.
//!
//! # Design Rules
//!
//! 1. Reads always return an independent copy; stored entries are never
//!    handed out by reference.
//! 2. Write notifications are delivered synchronously, in registration order,
//!    after the entry is stored and before `write` returns.
//! 3. Keys are listed in insertion order.
//! 4. Compression never changes the logical value returned by a read.
//! 5. Expansion memoization lives only for the duration of one `read`.

pub mod compress;
pub mod compressed;
pub mod error;
pub mod listeners;
pub mod memory;

pub use compress::{
    compress, find_similar_paths, parse_reference_token, reference_targets, reference_token,
    REFERENCE_PREFIX,
};
pub use compressed::{expand, CompressedStore};
pub use error::{StoreError, StoreResult};
pub use listeners::{ListenerRegistry, SubscriptionId};
pub use memory::Store;
