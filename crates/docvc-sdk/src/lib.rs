//! High-level SDK for docvc.
//!
//! [`Repository`] is the entry point for applications embedding docvc: it
//! composes the commit store, the delta-compressed tree store and the refs
//! into commit, checkout, diff, merge and revert operations over JSON
//! documents, and exports its whole state as a [`Snapshot`].
//!
//! ```
//! use docvc_sdk::Repository;
//! use serde_json::json;
//!
//! let repo = Repository::new();
//! let first = repo.commit("robin", "I commit", &json!({"foo": "bar"})).unwrap();
//! assert_eq!(repo.head().unwrap(), first);
//! assert_eq!(repo.tree().unwrap(), json!({"foo": "bar"}));
//! ```

pub mod commit;
pub mod config;
pub mod error;
pub mod events;
pub mod repository;
pub mod snapshot;

pub use commit::Commit;
pub use config::RepositoryConfig;
pub use error::{RepoError, RepoResult};
pub use events::HeadEvent;
pub use repository::Repository;
pub use snapshot::Snapshot;

// Re-export key types
pub use docvc_diff::{Decision, OpKind, Patch, PatchOperation};
pub use docvc_store::SubscriptionId;
pub use docvc_types::{Hash, Path, EMPTY_HASH};
