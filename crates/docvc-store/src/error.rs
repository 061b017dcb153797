use docvc_types::Path;

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entry is stored under the key.
    #[error("entry {0} not found")]
    NotFound(String),

    /// A reference token points at an entry that lacks the referenced path.
    #[error("entry {key} references {reference} at {path}, which does not exist there")]
    DanglingReference {
        key: String,
        reference: String,
        path: Path,
    },

    /// Expanding an entry led back to an entry already being expanded.
    #[error("cyclic reference while expanding entry {0}")]
    CyclicReference(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
