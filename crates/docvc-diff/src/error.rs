//! Error types for the diff crate.

/// Errors that can occur while reading a patch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The `op` field names an operation other than add, remove or replace.
    #[error("unsupported operation {0}")]
    UnsupportedOperation(String),

    /// The patch or one of its operations does not have the expected shape.
    #[error("malformed patch: {0}")]
    Malformed(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
