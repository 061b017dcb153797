//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// No branch has this name.
    #[error("branch {name} doesn't exist")]
    NotFound { name: String },

    /// A branch with this name already exists.
    #[error("branch {name} already exists")]
    AlreadyExists { name: String },

    /// The branch name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// The checked out position is a commit, not a branch.
    #[error("detached mode on {head}")]
    DetachedHead { head: String },

    /// Cannot delete the currently checked-out branch.
    #[error("cannot delete current branch: {name}")]
    DeleteCurrentBranch { name: String },

    /// Cannot delete the default branch.
    #[error("cannot delete the {name} branch")]
    DeleteDefaultBranch { name: String },

    /// A stored ref record does not have the expected shape.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] docvc_store::StoreError),
}

/// Convenience type alias for ref operations.
pub type RefResult<T> = std::result::Result<T, RefError>;
