//! Error types for the merge engine.

use docvc_types::Hash;

/// Errors that can occur while searching history or building a merge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A commit reached while walking history does not exist.
    #[error("commit not found: {0}")]
    CommitNotFound(Hash),

    /// The two heads share no ancestor.
    #[error("no common ancestor between {left} and {right}")]
    NoCommonAncestor { left: Hash, right: Hash },

    /// Following parents from a commit led back to it.
    #[error("corrupt history: parent cycle through {0}")]
    CorruptHistory(Hash),

    /// A stored commit could not be read as a commit.
    #[error("malformed commit {hash}: {reason}")]
    MalformedCommit { hash: Hash, reason: String },
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
