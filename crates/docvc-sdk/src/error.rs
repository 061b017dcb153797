use docvc_diff::DiffError;
use docvc_merge::MergeError;
use docvc_refs::RefError;
use docvc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// A caller-supplied argument is invalid.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The committed tree equals the tree at head.
    #[error("No changes to commit")]
    NoOp,

    /// The operation is not allowed in the current repository state.
    #[error("{0}")]
    StateConflict(String),

    #[error("Unsupported operation {0}")]
    UnsupportedOperation(String),

    /// Stored data could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored data is internally inconsistent.
    #[error("corrupt repository: {0}")]
    Corrupt(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => RepoError::NotFound(err.to_string()),
            StoreError::DanglingReference { .. } | StoreError::CyclicReference(_) => {
                RepoError::Corrupt(err.to_string())
            }
        }
    }
}

impl From<RefError> for RepoError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::NotFound { .. } => RepoError::NotFound(err.to_string()),
            RefError::InvalidBranchName { .. } => RepoError::Validation(err.to_string()),
            RefError::AlreadyExists { .. }
            | RefError::DetachedHead { .. }
            | RefError::DeleteCurrentBranch { .. }
            | RefError::DeleteDefaultBranch { .. } => RepoError::StateConflict(err.to_string()),
            RefError::Serialization(reason) => RepoError::Serialization(reason),
            RefError::Store(store) => store.into(),
        }
    }
}

impl From<MergeError> for RepoError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::CommitNotFound(_) | MergeError::NoCommonAncestor { .. } => {
                RepoError::NotFound(err.to_string())
            }
            MergeError::CorruptHistory(_) => RepoError::Corrupt(err.to_string()),
            MergeError::MalformedCommit { .. } => RepoError::Serialization(err.to_string()),
        }
    }
}

impl From<DiffError> for RepoError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::UnsupportedOperation(op) => RepoError::UnsupportedOperation(op),
            DiffError::Malformed(reason) => RepoError::Validation(reason),
        }
    }
}

impl From<toml::de::Error> for RepoError {
    fn from(err: toml::de::Error) -> Self {
        RepoError::Config(err.to_string())
    }
}
