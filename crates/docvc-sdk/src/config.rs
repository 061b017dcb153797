use serde::{Deserialize, Serialize};

use crate::error::RepoResult;

/// Tunables of a [`Repository`](crate::Repository).
///
/// ```toml
/// compress_trees = true
/// validate_branch_names = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Store each new tree delta-compressed against the tree at head.
    pub compress_trees: bool,
    /// Reject git-style invalid names when creating branches.
    pub validate_branch_names: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            compress_trees: true,
            validate_branch_names: true,
        }
    }
}

impl RepositoryConfig {
    /// Parse a TOML document. Missing keys keep their default.
    pub fn from_toml_str(input: &str) -> RepoResult<Self> {
        Ok(toml::from_str(input)?)
    }
}
