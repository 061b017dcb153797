use chrono::{DateTime, SecondsFormat, Utc};
use docvc_types::Hash;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RepoError, RepoResult};

/// Immutable record linking a tree to its author, message, time and parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub author: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub date: String,
    pub message: String,
    pub tree_hash: Hash,
    /// [`EMPTY_HASH`](docvc_types::EMPTY_HASH) for a root commit.
    pub parent: Hash,
}

impl Commit {
    /// A commit dated now.
    pub fn new(
        author: impl Into<String>,
        message: impl Into<String>,
        tree_hash: Hash,
        parent: Hash,
    ) -> Self {
        Self {
            author: author.into(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: message.into(),
            tree_hash,
            parent,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_empty_hash()
    }

    /// The parsed `date`, if it is valid RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    pub fn to_value(&self) -> RepoResult<Value> {
        serde_json::to_value(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn from_value(hash: &str, value: Value) -> RepoResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| RepoError::Serialization(format!("commit {hash}: {e}")))
    }
}
