//! Exported repository state.

use docvc_refs::{BRANCH_KEY, DEFAULT_BRANCH, HEADS_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RepoError, RepoResult};

/// Everything a repository holds: refs, commits and (compressed) trees.
///
/// Missing sections deserialize as empty maps so that a partial document
/// can still be checked with [`Snapshot::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub refs: Map<String, Value>,
    pub commits: Map<String, Value>,
    pub trees: Map<String, Value>,
}

impl Snapshot {
    pub fn from_value(value: Value) -> RepoResult<Self> {
        serde_json::from_value(value).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn to_value(&self) -> RepoResult<Value> {
        serde_json::to_value(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    /// Check that the snapshot can seed a repository.
    ///
    /// `refs`, `commits` and `trees` must be non-empty, `refs.branch` and
    /// `refs.heads` must exist, and `heads` must hold both `master` and the
    /// branch named by `refs.branch.value`.
    pub fn validate(&self) -> RepoResult<()> {
        let invalid =
            |reason: &str| Err(RepoError::Validation(format!("invalid snapshot: {reason}")));

        let sections = [
            ("refs", &self.refs),
            ("commits", &self.commits),
            ("trees", &self.trees),
        ];
        for (name, section) in sections {
            if section.is_empty() {
                return invalid(&format!("{name} is empty"));
            }
        }

        let Some(branch) = self.refs.get(BRANCH_KEY) else {
            return invalid("refs.branch is missing");
        };
        let Some(heads) = self.refs.get(HEADS_KEY).and_then(Value::as_object) else {
            return invalid("refs.heads is missing");
        };
        if !is_present(heads.get(DEFAULT_BRANCH)) {
            return invalid("refs.heads.master is missing");
        }
        let Some(current) = branch.get("value").and_then(Value::as_str) else {
            return invalid("refs.branch.value is missing");
        };
        if !is_present(heads.get(current)) {
            return invalid(&format!("refs.heads.{current} is missing"));
        }

        Ok(())
    }
}

fn is_present(head: Option<&Value>) -> bool {
    head.and_then(Value::as_str).is_some_and(|hash| !hash.is_empty())
}
