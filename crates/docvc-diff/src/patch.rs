//! Patch operations and their JSON form.
//!
//! The serialized form of an operation is `{ "op": "add", "path": "/a/0",
//! "value": ... }`; `remove` carries no value.

use std::fmt;

use docvc_types::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DiffError, DiffResult};

/// Kind of a patch operation. Orders as `Add < Remove < Replace`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
        }
    }

    fn parse(op: &str) -> Option<Self> {
        match op {
            "add" => Some(OpKind::Add),
            "remove" => Some(OpKind::Remove),
            "replace" => Some(OpKind::Replace),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Set `path` to `value`, creating intermediate containers.
    Add { path: Path, value: Value },
    /// Delete the node at `path`.
    Remove { path: Path },
    /// Overwrite the node at `path` with `value`.
    Replace { path: Path, value: Value },
}

impl PatchOperation {
    pub fn kind(&self) -> OpKind {
        match self {
            PatchOperation::Add { .. } => OpKind::Add,
            PatchOperation::Remove { .. } => OpKind::Remove,
            PatchOperation::Replace { .. } => OpKind::Replace,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. } => path,
        }
    }

    /// The value written by `add` and `replace`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
                Some(value)
            }
            PatchOperation::Remove { .. } => None,
        }
    }
}

/// Ordered list of patch operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from its JSON form.
    ///
    /// An operation whose `op` is not `add`, `remove` or `replace` fails with
    /// [`DiffError::UnsupportedOperation`].
    pub fn from_value(value: &Value) -> DiffResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| DiffError::Malformed("patch must be an array".into()))?;

        items
            .iter()
            .map(|item| -> DiffResult<PatchOperation> {
                let op = item
                    .get("op")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DiffError::Malformed(format!("missing op in {item}")))?;
                if OpKind::parse(op).is_none() {
                    return Err(DiffError::UnsupportedOperation(op.to_owned()));
                }
                serde_json::from_value(item.clone())
                    .map_err(|e| DiffError::Malformed(e.to_string()))
            })
            .collect::<DiffResult<Vec<_>>>()
            .map(Self::from)
    }

    /// Serialize to the JSON form accepted by [`Patch::from_value`].
    pub fn to_value(&self) -> Value {
        Value::Array(self.operations.iter().map(operation_to_value).collect())
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    /// Returns `true` if there are no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Number of operations of the given kind.
    pub fn count(&self, kind: OpKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }
}

fn operation_to_value(operation: &PatchOperation) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("op".into(), Value::from(operation.kind().as_str()));
    object.insert("path".into(), Value::from(operation.path().to_pointer()));
    if let Some(value) = operation.value() {
        object.insert("value".into(), value.clone());
    }
    Value::Object(object)
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<PatchOperation> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
