//! Patch application.

use std::collections::HashSet;

use docvc_types::{get_path, get_path_mut, parse_index, set_path, Path};
use serde_json::Value;

use crate::patch::{Patch, PatchOperation};

/// Verdict of a conflict resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decision {
    /// Apply the operation.
    #[default]
    Accept,
    /// Skip the operation.
    Reject,
}

impl Decision {
    pub fn is_reject(self) -> bool {
        self == Decision::Reject
    }
}

/// Apply `patch` to a copy of `tree` and return the result.
///
/// Operations run in patch order. When a resolver is given it is consulted
/// for an `add` whose path already exists (with the current value) and for a
/// `replace` whose path is missing (with `None`); [`Decision::Reject`] skips
/// the operation. `remove` is never gated and does nothing when the path is
/// missing.
///
/// Removing an array element other than the last leaves a `null` hole.
/// Removing the last element pops it along with any trailing holes this
/// application created, so removing an array's tail one index at a time
/// shortens it.
pub fn apply_patch(
    patch: &Patch,
    tree: &Value,
    mut resolver: Option<&mut dyn FnMut(&PatchOperation, Option<&Value>) -> Decision>,
) -> Value {
    let mut output = tree.clone();
    let mut holes = HoleSet::default();

    for operation in patch {
        match operation {
            PatchOperation::Add { path, value } => {
                if let (Some(resolve), Some(current)) =
                    (resolver.as_deref_mut(), get_path(&output, path))
                {
                    if resolve(operation, Some(current)).is_reject() {
                        continue;
                    }
                }
                holes.set(&mut output, path, value.clone());
            }
            PatchOperation::Replace { path, value } => {
                if let Some(resolve) = resolver.as_deref_mut() {
                    if get_path(&output, path).is_none()
                        && resolve(operation, None).is_reject()
                    {
                        continue;
                    }
                }
                holes.set(&mut output, path, value.clone());
            }
            PatchOperation::Remove { path } => holes.remove(&mut output, path),
        }
    }

    output
}

/// Array slots emptied by `remove` during one application.
#[derive(Default)]
struct HoleSet {
    paths: HashSet<Path>,
}

impl HoleSet {
    fn forget_under(&mut self, path: &Path) {
        self.paths
            .retain(|hole| hole != path && !hole.is_descendant_of(path));
    }

    fn set(&mut self, output: &mut Value, path: &Path, value: Value) {
        set_path(output, path, value);
        self.forget_under(path);
    }

    fn remove(&mut self, output: &mut Value, path: &Path) {
        let (Some(parent_path), Some(last)) = (path.parent(), path.last()) else {
            *output = Value::Null;
            self.paths.clear();
            return;
        };
        let Some(parent) = get_path_mut(output, &parent_path) else {
            return;
        };

        match parent {
            Value::Object(map) => {
                map.shift_remove(last);
            }
            Value::Array(items) => {
                let Some(index) = parse_index(last).filter(|&i| i < items.len()) else {
                    return;
                };
                if index + 1 < items.len() {
                    items[index] = Value::Null;
                    self.forget_under(path);
                    self.paths.insert(path.clone());
                    return;
                }
                items.pop();
                while items.last().is_some_and(Value::is_null)
                    && self
                        .paths
                        .remove(&parent_path.child((items.len() - 1).to_string()))
                {
                    items.pop();
                }
            }
            _ => return,
        }
        self.forget_under(path);
    }
}
