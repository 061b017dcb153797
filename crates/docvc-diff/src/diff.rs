//! Patch computation between two documents.

use std::collections::HashSet;

use docvc_types::{get_path, kind, walk_tree, Path};
use serde_json::Value;

use crate::patch::{Patch, PatchOperation};

/// Compute the patch that turns `left` into `right`.
///
/// Every leaf of `right` (anything that is not an object or array, `null`
/// included) yields an `add` when its path is missing from `left` and a
/// `replace` when the value there differs. Every node of `left` whose path
/// does not occur in `right` yields a `remove`; a removed container is
/// followed by one `remove` per node below it. The result is stably sorted
/// `add`, then `remove`, then `replace`.
pub fn diff(left: &Value, right: &Value) -> Patch {
    let mut visited: HashSet<Path> = HashSet::new();
    let mut operations = Vec::new();

    walk_tree(right, |value, _, path| {
        visited.insert(path.clone());
        if kind(value).is_container() {
            return;
        }
        match get_path(left, path) {
            None => operations.push(PatchOperation::Add {
                path: path.clone(),
                value: value.clone(),
            }),
            Some(current) if current == value => {}
            Some(_) => operations.push(PatchOperation::Replace {
                path: path.clone(),
                value: value.clone(),
            }),
        }
    });

    walk_tree(left, |_, _, path| {
        if !visited.contains(path) {
            operations.push(PatchOperation::Remove { path: path.clone() });
        }
    });

    operations.sort_by_key(PatchOperation::kind);
    Patch::from(operations)
}
