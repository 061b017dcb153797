//! Delta compression against a parent document.
//!
//! A compressed entry is a copy of a document in which every subtree that is
//! identical to the subtree at the same path of a parent entry has been
//! replaced by the reference token `"$$ref:<parent key>"`.

use std::collections::HashSet;

use docvc_types::{get_path, set_path, walk_tree, Path};
use serde_json::Value;

/// Prefix marking a reference token.
pub const REFERENCE_PREFIX: &str = "$$ref:";

/// The reference token pointing at the entry stored under `key`.
pub fn reference_token(key: &str) -> String {
    format!("{REFERENCE_PREFIX}{key}")
}

/// The referenced key if `value` is a whole reference token.
pub fn parse_reference_token(value: &str) -> Option<&str> {
    value
        .strip_prefix(REFERENCE_PREFIX)
        .filter(|key| !key.is_empty())
}

/// Paths of `value` whose subtree equals the subtree at the same path of
/// `parent`, collapsed so that no returned path lies below another one.
///
/// The root is never returned. Paths come back in walk order.
pub fn find_similar_paths(parent: &Value, value: &Value) -> Vec<Path> {
    let mut candidates = Vec::new();
    walk_tree(value, |node, _, path| {
        if get_path(parent, path) == Some(node) {
            candidates.push(path.clone());
        }
    });

    let similar: HashSet<&Path> = candidates.iter().collect();
    // When a subtree matches, so does each of its children, so checking the
    // direct parent is enough to drop every nested match.
    candidates
        .iter()
        .filter(|path| match path.parent() {
            Some(enclosing) => enclosing.is_root() || !similar.contains(&enclosing),
            None => true,
        })
        .cloned()
        .collect()
}

/// A copy of `value` where every subtree shared with `parent` is `token`.
pub fn compress(parent: &Value, value: &Value, token: &str) -> Value {
    let mut output = value.clone();
    for path in find_similar_paths(parent, value) {
        set_path(&mut output, &path, Value::String(token.to_owned()));
    }
    output
}

/// Every reference token in `raw`, with the path where it sits.
pub fn reference_targets(raw: &Value) -> Vec<(Path, String)> {
    let mut targets = Vec::new();
    walk_tree(raw, |node, _, path| {
        if let Some(key) = node.as_str().and_then(parse_reference_token) {
            targets.push((path.clone(), key.to_owned()));
        }
    });
    targets
}
