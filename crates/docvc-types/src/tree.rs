//! Recursive traversal and path addressing over JSON documents.
//!
//! These helpers give every crate the same view of a document: objects and
//! arrays are containers, anything else is a leaf. Array elements are
//! addressed by decimal index segments (`"0"`, `"1"`, ...).

use serde_json::{Map, Value};

use crate::path::Path;

/// Structural classification of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Scalar,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        !matches!(self, NodeKind::Scalar)
    }
}

/// Classify a value.
pub fn kind(value: &Value) -> NodeKind {
    match value {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        _ => NodeKind::Scalar,
    }
}

/// Parse an array index segment: `0` or a decimal without leading zeros.
pub fn parse_index(segment: &str) -> Option<usize> {
    let valid = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if valid {
        segment.parse().ok()
    } else {
        None
    }
}

/// Visit every node below `value`, depth-first and pre-order.
///
/// The visitor receives the node, its key within the parent, and its full
/// path. The root itself is not visited. Object members are visited in
/// insertion order and array elements by ascending index.
pub fn walk_tree<F>(value: &Value, mut visitor: F)
where
    F: FnMut(&Value, &str, &Path),
{
    let mut path = Path::root();
    walk_children(value, &mut path, &mut visitor);
}

fn walk_children<F>(value: &Value, path: &mut Path, visitor: &mut F)
where
    F: FnMut(&Value, &str, &Path),
{
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(child, key.clone(), path, visitor);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                visit(child, index.to_string(), path, visitor);
            }
        }
        _ => {}
    }
}

fn visit<F>(child: &Value, key: String, path: &mut Path, visitor: &mut F)
where
    F: FnMut(&Value, &str, &Path),
{
    path.push(key);
    if let Some(key) = path.last() {
        visitor(child, key, path);
    }
    walk_children(child, path, visitor);
    path.pop();
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => parse_index(segment).and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// The node at `path`, if present.
pub fn get_path<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(value, |node, segment| child(node, segment))
}

/// Mutable access to the node at `path`, if present.
pub fn get_path_mut<'a>(value: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = value;
    for segment in path.segments() {
        node = child_mut(node, segment)?;
    }
    Some(node)
}

/// Returns `true` if a node exists at `path`.
pub fn has_path(value: &Value, path: &Path) -> bool {
    get_path(value, path).is_some()
}

/// Store `new_value` at `path`, creating intermediate containers.
///
/// A missing or scalar intermediate becomes an array when the segment that
/// addresses into it is an index, and an object otherwise. Writing a
/// non-index key into an array turns that array into an object keyed by the
/// former indices. Writing past the end of an array pads it with `null`, up
/// to [`MAX_ARRAY_PADDING`] slots; an index further out is treated like a
/// non-index key and converts the array to an object.
pub fn set_path(value: &mut Value, path: &Path, new_value: Value) {
    let mut node = value;
    for segment in path.segments() {
        node = slot(node, segment);
    }
    *node = new_value;
}

/// Largest number of `null` slots [`set_path`] inserts to reach an index.
pub const MAX_ARRAY_PADDING: usize = 1024;

fn within_padding(len: usize, segment: &str) -> bool {
    parse_index(segment).is_some_and(|index| index <= len.saturating_add(MAX_ARRAY_PADDING))
}

fn empty_container_for(segment: &str) -> Value {
    if within_padding(0, segment) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn prepare(node: &mut Value, segment: &str) {
    match node {
        Value::Object(_) => {}
        Value::Array(items) if within_padding(items.len(), segment) => {}
        Value::Array(items) => {
            let map: Map<String, Value> = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *node = Value::Object(map);
        }
        _ => *node = empty_container_for(segment),
    }
}

fn slot<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    prepare(node, segment);
    match node {
        Value::Array(items) => {
            let index = parse_index(segment).unwrap_or(items.len());
            if index >= items.len() {
                items.resize(index.saturating_add(1), Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment.to_owned()).or_insert(Value::Null),
        other => other,
    }
}
