use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use docvc_types::{get_path, kind, set_path};
use serde_json::{Map, Value};
use tracing::debug;

use crate::compress::{compress, reference_targets, reference_token};
use crate::error::{StoreError, StoreResult};
use crate::listeners::SubscriptionId;
use crate::memory::Store;

/// Delta-compressing layer over a content-addressed [`Store`].
///
/// Writes may name a parent entry; every subtree shared with that parent is
/// stored as a reference token. Reads always return the fully expanded value.
pub struct CompressedStore {
    store: Store,
}

impl CompressedStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &Store {
        &self.store
    }

    pub fn into_inner(self) -> Store {
        self.store
    }

    /// Store `value`, compressed against the entry under `parent_key`.
    ///
    /// Without a parent the value is stored as is. A parent whose root kind
    /// differs from `value` (object, array or scalar) is ignored. Fails with
    /// [`StoreError::NotFound`] when the parent does not exist, in which case
    /// nothing is written.
    pub fn write(&mut self, value: &Value, parent_key: Option<&str>) -> StoreResult<String> {
        let Some(parent_key) = parent_key else {
            return Ok(self.store.write(value, None));
        };

        let parent = self.read(parent_key)?;
        if kind(&parent) != kind(value) {
            debug!(parent = parent_key, "parent kind differs, storing uncompressed");
            return Ok(self.store.write(value, None));
        }

        let compressed = compress(&parent, value, &reference_token(parent_key));
        let replaced = reference_targets(&compressed).len();
        let key = self.store.write(&compressed, None);
        debug!(key = %key, parent = parent_key, replaced, "compressed entry written");
        Ok(key)
    }

    /// The fully expanded entry stored under `key`.
    pub fn read(&self, key: &str) -> StoreResult<Value> {
        expand(&self.store, key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.has(key)
    }

    pub fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.store.remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Every entry in its stored (compressed) form.
    pub fn to_json(&self) -> Map<String, Value> {
        self.store.to_json()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl fmt::Debug for CompressedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedStore")
            .field("store", &self.store)
            .finish()
    }
}

/// Per-read memo of expanded entries.
#[derive(Default)]
struct ExpansionCache {
    resolved: HashMap<String, Rc<Value>>,
    in_progress: HashSet<String>,
}

/// Read the entry under `key` from `store`, replacing every reference token
/// with the subtree found at the same path of the referenced entry.
pub fn expand(store: &Store, key: &str) -> StoreResult<Value> {
    let mut cache = ExpansionCache::default();
    let expanded = expand_key(store, key, &mut cache)?;
    drop(cache);
    Ok(Rc::unwrap_or_clone(expanded))
}

fn expand_key(store: &Store, key: &str, cache: &mut ExpansionCache) -> StoreResult<Rc<Value>> {
    if let Some(done) = cache.resolved.get(key) {
        return Ok(Rc::clone(done));
    }
    if !cache.in_progress.insert(key.to_owned()) {
        return Err(StoreError::CyclicReference(key.to_owned()));
    }

    let mut value = store.read(key)?;
    for (path, reference) in reference_targets(&value) {
        let target = expand_key(store, &reference, cache)?;
        let subtree = get_path(&target, &path).cloned().ok_or_else(|| {
            StoreError::DanglingReference {
                key: key.to_owned(),
                reference: reference.clone(),
                path: path.clone(),
            }
        })?;
        set_path(&mut value, &path, subtree);
    }

    cache.in_progress.remove(key);
    let value = Rc::new(value);
    cache.resolved.insert(key.to_owned(), Rc::clone(&value));
    Ok(value)
}
