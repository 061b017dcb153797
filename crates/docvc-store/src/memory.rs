use std::fmt;

use docvc_crypto::ContentHasher;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::listeners::{ListenerRegistry, SubscriptionId};

/// In-memory, insertion-ordered entry store.
///
/// Entries are JSON values keyed either by the content hash of the value
/// (when no explicit key is given) or by a caller-supplied key. Values are
/// cloned on read and write.
pub struct Store {
    hasher: ContentHasher,
    entries: Map<String, Value>,
    listeners: ListenerRegistry<str>,
}

impl Store {
    /// Create a new empty store hashing with `hasher`.
    pub fn new(hasher: ContentHasher) -> Self {
        Self::from_snapshot(hasher, Map::new())
    }

    /// Reconstitute a store from a previously exported snapshot.
    pub fn from_snapshot(hasher: ContentHasher, entries: Map<String, Value>) -> Self {
        Self {
            hasher,
            entries,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Store `value` and return its key.
    ///
    /// With `explicit_key` the entry is stored (or overwritten) under that
    /// literal key. Otherwise the key is the content hash of `value`. Every
    /// listener is notified with the key before this returns.
    pub fn write(&mut self, value: &Value, explicit_key: Option<&str>) -> String {
        let key = match explicit_key {
            Some(key) => key.to_owned(),
            None => self.hasher.hash_json(value).into_string(),
        };
        self.entries.insert(key.clone(), value.clone());
        debug!(key = %key, domain = self.hasher.domain(), "entry written");
        self.listeners.emit(&key);
        key
    }

    /// A copy of the entry stored under `key`.
    pub fn read(&self, key: &str) -> StoreResult<Value> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Delete the entry stored under `key`.
    pub fn remove(&mut self, key: &str) -> StoreResult<()> {
        match self.entries.shift_remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_owned())),
        }
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// A copy of every entry, in insertion order.
    pub fn to_json(&self) -> Map<String, Value> {
        self.entries.clone()
    }

    /// Register a write listener. It receives the key of every written entry.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Remove a write listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The hasher used for content-addressed writes.
    pub fn hasher(&self) -> ContentHasher {
        self.hasher
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ContentHasher::default())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("domain", &self.hasher.domain())
            .field("entry_count", &self.entries.len())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}
