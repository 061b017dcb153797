//! Ref operations over an explicit-key [`Store`].

use std::fmt;

use docvc_crypto::ContentHasher;
use docvc_store::{Store, SubscriptionId};
use docvc_types::Hash;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{RefError, RefResult};
use crate::types::{BranchRecord, DetachedRecord, Head};

/// Key of the checked out branch record.
pub const BRANCH_KEY: &str = "branch";
/// Key of the branch head map.
pub const HEADS_KEY: &str = "heads";
/// Key of the detached head record.
pub const DETACHED_KEY: &str = "detached";
/// Branch every repository starts on. It can never be deleted.
pub const DEFAULT_BRANCH: &str = "master";

/// Branch pointer, branch heads and detached head of one repository.
pub struct RefStore {
    store: Store,
}

impl RefStore {
    /// Fresh refs: on `master`, whose head is the empty hash.
    pub fn new() -> Self {
        Self::from_snapshot(Map::new())
    }

    /// Refs restored from an exported `refs` object.
    ///
    /// Every key present in `refs` replaces the matching default key as a
    /// whole; missing keys keep their default.
    pub fn from_snapshot(refs: Map<String, Value>) -> Self {
        let mut entries = Self::defaults();
        for (key, value) in refs {
            entries.insert(key, value);
        }
        Self {
            store: Store::from_snapshot(ContentHasher::ENTRY, entries),
        }
    }

    fn defaults() -> Map<String, Value> {
        let mut heads = Map::new();
        heads.insert(DEFAULT_BRANCH.into(), Value::from(Hash::empty().into_string()));

        let mut entries = Map::new();
        entries.insert(BRANCH_KEY.into(), serde_json::json!({ "value": DEFAULT_BRANCH }));
        entries.insert(HEADS_KEY.into(), Value::Object(heads));
        entries
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> RefResult<T> {
        let value = self.store.read(key)?;
        serde_json::from_value(value).map_err(|e| RefError::Serialization(format!("{key}: {e}")))
    }

    fn write_record<T: Serialize>(&mut self, key: &str, record: &T) -> RefResult<()> {
        let value =
            serde_json::to_value(record).map_err(|e| RefError::Serialization(e.to_string()))?;
        self.store.write(&value, Some(key));
        Ok(())
    }

    fn heads(&self) -> RefResult<Map<String, Value>> {
        self.read_record(HEADS_KEY)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Name stored in the branch record, whether or not a detached head
    /// shadows it.
    pub fn branch_name(&self) -> RefResult<String> {
        Ok(self.read_record::<BranchRecord>(BRANCH_KEY)?.value)
    }

    /// The detached head, if any.
    pub fn detached_head(&self) -> RefResult<Option<Hash>> {
        if !self.store.has(DETACHED_KEY) {
            return Ok(None);
        }
        Ok(Some(self.read_record::<DetachedRecord>(DETACHED_KEY)?.head))
    }

    pub fn is_detached(&self) -> bool {
        self.store.has(DETACHED_KEY)
    }

    /// The checked out position.
    pub fn head(&self) -> RefResult<Head> {
        match self.detached_head()? {
            Some(hash) => Ok(Head::Detached(hash)),
            None => Ok(Head::Branch(self.branch_name()?)),
        }
    }

    /// The commit currently checked out: the detached head if there is one,
    /// else the head of the current branch.
    pub fn current_commit(&self) -> RefResult<Hash> {
        match self.head()? {
            Head::Detached(hash) => Ok(hash),
            Head::Branch(name) => self
                .head_of(&name)?
                .ok_or(RefError::NotFound { name }),
        }
    }

    /// Head commit of branch `name`.
    pub fn head_of(&self, name: &str) -> RefResult<Option<Hash>> {
        match self.heads()?.get(name) {
            None => Ok(None),
            Some(Value::String(hash)) => Ok(Some(Hash::new(hash.as_str()))),
            Some(other) => Err(RefError::Serialization(format!(
                "head of {name} is not a hash: {other}"
            ))),
        }
    }

    pub fn has_branch(&self, name: &str) -> RefResult<bool> {
        Ok(self.heads()?.contains_key(name))
    }

    /// Every branch name, in creation order.
    pub fn branches(&self) -> RefResult<Vec<String>> {
        Ok(self.heads()?.keys().cloned().collect())
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// Point branch `name` at `commit`, creating the branch if needed.
    pub fn set_head(&mut self, name: &str, commit: &Hash) -> RefResult<()> {
        let mut heads = self.heads()?;
        heads.insert(name.to_owned(), Value::from(commit.as_str()));
        self.write_record(HEADS_KEY, &heads)?;
        debug!(branch = name, head = %commit.short(), "branch head moved");
        Ok(())
    }

    /// Create branch `name` at `commit`.
    pub fn create_branch(&mut self, name: &str, commit: &Hash) -> RefResult<()> {
        if self.has_branch(name)? {
            return Err(RefError::AlreadyExists {
                name: name.to_owned(),
            });
        }
        self.set_head(name, commit)
    }

    /// Delete branch `name`. The default branch and the branch named by the
    /// branch record cannot be deleted.
    pub fn delete_branch(&mut self, name: &str) -> RefResult<()> {
        let mut heads = self.heads()?;
        if !heads.contains_key(name) {
            return Err(RefError::NotFound {
                name: name.to_owned(),
            });
        }
        if self.branch_name()? == name {
            return Err(RefError::DeleteCurrentBranch {
                name: name.to_owned(),
            });
        }
        if name == DEFAULT_BRANCH {
            return Err(RefError::DeleteDefaultBranch {
                name: name.to_owned(),
            });
        }
        heads.shift_remove(name);
        self.write_record(HEADS_KEY, &heads)?;
        debug!(branch = name, "branch deleted");
        Ok(())
    }

    /// Check out branch `name`, leaving detached mode.
    pub fn set_branch(&mut self, name: &str) -> RefResult<()> {
        self.write_record(
            BRANCH_KEY,
            &BranchRecord {
                value: name.to_owned(),
            },
        )?;
        if self.store.has(DETACHED_KEY) {
            self.store.remove(DETACHED_KEY)?;
        }
        debug!(branch = name, "branch checked out");
        Ok(())
    }

    /// Check out `commit` directly.
    pub fn detach(&mut self, commit: &Hash) -> RefResult<()> {
        self.write_record(
            DETACHED_KEY,
            &DetachedRecord {
                head: commit.clone(),
            },
        )?;
        debug!(head = %commit.short(), "head detached");
        Ok(())
    }

    /// Move the checked out position to `commit`: the detached head when
    /// detached, else the head of the current branch.
    pub fn advance(&mut self, commit: &Hash) -> RefResult<()> {
        match self.head()? {
            Head::Detached(_) => self.detach(commit),
            Head::Branch(name) => self.set_head(&name, commit),
        }
    }

    // -----------------------------------------------------------------------
    // Export and notification
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Map<String, Value> {
        self.store.to_json()
    }

    /// Register a listener for ref writes. It receives the written key.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl Default for RefStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RefStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefStore")
            .field("head", &self.head().ok())
            .field("branches", &self.branches().unwrap_or_default())
            .finish()
    }
}
