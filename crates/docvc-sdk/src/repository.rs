use std::fmt;
use std::sync::{Mutex, MutexGuard};

use docvc_crypto::ContentHasher;
use docvc_diff::{apply_patch, diff, Decision, Patch, PatchOperation};
use docvc_merge::{ancestry, build_merge_patch, find_merge_base, MergeError, MergeResult};
use docvc_refs::{validate_branch_name, Head, RefStore, DEFAULT_BRANCH};
use docvc_store::{
    reference_targets, CompressedStore, ListenerRegistry, Store, StoreError, SubscriptionId,
};
use docvc_types::Hash;
use serde_json::Value;
use tracing::{info, warn};

use crate::commit::Commit;
use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};
use crate::events::HeadEvent;
use crate::snapshot::Snapshot;

/// Stores and refs of one repository, always accessed under one lock.
struct State {
    commits: Store,
    trees: CompressedStore,
    refs: RefStore,
}

impl State {
    fn fresh() -> Self {
        Self::restore(Snapshot::default())
    }

    fn restore(snapshot: Snapshot) -> Self {
        Self {
            commits: Store::from_snapshot(ContentHasher::COMMIT, snapshot.commits),
            trees: CompressedStore::new(Store::from_snapshot(ContentHasher::TREE, snapshot.trees)),
            refs: RefStore::from_snapshot(snapshot.refs),
        }
    }

    fn head(&self) -> RepoResult<Hash> {
        Ok(self.refs.current_commit()?)
    }

    fn branch(&self) -> RepoResult<String> {
        match self.refs.head()? {
            Head::Branch(name) => Ok(name),
            Head::Detached(head) => Err(RepoError::StateConflict(format!(
                "You are in detached mode on {head}"
            ))),
        }
    }

    fn read_commit(&self, hash: &str) -> RepoResult<Commit> {
        let value = self.commits.read(hash).map_err(|err| match err {
            StoreError::NotFound(_) => RepoError::NotFound(format!("Commit {hash} doesn't exist")),
            other => other.into(),
        })?;
        Commit::from_value(hash, value)
    }

    fn parent_of(&self, hash: &Hash) -> MergeResult<Hash> {
        match self.read_commit(hash.as_str()) {
            Ok(commit) => Ok(commit.parent),
            Err(RepoError::NotFound(_)) => Err(MergeError::CommitNotFound(hash.clone())),
            Err(err) => Err(MergeError::MalformedCommit {
                hash: hash.clone(),
                reason: err.to_string(),
            }),
        }
    }

    fn tree_at(&self, hash: &Hash) -> RepoResult<Value> {
        let commit = self.read_commit(hash.as_str())?;
        Ok(self.trees.read(commit.tree_hash.as_str())?)
    }

    fn tree(&self) -> RepoResult<Value> {
        let head = self.head()?;
        if head.is_empty_hash() {
            return Err(RepoError::StateConflict(
                "There isn't a tree yet. You must do your first commit for that.".into(),
            ));
        }
        self.tree_at(&head)
    }

    /// A commit hash as is, else the head of the branch so named.
    fn resolve(&self, target: &str) -> RepoResult<Hash> {
        if self.commits.has(target) {
            return Ok(Hash::new(target));
        }
        self.refs
            .head_of(target)?
            .ok_or_else(|| RepoError::NotFound(format!("Branch {target} doesn't exist")))
    }

    fn diff_commits(&self, left: &Hash, right: &Hash) -> RepoResult<Patch> {
        Ok(diff(&self.tree_at(left)?, &self.tree_at(right)?))
    }

    fn commit(
        &mut self,
        config: &RepositoryConfig,
        author: &str,
        message: &str,
        tree: &Value,
    ) -> RepoResult<Hash> {
        if author.is_empty() {
            return Err(RepoError::Validation("Author is mandatory".into()));
        }
        if message.is_empty() {
            return Err(RepoError::Validation("Message is mandatory".into()));
        }
        if let Some((path, _)) = reference_targets(tree).into_iter().next() {
            return Err(RepoError::Validation(format!(
                "Tree holds a reserved reference token at {path}"
            )));
        }

        let head = self.head()?;
        let mut last_tree = None;
        if !head.is_empty_hash() {
            let last = self.read_commit(head.as_str())?;
            if self.trees.read(last.tree_hash.as_str())? == *tree {
                return Err(RepoError::NoOp);
            }
            last_tree = Some(last.tree_hash);
        }

        let compress_against = last_tree
            .as_ref()
            .filter(|_| config.compress_trees)
            .map(Hash::as_str);
        let tree_hash = Hash::from(self.trees.write(tree, compress_against)?);
        let commit = Commit::new(author, message, tree_hash, head);
        let hash = Hash::from(self.commits.write(&commit.to_value()?, None));
        self.refs.advance(&hash)?;

        info!(
            commit = %hash.short(),
            parent = %commit.parent.short(),
            tree = %commit.tree_hash.short(),
            author,
            "commit created"
        );
        Ok(hash)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            refs: self.refs.to_json(),
            commits: self.commits.to_json(),
            trees: self.trees.to_json(),
        }
    }
}

/// A versioned JSON document store.
///
/// All operations lock the repository state once for their whole duration.
/// A failed operation leaves the state untouched. Subscribers are notified
/// after the lock is released, so they may call back into the repository.
pub struct Repository {
    config: RepositoryConfig,
    state: Mutex<State>,
    listeners: Mutex<ListenerRegistry<HeadEvent>>,
}

impl Repository {
    /// An empty repository on `master`.
    pub fn new() -> Self {
        Self::with_config(RepositoryConfig::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        Self::build(config, State::fresh())
    }

    /// Restore a repository, starting empty if the snapshot is rejected by
    /// [`Snapshot::validate`].
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::from_snapshot_with_config(snapshot, RepositoryConfig::default())
    }

    pub fn from_snapshot_with_config(snapshot: Snapshot, config: RepositoryConfig) -> Self {
        match snapshot.validate() {
            Ok(()) => Self::build(config, State::restore(snapshot)),
            Err(err) => {
                warn!(error = %err, "snapshot rejected, starting from an empty repository");
                Self::with_config(config)
            }
        }
    }

    /// Restore a repository, failing if the snapshot is rejected.
    pub fn try_from_snapshot(snapshot: Snapshot) -> RepoResult<Self> {
        snapshot.validate()?;
        Ok(Self::build(RepositoryConfig::default(), State::restore(snapshot)))
    }

    fn build(config: RepositoryConfig, state: State) -> Self {
        Self {
            config,
            state: Mutex::new(state),
            listeners: Mutex::new(ListenerRegistry::new()),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("repository state lock poisoned")
    }

    /// Run a mutating operation, then notify subscribers of the new head.
    fn mutate<T>(&self, op: impl FnOnce(&mut State) -> RepoResult<T>) -> RepoResult<T> {
        let (result, head) = {
            let mut state = self.lock();
            let result = op(&mut *state)?;
            (result, state.head())
        };
        if let Ok(head) = head {
            let event = HeadEvent { head };
            let listeners = self
                .listeners
                .lock()
                .expect("repository listener lock poisoned")
                .snapshot();
            for listener in listeners {
                listener(&event);
            }
        }
        Ok(result)
    }

    // ---- Accessors ----

    /// The checked out branch. Fails in detached mode.
    pub fn branch(&self) -> RepoResult<String> {
        self.lock().branch()
    }

    /// Every branch name, in creation order.
    pub fn branches(&self) -> RepoResult<Vec<String>> {
        Ok(self.lock().refs.branches()?)
    }

    pub fn detached(&self) -> bool {
        self.lock().refs.is_detached()
    }

    /// The checked out commit, [`EMPTY_HASH`](docvc_types::EMPTY_HASH) before
    /// the first commit.
    pub fn head(&self) -> RepoResult<Hash> {
        self.lock().head()
    }

    /// Every stored commit, oldest first.
    pub fn log(&self) -> RepoResult<Vec<(Hash, Commit)>> {
        let state = self.lock();
        state
            .commits
            .to_json()
            .into_iter()
            .map(|(hash, value)| -> RepoResult<(Hash, Commit)> {
                let commit = Commit::from_value(&hash, value)?;
                Ok((Hash::from(hash), commit))
            })
            .collect()
    }

    pub fn read_commit(&self, hash: &str) -> RepoResult<Commit> {
        self.lock().read_commit(hash)
    }

    /// The document at head.
    pub fn tree(&self) -> RepoResult<Value> {
        self.lock().tree()
    }

    /// Ancestor chain of a branch or commit, newest first.
    pub fn history(&self, target: &str) -> RepoResult<Vec<Hash>> {
        let state = self.lock();
        let head = state.resolve(target)?;
        let graph = |hash: &Hash| state.parent_of(hash);
        Ok(ancestry(&head, &graph)?)
    }

    /// The commit a merge of `right` into `left` diffs against.
    pub fn merge_base(&self, left: &str, right: &str) -> RepoResult<Hash> {
        let state = self.lock();
        let left = state.resolve(left)?;
        let right = state.resolve(right)?;
        let graph = |hash: &Hash| state.parent_of(hash);
        Ok(find_merge_base(&left, &right, &graph)?)
    }

    // ---- Document operations ----

    /// Apply `patch` to the document at head without changing any state.
    pub fn apply(
        &self,
        patch: &Patch,
        resolver: Option<&mut dyn FnMut(&PatchOperation, Option<&Value>) -> Decision>,
    ) -> RepoResult<Value> {
        let tree = self.lock().tree()?;
        Ok(apply_patch(patch, &tree, resolver))
    }

    /// The patch turning the document of `left` into that of `right`. Each
    /// side is a commit hash or a branch name.
    pub fn diff(&self, left: &str, right: &str) -> RepoResult<Patch> {
        let state = self.lock();
        let left = state.resolve(left)?;
        let right = state.resolve(right)?;
        state.diff_commits(&left, &right)
    }

    /// Record `tree` as a new commit on top of head.
    pub fn commit(&self, author: &str, message: &str, tree: &Value) -> RepoResult<Hash> {
        let config = &self.config;
        self.mutate(|state| state.commit(config, author, message, tree))
    }

    // ---- Branch operations ----

    /// Check out a commit (detached mode) or a branch, creating the branch
    /// at head when `create` is set.
    pub fn checkout(&self, target: &str, create: bool) -> RepoResult<()> {
        let config = &self.config;
        self.mutate(|state| {
            if state.commits.has(target) {
                state.refs.detach(&Hash::new(target))?;
                info!(head = target, "commit checked out");
                return Ok(());
            }

            let exists = state.refs.has_branch(target)?;
            if create {
                if exists {
                    return Err(RepoError::StateConflict(format!(
                        "Branch {target} already exists."
                    )));
                }
                if config.validate_branch_names {
                    validate_branch_name(target)?;
                }
                let head = state.head()?;
                state.refs.create_branch(target, &head)?;
            } else if !exists {
                return Err(RepoError::NotFound(format!(
                    "Branch {target} does not exist."
                )));
            }

            state.refs.set_branch(target)?;
            info!(branch = target, created = create, "branch checked out");
            Ok(())
        })
    }

    /// Delete a branch other than `master` and the checked out one.
    pub fn delete_branch(&self, name: &str) -> RepoResult<()> {
        self.mutate(|state| {
            if !state.refs.has_branch(name)? {
                return Err(RepoError::NotFound(format!("Branch {name} doesn't exist")));
            }
            if state.branch()? == name {
                return Err(RepoError::StateConflict(
                    "You cannot delete the current branch".into(),
                ));
            }
            if name == DEFAULT_BRANCH {
                return Err(RepoError::StateConflict(
                    "You cannot delete the master branch".into(),
                ));
            }
            state.refs.delete_branch(name)?;
            info!(branch = name, "branch deleted");
            Ok(())
        })
    }

    // ---- History operations ----

    /// Merge a branch or commit into head.
    ///
    /// Both sides are diffed against their merge base; target operations on
    /// paths the current side also changed go through `resolver`, and the
    /// surviving operations are applied to the document at head and
    /// committed. Fails with [`RepoError::StateConflict`] when head is
    /// detached.
    pub fn merge(
        &self,
        author: &str,
        target: &str,
        resolver: Option<&mut dyn FnMut(&PatchOperation, &PatchOperation) -> Decision>,
    ) -> RepoResult<Hash> {
        let config = &self.config;
        self.mutate(|state| {
            let into = state.branch()?;
            let target_head = state.resolve(target)?;
            let head = state.head()?;
            let base = {
                let graph = |hash: &Hash| state.parent_of(hash);
                find_merge_base(&head, &target_head, &graph)?
            };

            let current = state.diff_commits(&base, &head)?;
            let incoming = state.diff_commits(&base, &target_head)?;
            let patch = build_merge_patch(&current, &incoming, resolver);
            let tree = apply_patch(&patch, &state.tree()?, None);

            let message = format!("Merge of {target} into {into}");
            let hash = state.commit(config, author, &message, &tree)?;
            info!(commit = %hash.short(), base = %base.short(), target, "merge committed");
            Ok(hash)
        })
    }

    /// Commit the inverse of the changes `commit` introduced, applied to the
    /// document at head.
    pub fn revert(
        &self,
        author: &str,
        commit: &str,
        resolver: Option<&mut dyn FnMut(&PatchOperation, Option<&Value>) -> Decision>,
    ) -> RepoResult<Hash> {
        let config = &self.config;
        self.mutate(|state| {
            if author.is_empty() {
                return Err(RepoError::Validation("Author is mandatory".into()));
            }
            let reverted = state.read_commit(commit)?;
            if reverted.is_root() {
                return Err(RepoError::StateConflict(
                    "You can't revert the first commit.".into(),
                ));
            }

            let patch = state.diff_commits(&Hash::new(commit), &reverted.parent)?;
            let tree = apply_patch(&patch, &state.tree()?, resolver);
            let hash = state.commit(config, author, &format!("Revert of commit {commit}"), &tree)?;
            info!(commit = %hash.short(), reverted = commit, "revert committed");
            Ok(hash)
        })
    }

    // ---- Notification and export ----

    /// Register a listener called with the head after every successful
    /// commit, checkout, branch deletion, merge and revert.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&HeadEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .expect("repository listener lock poisoned")
            .subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .expect("repository listener lock poisoned")
            .unsubscribe(id)
    }

    /// Export the whole repository. Trees are in their stored, compressed
    /// form.
    pub fn to_json(&self) -> Snapshot {
        self.lock().snapshot()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Repository")
            .field("config", &self.config)
            .field("refs", &state.refs)
            .field("commit_count", &state.commits.len())
            .field("tree_count", &state.trees.len())
            .finish()
    }
}
