//! Merge-base search over linear commit history.

use std::collections::HashSet;

use docvc_types::Hash;
use tracing::debug;

use crate::error::{MergeError, MergeResult};

/// Read access to the parent links of stored commits.
pub trait CommitGraph {
    /// The parent of `commit`, [`EMPTY_HASH`](docvc_types::EMPTY_HASH) for a
    /// root commit.
    fn parent_of(&self, commit: &Hash) -> MergeResult<Hash>;
}

impl<F> CommitGraph for F
where
    F: Fn(&Hash) -> MergeResult<Hash>,
{
    fn parent_of(&self, commit: &Hash) -> MergeResult<Hash> {
        self(commit)
    }
}

/// The ancestor chain of `head`, newest first and `head` included.
///
/// The walk stops at [`EMPTY_HASH`](docvc_types::EMPTY_HASH), which is not
/// part of the chain, so an empty head has an empty chain.
pub fn ancestry<G: CommitGraph + ?Sized>(head: &Hash, graph: &G) -> MergeResult<Vec<Hash>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = head.clone();

    while !current.is_empty_hash() {
        if !seen.insert(current.clone()) {
            return Err(MergeError::CorruptHistory(current));
        }
        let parent = graph.parent_of(&current)?;
        chain.push(current);
        current = parent;
    }

    Ok(chain)
}

/// The commit to diff both heads against when merging `right` into `left`.
///
/// Both ancestor chains are intersected in `left` order and the last shared
/// commit is returned: the oldest common ancestor, not the nearest one.
pub fn find_merge_base<G: CommitGraph + ?Sized>(
    left: &Hash,
    right: &Hash,
    graph: &G,
) -> MergeResult<Hash> {
    let left_chain = ancestry(left, graph)?;
    let right_chain: HashSet<Hash> = ancestry(right, graph)?.into_iter().collect();

    let base = left_chain
        .into_iter()
        .rev()
        .find(|hash| right_chain.contains(hash))
        .ok_or_else(|| MergeError::NoCommonAncestor {
            left: left.clone(),
            right: right.clone(),
        })?;

    debug!(left = %left.short(), right = %right.short(), base = %base.short(), "merge base found");
    Ok(base)
}
