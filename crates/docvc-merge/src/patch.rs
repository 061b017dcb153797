//! Reconciliation of the two sides of a merge.

use std::collections::HashMap;

use docvc_diff::{Decision, Patch, PatchOperation};
use docvc_types::Path;

/// Select the operations of `target` to replay onto the current side.
///
/// `current` is the patch from the merge base to the current head and
/// `target` the patch from the merge base to the merged head. A target
/// operation whose path no current operation touches is always kept. When
/// paths collide the target operation is kept unless a resolver, called with
/// the target operation and the last current operation on that path,
/// returns [`Decision::Reject`].
pub fn build_merge_patch(
    current: &Patch,
    target: &Patch,
    mut resolver: Option<&mut dyn FnMut(&PatchOperation, &PatchOperation) -> Decision>,
) -> Patch {
    let by_path: HashMap<&Path, &PatchOperation> =
        current.iter().map(|op| (op.path(), op)).collect();

    target
        .iter()
        .filter(|op| {
            let (Some(resolve), Some(conflict)) =
                (resolver.as_deref_mut(), by_path.get(op.path()))
            else {
                return true;
            };
            !resolve(*op, *conflict).is_reject()
        })
        .cloned()
        .collect()
}
