//! Filtering: keeps the entries accepted by a predicate.

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, NodeRef};

/// Keeps the entries of the subtree at `level` for which `keep` returns
/// `true`. Untouched subtrees are shared with the source.
///
/// Returns `None` when every entry is kept.
pub fn filter<K, V, F>(level: Level, node: &NodeRef<K, V>, keep: &mut F) -> Option<Builder<K, V>>
where
    K: Clone,
    V: Clone,
    F: FnMut(&K, &V) -> bool,
{
    if node.is_collision() {
        return Builder::copy_collisions(level, node, |entry| keep(&entry.key, &entry.value));
    }
    let mut fork = Fork::new(level, node);
    for bucket in node.occupancy() {
        match node.content(bucket) {
            Content::Item(_, entry) => {
                if keep(&entry.key, &entry.value) {
                    fork.keep(bucket);
                } else {
                    fork.discard(bucket);
                }
            }
            Content::Child(_, child) => match filter(level.descend(), child, keep) {
                None => fork.keep(bucket),
                Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
            },
            Content::Empty => {}
        }
    }
    fork.finish()
}
