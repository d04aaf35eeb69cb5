//! Remove operation with compaction.
//!
//! After an entry leaves a child, the parent restores the structural
//! invariants: a child left holding a single item is inlined, and an
//! atrophied child (no items, one collision child) is replaced by its
//! collision grandchild. Both fixes may cascade one level up per return.
//! The root is exempt; the tree handle finishes the job there.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::bitmap::Slot;
use crate::hash::{KeyHash, Level};
use crate::node::{Content, Entry, Node, NodeRef};
use crate::ops::get::{collision_slot, get};

/// Removes `key` from the subtree rooted at `node`, which sits at `level`.
///
/// Returns the removed entry. An absent key leaves every node untouched:
/// no shared node is copied.
pub fn remove<K, V, Q>(
    node: &mut NodeRef<K, V>,
    level: Level,
    hash: KeyHash,
    key: &Q,
) -> Option<Entry<K, V>>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    get(node, level, hash, key)?;
    remove_present(node, level, hash, key)
}

fn remove_present<K, V, Q>(
    node: &mut NodeRef<K, V>,
    level: Level,
    hash: KeyHash,
    key: &Q,
) -> Option<Entry<K, V>>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    if node.is_collision() {
        let slot = collision_slot(node, hash, key)?;
        return Some(Node::make_mut(node, 0).remove_collision(level, slot));
    }

    let bucket = hash.bucket(level);
    match node.content(bucket) {
        Content::Item(..) => Some(Node::make_mut(node, 0).remove_item(bucket)),
        Content::Child(slot, _) => {
            let this = Node::make_mut(node, 0);
            let removed = remove_present(this.child_mut(slot), level.descend(), hash, key)?;
            this.count_removed();

            let child = this.child_mut(slot);
            if child.is_singleton() {
                let child = this.remove_child(bucket);
                this.insert_item(bucket, Node::into_only_item(child));
                #[cfg(feature = "tracing")]
                tracing::trace!(level = level.depth(), "remove: inlined singleton child");
            } else if child.is_atrophied() {
                let grandchild = Arc::clone(child.child(Slot::ZERO));
                *child = grandchild;
                #[cfg(feature = "tracing")]
                tracing::trace!(level = level.depth(), "remove: compressed atrophied child");
            }
            Some(removed)
        }
        Content::Empty => None,
    }
}

/// Replaces an atrophied root by its collision child.
pub fn compress_root<K, V>(root: &mut NodeRef<K, V>) {
    if root.is_atrophied() {
        let collision = Arc::clone(root.child(Slot::ZERO));
        *root = collision;
        #[cfg(feature = "tracing")]
        tracing::trace!("remove: root replaced by its collision child");
    }
}
