//! Symmetric difference: the entries whose keys are in exactly one subtree.

use std::sync::Arc;

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, Entry, Node, NodeRef};
use crate::ops::get::get;
use crate::ops::insert::insert;
use crate::ops::remove::remove;

/// Computes `left △ right` for two subtrees at `level`.
///
/// Returns `None` when the result is `left` unchanged.
#[must_use]
pub fn symmetric_difference<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if right.count() == 0 {
        return None;
    }
    if Arc::ptr_eq(left, right) {
        return Some(Builder::empty(level));
    }
    if left.count() == 0 {
        return Some(Builder::from_node(level, Arc::clone(right)));
    }
    if left.is_collision() || right.is_collision() {
        return Some(symmetric_difference_slow(level, left, right));
    }
    symmetric_difference_regular(level, left, right)
}

fn symmetric_difference_regular<K, V>(
    level: Level,
    left: &Node<K, V>,
    right: &Node<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    let mut fork = Fork::new(level, left);
    for bucket in left.occupancy().union(right.occupancy()) {
        match (left.content(bucket), right.content(bucket)) {
            (_, Content::Empty) => fork.keep(bucket),
            (Content::Empty, Content::Item(_, entry)) => {
                fork.edit(bucket).add_new_item(bucket, entry.clone());
            }
            (Content::Empty, Content::Child(_, child)) => {
                fork.edit(bucket).add_new_child_node(bucket, Arc::clone(child));
            }
            (Content::Item(_, a), Content::Item(_, b)) => {
                if a.hash == b.hash && a.key == b.key {
                    fork.discard(bucket);
                } else {
                    let child = Node::spawn(level.descend(), a.clone(), b.clone());
                    fork.edit(bucket).add_new_child_node(bucket, Arc::new(child));
                }
            }
            (Content::Item(_, entry), Content::Child(_, child))
            | (Content::Child(_, child), Content::Item(_, entry)) => {
                let branch = toggle(level.descend(), child, entry);
                fork.edit(bucket).add_new_child_branch(bucket, branch);
            }
            (Content::Child(_, a), Content::Child(_, b)) => {
                match symmetric_difference(level.descend(), a, b) {
                    None => fork.keep(bucket),
                    Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                }
            }
        }
    }
    fork.finish()
}

/// Removes `entry`'s key from a copy of `node` if present, inserts `entry`
/// otherwise.
fn toggle<K, V>(level: Level, node: &NodeRef<K, V>, entry: &Entry<K, V>) -> Builder<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    let mut node = Arc::clone(node);
    if remove(&mut node, level, entry.hash, &entry.key).is_none() {
        insert(&mut node, level, entry.clone());
    }
    Builder::from_node(level, node)
}

/// Toggles every entry of the collision side into a copy of the other side.
fn symmetric_difference_slow<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Builder<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    let (small, large) = if right.is_collision() {
        (right, left)
    } else {
        (left, right)
    };
    let mut result = Arc::clone(large);
    for entry in small.items() {
        if remove(&mut result, level, entry.hash, &entry.key).is_none() {
            insert(&mut result, level, entry.clone());
        }
    }
    Builder::from_node(level, result)
}
