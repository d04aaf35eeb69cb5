//! Subtraction: the entries of the left subtree whose keys are not in the
//! right subtree.

use std::sync::Arc;

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, Node, NodeRef};
use crate::ops::get::get;
use crate::ops::remove::remove;

/// Computes `left − right` for two subtrees at `level`.
///
/// Returns `None` when the result is `left` unchanged.
#[must_use]
pub fn subtracting<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if left.count() == 0 || right.count() == 0 {
        return None;
    }
    if Arc::ptr_eq(left, right) {
        return Some(Builder::empty(level));
    }
    if left.is_collision() || right.is_collision() {
        return subtracting_slow(level, left, right);
    }
    subtracting_regular(level, left, right)
}

fn subtracting_regular<K, V>(
    level: Level,
    left: &Node<K, V>,
    right: &Node<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    let mut fork = Fork::new(level, left);
    for bucket in left.occupancy() {
        match (left.content(bucket), right.content(bucket)) {
            (_, Content::Empty) | (Content::Empty, _) => fork.keep(bucket),
            (Content::Item(_, a), Content::Item(_, b)) => {
                if a.hash == b.hash && a.key == b.key {
                    fork.discard(bucket);
                } else {
                    fork.keep(bucket);
                }
            }
            (Content::Item(_, a), Content::Child(_, child)) => {
                if get(child, level.descend(), a.hash, &a.key).is_some() {
                    fork.discard(bucket);
                } else {
                    fork.keep(bucket);
                }
            }
            (Content::Child(_, child), Content::Item(_, b)) => {
                let below = level.descend();
                let mut child = Arc::clone(child);
                if remove(&mut child, below, b.hash, &b.key).is_some() {
                    let branch = Builder::from_node(below, child);
                    fork.edit(bucket).add_new_child_branch(bucket, branch);
                } else {
                    fork.keep(bucket);
                }
            }
            (Content::Child(_, a), Content::Child(_, b)) => {
                match subtracting(level.descend(), a, b) {
                    None => fork.keep(bucket),
                    Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                }
            }
        }
    }
    fork.finish()
}

fn subtracting_slow<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if left.is_collision() {
        return Builder::copy_collisions(level, left, |entry| {
            get(right, level, entry.hash, &entry.key).is_none()
        });
    }
    let mut result = Arc::clone(left);
    let mut changed = false;
    for entry in right.items() {
        changed |= remove(&mut result, level, entry.hash, &entry.key).is_some();
    }
    changed.then(|| Builder::from_node(level, result))
}
