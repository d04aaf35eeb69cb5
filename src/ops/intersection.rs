//! Intersection of two subtrees. Entries of the left subtree are kept.

use std::sync::Arc;

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, Node, NodeRef};
use crate::ops::get::get;
use crate::ops::insert::insert;

/// Computes `left ∩ right` for two subtrees at `level`.
///
/// Returns `None` when the result is `left` unchanged.
#[must_use]
pub fn intersection<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if Arc::ptr_eq(left, right) || left.count() == 0 {
        return None;
    }
    if right.count() == 0 {
        return Some(Builder::empty(level));
    }
    if left.is_collision() || right.is_collision() {
        return intersection_slow(level, left, right);
    }
    intersection_regular(level, left, right)
}

fn intersection_regular<K, V>(
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
            (_, Content::Empty) | (Content::Empty, _) => fork.discard(bucket),
            (Content::Item(_, a), Content::Item(_, b)) => {
                if a.hash == b.hash && a.key == b.key {
                    fork.keep(bucket);
                } else {
                    fork.discard(bucket);
                }
            }
            (Content::Item(_, a), Content::Child(_, child)) => {
                if get(child, level.descend(), a.hash, &a.key).is_some() {
                    fork.keep(bucket);
                } else {
                    fork.discard(bucket);
                }
            }
            (Content::Child(_, child), Content::Item(_, b)) => {
                // A child holds at least two entries, so the result is at most
                // the one entry matching `b`.
                let builder = fork.edit(bucket);
                if let Some(entry) = get(child, level.descend(), b.hash, &b.key) {
                    builder.add_new_item(bucket, entry.clone());
                }
            }
            (Content::Child(_, a), Content::Child(_, b)) => {
                match intersection(level.descend(), a, b) {
                    None => fork.keep(bucket),
                    Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                }
            }
        }
    }
    fork.finish()
}

fn intersection_slow<K, V>(
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
            get(right, level, entry.hash, &entry.key).is_some()
        });
    }
    // The right side is a collision node: the result holds at most its
    // entries, taken from the left.
    let mut result = Arc::new(Node::empty());
    for entry in right.items() {
        if let Some(kept) = get(left, level, entry.hash, &entry.key) {
            insert(&mut result, level, kept.clone());
        }
    }
    if result.count() == left.count() {
        return None;
    }
    Some(Builder::from_node(level, result))
}

