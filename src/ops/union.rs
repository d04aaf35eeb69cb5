//! Union of two subtrees. Entries of the left subtree win on shared keys.

use std::sync::Arc;

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, Node, NodeRef};
use crate::ops::get::get;
use crate::ops::insert::insert;

/// Computes `left ∪ right` for two subtrees at `level`.
///
/// Returns `None` when the result is `left` unchanged.
#[must_use]
pub fn union<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if Arc::ptr_eq(left, right) || right.count() == 0 {
        return None;
    }
    if left.count() == 0 {
        return Some(Builder::from_node(level, Arc::clone(right)));
    }
    if left.is_collision() || right.is_collision() {
        return union_slow(level, left, right);
    }
    union_regular(level, left, right)
}

fn union_regular<K, V>(level: Level, left: &Node<K, V>, right: &Node<K, V>) -> Option<Builder<K, V>>
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
                    fork.keep(bucket);
                } else {
                    let child = Node::spawn(level.descend(), a.clone(), b.clone());
                    fork.edit(bucket).add_new_child_node(bucket, Arc::new(child));
                }
            }
            (Content::Item(_, a), Content::Child(_, child)) => {
                // The left entry overrides the right one, if any.
                let mut child = Arc::clone(child);
                insert(&mut child, level.descend(), a.clone());
                fork.edit(bucket).add_new_child_node(bucket, child);
            }
            (Content::Child(_, child), Content::Item(_, b)) => {
                let below = level.descend();
                if get(child, below, b.hash, &b.key).is_some() {
                    fork.keep(bucket);
                } else {
                    let mut child = Arc::clone(child);
                    insert(&mut child, below, b.clone());
                    fork.edit(bucket).add_new_child_node(bucket, child);
                }
            }
            (Content::Child(_, a), Content::Child(_, b)) => {
                match union(level.descend(), a, b) {
                    None => fork.keep(bucket),
                    Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                }
            }
        }
    }
    fork.finish()
}

/// At least one side is a collision node: insert the smaller side entry by
/// entry. Collision nodes are tiny, so this stays cheap.
fn union_slow<K, V>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if left.is_collision() {
        // Left entries override whatever right holds.
        let mut result = Arc::clone(right);
        for entry in left.items() {
            insert(&mut result, level, entry.clone());
        }
        return Some(Builder::from_node(level, result));
    }
    let mut result = Arc::clone(left);
    let mut changed = false;
    for entry in right.items() {
        if get(&result, level, entry.hash, &entry.key).is_none() {
            insert(&mut result, level, entry.clone());
            changed = true;
        }
    }
    changed.then(|| Builder::from_node(level, result))
}
