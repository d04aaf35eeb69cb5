//! Set predicates over two subtrees: subset, disjointness and equality.
//!
//! These never allocate. Both walks prune on shared node identity, so
//! comparing a tree with a lightly edited copy of itself only visits the
//! edited paths.

use std::sync::Arc;

use crate::hash::Level;
use crate::iter::Entries;
use crate::node::{Content, Node, NodeRef};
use crate::ops::get::get;

/// Returns `true` if every key of `left` is in `right` and `values` accepts
/// each pair of values.
pub fn is_subset_by<K, V, F>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
    values: &mut F,
) -> bool
where
    K: Eq,
    F: FnMut(&V, &V) -> bool,
{
    if Arc::ptr_eq(left, right) {
        return true;
    }
    if left.count() > right.count() {
        return false;
    }
    if left.is_collision() || right.is_collision() {
        return Entries::new(left).all(|entry| {
            get(right, level, entry.hash, &entry.key)
                .is_some_and(|other| values(&entry.value, &other.value))
        });
    }
    if !left.occupancy().is_subset(right.occupancy()) {
        return false;
    }
    left.occupancy().buckets().all(|bucket| match (left.content(bucket), right.content(bucket)) {
        (Content::Item(_, a), Content::Item(_, b)) => {
            a.hash == b.hash && a.key == b.key && values(&a.value, &b.value)
        }
        (Content::Item(_, a), Content::Child(_, child)) => {
            get(child, level.descend(), a.hash, &a.key)
                .is_some_and(|b| values(&a.value, &b.value))
        }
        // A child holds at least two entries.
        (Content::Child(..), Content::Item(..)) => false,
        (Content::Child(_, a), Content::Child(_, b)) => {
            is_subset_by(level.descend(), a, b, &mut *values)
        }
        (Content::Empty, _) | (_, Content::Empty) => false,
    })
}

/// Returns `true` if every key of `left` is in `right`.
pub fn is_subset<K: Eq, V>(level: Level, left: &NodeRef<K, V>, right: &NodeRef<K, V>) -> bool {
    is_subset_by(level, left, right, &mut |_: &V, _: &V| true)
}

/// Returns `true` if both subtrees hold the same keys.
pub fn is_equal_set<K: Eq, V>(level: Level, left: &NodeRef<K, V>, right: &NodeRef<K, V>) -> bool {
    left.count() == right.count() && is_subset(level, left, right)
}

/// Returns `true` if both subtrees hold the same keys with values accepted
/// by `values`.
pub fn equals<K, V, F>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
    values: &mut F,
) -> bool
where
    K: Eq,
    F: FnMut(&V, &V) -> bool,
{
    left.count() == right.count() && is_subset_by(level, left, right, values)
}

/// Returns `true` if the subtrees share no key.
pub fn is_disjoint<K: Eq, V>(level: Level, left: &NodeRef<K, V>, right: &NodeRef<K, V>) -> bool {
    if left.count() == 0 || right.count() == 0 {
        return true;
    }
    if Arc::ptr_eq(left, right) {
        return false;
    }
    if left.is_collision() {
        return none_in(level, left, right);
    }
    if right.is_collision() {
        return none_in(level, right, left);
    }
    left.occupancy()
        .intersection(right.occupancy())
        .buckets()
        .all(|bucket| match (left.content(bucket), right.content(bucket)) {
            (Content::Item(_, a), Content::Item(_, b)) => a.hash != b.hash || a.key != b.key,
            (Content::Item(_, entry), Content::Child(_, child))
            | (Content::Child(_, child), Content::Item(_, entry)) => {
                get(child, level.descend(), entry.hash, &entry.key).is_none()
            }
            (Content::Child(_, a), Content::Child(_, b)) => is_disjoint(level.descend(), a, b),
            (Content::Empty, _) | (_, Content::Empty) => true,
        })
}

fn none_in<K: Eq, V>(level: Level, probes: &Node<K, V>, node: &Node<K, V>) -> bool {
    probes
        .items()
        .all(|entry| get(node, level, entry.hash, &entry.key).is_none())
}
