//! Integer positions over the pre-order item sequence.
//!
//! Cached subtree counts let every conversion run in O(depth): a position is
//! the number of items before the path, summed one level at a time.

use std::borrow::Borrow;

use crate::bitmap::Slot;
use crate::hash::KeyHash;
use crate::node::{Content, Node};
use crate::ops::get::collision_slot;
use crate::path::Path;

/// Returns the path of the item at `position`; `position == count` yields
/// the end path.
///
/// # Panics
///
/// Panics if `position` is past the end.
#[must_use]
pub fn item_at<K, V>(root: &Node<K, V>, position: usize) -> Path<'_, K, V> {
    assert!(
        position <= root.count(),
        "position {position} out of bounds for {} items",
        root.count()
    );
    if position == root.count() {
        return Path::end(root);
    }
    let mut path = Path::at_root(root);
    let mut remaining = position;
    loop {
        let node = path.node();
        if remaining < node.item_count() {
            path.select_item(Slot::new(remaining));
            return path;
        }
        remaining -= node.item_count();
        for (index, child) in node.children().enumerate() {
            if remaining < child.count() {
                path.descend(Slot::new(index));
                break;
            }
            remaining -= child.count();
        }
    }
}

/// Returns the path of `key`, if present.
pub fn path_to<'a, K, V, Q>(root: &'a Node<K, V>, hash: KeyHash, key: &Q) -> Option<Path<'a, K, V>>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut path = Path::at_root(root);
    loop {
        let node = path.node();
        if node.is_collision() {
            let slot = collision_slot(node, hash, key)?;
            path.select_item(slot);
            return Some(path);
        }
        match node.content(hash.bucket(path.level())) {
            Content::Item(slot, entry) => {
                if entry.hash != hash || entry.key.borrow() != key {
                    return None;
                }
                path.select_item(slot);
                return Some(path);
            }
            Content::Child(slot, _) => path.descend(slot),
            Content::Empty => return None,
        }
    }
}

/// Counts the items of `node`'s subtree that precede `path`, which must pass
/// through `node` at `depth`.
fn offset_within<K, V>(node: &Node<K, V>, depth: usize, path: &Path<'_, K, V>) -> usize {
    let mut node = node;
    let mut offset = 0;
    for level in depth..path.level().depth() {
        let taken = path.ancestors().get(level);
        offset += node.item_count();
        offset += node
            .children()
            .take(taken.value())
            .map(|child| child.count())
            .sum::<usize>();
        node = node.child(taken);
    }
    offset + path.slot().value()
}

/// Returns the iteration position of `path`.
#[must_use]
pub fn position_of<K, V>(root: &Node<K, V>, path: &Path<'_, K, V>) -> usize {
    if path.is_end() {
        return root.count();
    }
    offset_within(root, 0, path)
}

/// Returns `position_of(to) - position_of(from)`.
///
/// Only the subtree of the paths' lowest common ancestor is summed.
#[must_use]
pub fn distance<K, V>(root: &Node<K, V>, from: &Path<'_, K, V>, to: &Path<'_, K, V>) -> isize {
    if from.is_end() || to.is_end() {
        return position_of(root, to)
            .wrapping_sub(position_of(root, from))
            .cast_signed();
    }
    let depth = from.level().depth().min(to.level().depth());
    let common = from.ancestors().common_prefix(to.ancestors(), depth);
    let mut ancestor = root;
    for level in 0..common {
        ancestor = ancestor.child(from.ancestors().get(level));
    }
    offset_within(ancestor, common, to)
        .wrapping_sub(offset_within(ancestor, common, from))
        .cast_signed()
}

/// Moves `path` by `offset` items.
///
/// If `limit` lies between the path and the target, the path stops at
/// `limit` and `false` is returned.
///
/// # Panics
///
/// Panics if the target falls outside `0..=count` without hitting `limit`.
pub fn seek<'a, K, V>(
    root: &'a Node<K, V>,
    path: &mut Path<'a, K, V>,
    offset: isize,
    limit: Option<&Path<'a, K, V>>,
) -> bool {
    let current = position_of(root, path);
    if let Some(limit) = limit {
        let bound = position_of(root, limit);
        let overshoots = if offset >= 0 {
            bound >= current && bound.abs_diff(current) < offset.unsigned_abs()
        } else {
            bound <= current && bound.abs_diff(current) < offset.unsigned_abs()
        };
        if overshoots {
            *path = *limit;
            return false;
        }
    }
    let target = current.checked_add_signed(offset);
    let Some(target) = target.filter(|&target| target <= root.count()) else {
        panic!("offset {offset} from position {current} is out of bounds");
    };
    *path = item_at(root, target);
    true
}
