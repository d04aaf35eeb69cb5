//! Lookup operation: walks the trie level by level to find a key.

use std::borrow::Borrow;

use crate::bitmap::Slot;
use crate::hash::{KeyHash, Level};
use crate::node::{Content, Entry, Kind, Node};

/// Searches for `key` in the subtree rooted at `node`, which sits at `level`.
///
/// Returns the matching entry if found. Never allocates.
pub fn get<'a, K, V, Q>(
    node: &'a Node<K, V>,
    level: Level,
    hash: KeyHash,
    key: &Q,
) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut node = node;
    let mut level = level;
    loop {
        if node.is_collision() {
            let slot = collision_slot(node, hash, key)?;
            return Some(node.item(slot));
        }
        match node.content(hash.bucket(level)) {
            Content::Item(_, entry) => {
                return (entry.hash == hash && entry.key.borrow() == key).then_some(entry);
            }
            // Position has a child subtree: keep walking.
            Content::Child(_, child) => {
                node = child;
                level = level.descend();
            }
            Content::Empty => return None,
        }
    }
}

/// Locates `key` inside a collision node by linear scan.
///
/// A mismatching full hash short-circuits: a collision node on a compressed
/// path shares only a prefix with the hashes routed to it.
pub fn collision_slot<K, V, Q>(node: &Node<K, V>, hash: KeyHash, key: &Q) -> Option<Slot>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let Kind::Collision { hash: shared } = node.kind() else {
        return None;
    };
    if shared != hash {
        return None;
    }
    node.items()
        .position(|entry| entry.key.borrow() == key)
        .map(Slot::new)
}

/// Returns `true` if the subtree holds `key`.
#[inline]
pub fn contains_key<K, V, Q>(node: &Node<K, V>, level: Level, hash: KeyHash, key: &Q) -> bool
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    get(node, level, hash, key).is_some()
}
