//! Insert operation: places or replaces an entry with copy-on-write.
//!
//! Each level first classifies where the entry belongs, then admits the
//! node for mutation through [`Node::make_mut`]: a uniquely owned node is
//! written in place (grown if full), a shared one is copied first.

use std::mem;
use std::sync::Arc;

use crate::bitmap::{Bucket, Slot};
use crate::hash::{KeyHash, Level};
use crate::node::{Content, Entry, Kind, Node, NodeRef};
use crate::ops::get::collision_slot;

/// Where an entry lands in a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// The key is present at this item slot: replace its value.
    Found(Slot),
    /// The bucket is empty: place the entry directly.
    Insert(Bucket),
    /// The bucket holds a different key at this item slot: push both down.
    SpawnChild(Bucket, Slot),
    /// The bucket holds a child at this slot: recurse.
    Descend(Bucket, Slot),
    /// Collision node without the key: append.
    AppendCollision,
    /// Collision node on a compressed path whose hash diverges from the
    /// entry's: materialize the missing regular levels.
    Expansion,
}

/// Classifies where an entry with `hash` and `key` belongs in `node`.
#[must_use]
pub fn find_for_insertion<K: Eq, V>(
    node: &Node<K, V>,
    level: Level,
    hash: KeyHash,
    key: &K,
) -> InsertionPoint {
    match node.kind() {
        Kind::Collision { hash: shared } => {
            if shared != hash {
                return InsertionPoint::Expansion;
            }
            collision_slot(node, hash, key)
                .map_or(InsertionPoint::AppendCollision, InsertionPoint::Found)
        }
        Kind::Regular { .. } => {
            let bucket = hash.bucket(level);
            match node.content(bucket) {
                Content::Item(slot, entry) if entry.hash == hash && entry.key == *key => {
                    InsertionPoint::Found(slot)
                }
                Content::Item(slot, _) => InsertionPoint::SpawnChild(bucket, slot),
                Content::Child(slot, _) => InsertionPoint::Descend(bucket, slot),
                Content::Empty => InsertionPoint::Insert(bucket),
            }
        }
    }
}

/// Inserts `entry` into the subtree rooted at `node`, which sits at `level`.
///
/// Returns the previous value if the key was already present; the stored key
/// is kept in that case.
pub fn insert<K, V>(node: &mut NodeRef<K, V>, level: Level, entry: Entry<K, V>) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
{
    match find_for_insertion(node, level, entry.hash, &entry.key) {
        InsertionPoint::Found(slot) => {
            let this = Node::make_mut(node, 0);
            Some(mem::replace(&mut this.item_mut(slot).value, entry.value))
        }
        InsertionPoint::Insert(bucket) => {
            Node::make_mut(node, 1).insert_item(bucket, entry);
            None
        }
        InsertionPoint::SpawnChild(bucket, slot) => {
            if node.is_singleton() && node.item(slot).hash == entry.hash {
                // Only the root can be a singleton; a collision child here
                // would leave it atrophied, so the root becomes the collision.
                let only = mem::replace(node, Arc::new(Node::empty()));
                let existing = Node::into_only_item(only);
                *node = Arc::new(Node::collision(entry.hash, [existing, entry]));
                return None;
            }
            let this = Node::make_mut(node, 0);
            let existing = this.remove_item(bucket);
            let child = Node::spawn(level.descend(), existing, entry);
            this.insert_child(bucket, Arc::new(child));
            None
        }
        InsertionPoint::Descend(_, slot) => {
            let this = Node::make_mut(node, 0);
            let old = insert(this.child_mut(slot), level.descend(), entry);
            if old.is_none() {
                this.count_inserted();
            }
            old
        }
        InsertionPoint::AppendCollision => {
            Node::make_mut(node, 1).append_collision(entry);
            None
        }
        InsertionPoint::Expansion => {
            let collision = Arc::clone(node);
            *node = Arc::new(Node::expansion(level, collision, entry));
            None
        }
    }
}
