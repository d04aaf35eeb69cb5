//! Value mapping.
//!
//! [`map_values`] keeps the exact shape of the source; [`compact_map_values`]
//! may drop entries, so it always rebuilds through a [`Builder`].

use std::sync::Arc;

use crate::builder::Builder;
use crate::hash::Level;
use crate::node::{Content, Entry, Node, NodeRef};

/// Transforms every value of the subtree, keeping keys, hashes and shape.
pub fn map_values<K, V, T, F>(node: &Node<K, V>, f: &mut F) -> NodeRef<K, T>
where
    K: Clone,
    F: FnMut(&K, &V) -> T,
{
    Arc::new(node.map_values(f))
}

/// Transforms every value of the subtree at `level`, dropping the entries
/// for which `f` returns `None`.
pub fn compact_map_values<K, V, T, F>(level: Level, node: &Node<K, V>, f: &mut F) -> Builder<K, T>
where
    K: Clone,
    T: Clone,
    F: FnMut(&K, &V) -> Option<T>,
{
    if node.is_collision() {
        let entries = map_collision(node, f);
        return Builder::from_collision_entries(level, node.collision_hash(), entries);
    }
    let mut builder = Builder::empty(level);
    for bucket in node.occupancy() {
        match node.content(bucket) {
            Content::Item(_, entry) => {
                if let Some(value) = f(&entry.key, &entry.value) {
                    builder.add_new_item(bucket, Entry::new(entry.hash, entry.key.clone(), value));
                }
            }
            Content::Child(_, child) if child.is_collision() => {
                let entries = map_collision(child, f);
                builder.add_new_collision(bucket, child.collision_hash(), entries);
            }
            Content::Child(_, child) => {
                let branch = compact_map_values(level.descend(), child, f);
                builder.add_new_child_branch(bucket, branch);
            }
            Content::Empty => {}
        }
    }
    builder
}

fn map_collision<K, V, T, F>(node: &Node<K, V>, f: &mut F) -> Vec<Entry<K, T>>
where
    K: Clone,
    F: FnMut(&K, &V) -> Option<T>,
{
    node.items()
        .filter_map(|entry| {
            f(&entry.key, &entry.value)
                .map(|value| Entry::new(entry.hash, entry.key.clone(), value))
        })
        .collect()
}
