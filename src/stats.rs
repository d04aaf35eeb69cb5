//! Structural diagnostics.

use std::mem;

use crate::hash::Level;
use crate::node::{Entry, Node, NodeRef};
use crate::storage::Unit;

/// Shape and memory figures of one trie, gathered in a single traversal.
///
/// Byte figures count the node header, the storage units and the reference
/// count block of every node. Shared nodes are counted once per path that
/// reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    /// Number of entries.
    pub item_count: usize,
    /// Number of nodes, root included.
    pub node_count: usize,
    /// Number of collision nodes.
    pub collision_node_count: usize,
    /// Number of entries stored in collision nodes.
    pub collision_entry_count: usize,
    /// Depth of the deepest node (the root is at depth 0).
    pub max_depth: usize,
    /// Mean depth of the node holding each entry.
    pub average_item_depth: f64,
    /// Storage units allocated across all nodes, in bytes.
    pub capacity_bytes: usize,
    /// Unused storage units across all nodes, in bytes.
    pub free_bytes: usize,
    /// Bytes holding entries.
    pub payload_bytes: usize,
    /// Every byte allocated for the nodes.
    pub gross_bytes: usize,
    /// `payload_bytes / gross_bytes`; 1.0 for an empty trie.
    pub memory_efficiency: f64,
    /// Mean number of nodes visited plus collision entries scanned to find
    /// each entry.
    pub average_lookup_chain_length: f64,
}

#[derive(Default)]
struct Totals {
    item_depths: usize,
    lookup_steps: usize,
}

impl Statistics {
    /// Gathers statistics for the trie rooted at `root`.
    #[must_use]
    pub fn gather<K, V>(root: &NodeRef<K, V>) -> Self {
        let mut stats = Self::default();
        let mut totals = Totals::default();
        stats.visit(root, Level::ROOT, &mut totals);
        if stats.item_count > 0 {
            let count = stats.item_count as f64;
            stats.average_item_depth = totals.item_depths as f64 / count;
            stats.average_lookup_chain_length = totals.lookup_steps as f64 / count;
        }
        stats.memory_efficiency = if stats.gross_bytes == 0 || stats.item_count == 0 {
            1.0
        } else {
            stats.payload_bytes as f64 / stats.gross_bytes as f64
        };
        stats
    }

    fn visit<K, V>(&mut self, node: &Node<K, V>, level: Level, totals: &mut Totals) {
        let unit = mem::size_of::<Unit<K, V>>();
        let storage = node.storage();
        let depth = level.depth();

        self.node_count += 1;
        self.max_depth = self.max_depth.max(depth);
        self.capacity_bytes += storage.capacity() * unit;
        self.free_bytes += storage.free() * unit;
        self.payload_bytes += node.item_count() * mem::size_of::<Entry<K, V>>();
        self.gross_bytes += mem::size_of::<Node<K, V>>()
            + 2 * mem::size_of::<usize>()
            + storage.capacity() * unit;

        let items = node.item_count();
        self.item_count += items;
        totals.item_depths += items * depth;
        if node.is_collision() {
            self.collision_node_count += 1;
            self.collision_entry_count += items;
            // Finding the i-th entry scans i + 1 entries after `depth + 1` nodes.
            totals.lookup_steps += items * (depth + 1) + items * (items + 1) / 2;
        } else {
            totals.lookup_steps += items * (depth + 1);
        }

        for child in node.children() {
            self.visit(child, level.descend(), totals);
        }
    }
}
