//! Lazy subtree construction for the bulk algorithms.
//!
//! A [`Builder`] describes the result of an algorithm at one level before
//! any node is materialized: nothing, a lone item, a regular node, or a
//! collision node. Lone items and collision nodes are kept unwrapped so the
//! parent can inline or compress them, which keeps every result in canonical
//! form without a separate normalization pass.
//!
//! A [`Fork`] tracks an algorithm that walks a source node bucket by bucket
//! and may or may not diverge from it. Until the first edit it holds nothing;
//! the first edit copies the untouched prefix into a builder.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::{Bitmap, Bucket, Slot};
use crate::hash::{KeyHash, Level};
use crate::node::{Content, Entry, Node, NodeRef};

enum State<K, V> {
    Empty,
    Item(Bucket, Entry<K, V>),
    Node(NodeRef<K, V>),
    Collision(NodeRef<K, V>),
}

/// Subtree under construction at a fixed level.
pub struct Builder<K, V> {
    level: Level,
    state: State<K, V>,
}

impl<K, V> Builder<K, V> {
    /// Creates a builder for an empty subtree.
    #[must_use]
    pub const fn empty(level: Level) -> Self {
        Self {
            level,
            state: State::Empty,
        }
    }

    /// Creates a builder holding a single item.
    #[must_use]
    pub fn item(level: Level, entry: Entry<K, V>) -> Self {
        Self {
            level,
            state: State::Item(entry.hash.bucket(level), entry),
        }
    }

    /// Level of the node this builder produces.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Returns `true` if nothing has been added.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.state, State::Empty)
    }

    /// Number of entries described by the builder.
    #[must_use]
    pub fn count(&self) -> usize {
        match &self.state {
            State::Empty => 0,
            State::Item(..) => 1,
            State::Node(node) | State::Collision(node) => node.count(),
        }
    }

    /// Materializes the builder as a root node.
    #[must_use]
    pub fn finalize(self) -> NodeRef<K, V> {
        match self.state {
            State::Empty => Arc::new(Node::empty()),
            State::Item(_, entry) => Arc::new(Node::with_item(self.level, entry)),
            State::Node(node) | State::Collision(node) => node,
        }
    }
}

impl<K: Clone, V: Clone> Builder<K, V> {
    /// Wraps an existing subtree, normalizing roots that are illegal below
    /// the top: empty nodes, singletons and atrophied nodes.
    #[must_use]
    pub fn from_node(level: Level, node: NodeRef<K, V>) -> Self {
        let state = if node.is_collision() {
            State::Collision(node)
        } else if node.count() == 0 {
            State::Empty
        } else if node.is_singleton() {
            let entry = Node::into_only_item(node);
            State::Item(entry.hash.bucket(level), entry)
        } else if node.is_atrophied() {
            State::Collision(Arc::clone(node.child(Slot::ZERO)))
        } else {
            State::Node(node)
        };
        Self { level, state }
    }

    /// Builds the subtree holding `entries`, which all share `hash`.
    #[must_use]
    pub fn from_collision_entries(
        level: Level,
        hash: KeyHash,
        mut entries: Vec<Entry<K, V>>,
    ) -> Self {
        let state = match entries.len() {
            0 => State::Empty,
            1 => {
                let entry = entries.remove(0);
                State::Item(hash.bucket(level), entry)
            }
            _ => State::Collision(Arc::new(Node::collision(hash, entries))),
        };
        Self { level, state }
    }

    /// Builds the result of keeping only the entries of collision node
    /// `source` accepted by `keep`.
    ///
    /// Returns `None` if every entry is kept.
    #[must_use]
    pub fn copy_collisions<F>(level: Level, source: &NodeRef<K, V>, mut keep: F) -> Option<Self>
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let kept: Vec<_> = source.items().filter(|entry| keep(entry)).cloned().collect();
        if kept.len() == source.item_count() {
            return None;
        }
        Some(Self::from_collision_entries(
            level,
            source.collision_hash(),
            kept,
        ))
    }

    /// Converts the current state into a regular node with room for `extra`
    /// more units, and returns it mutably.
    fn regular_mut(&mut self, extra: usize) -> &mut Node<K, V> {
        let level = self.level;
        let state = std::mem::replace(&mut self.state, State::Empty);
        let node = match state {
            State::Empty => Arc::new(Node::regular_with_capacity(extra)),
            State::Item(bucket, entry) => {
                let mut node = Node::regular_with_capacity(1 + extra);
                node.insert_item(bucket, entry);
                Arc::new(node)
            }
            State::Collision(collision) => {
                let bucket = collision.collision_hash().bucket(level);
                Arc::new(Node::with_child(bucket, collision))
            }
            State::Node(node) => node,
        };
        self.state = State::Node(node);
        let State::Node(node) = &mut self.state else {
            unreachable!("builder state was just set to a regular node");
        };
        Node::make_mut(node, extra)
    }

    /// Adds an entry at `bucket`.
    pub fn add_new_item(&mut self, bucket: Bucket, entry: Entry<K, V>) {
        debug_assert_eq!(entry.hash.bucket(self.level), bucket);
        if self.is_empty() {
            self.state = State::Item(bucket, entry);
            return;
        }
        self.regular_mut(1).insert_item(bucket, entry);
    }

    /// Adds a finished subtree (valid one level down) at `bucket`.
    ///
    /// A collision node added to an empty builder is kept unwrapped, so the
    /// parent links it directly (path compression).
    pub fn add_new_child_node(&mut self, bucket: Bucket, child: NodeRef<K, V>) {
        if child.is_collision() && self.is_empty() {
            self.state = State::Collision(child);
            return;
        }
        self.regular_mut(1).insert_child(bucket, child);
    }

    /// Adds the result of a nested builder at `bucket`.
    ///
    /// Single items are inlined and empty results are dropped.
    pub fn add_new_child_branch(&mut self, bucket: Bucket, branch: Self) {
        debug_assert_eq!(branch.level, self.level.descend());
        match branch.state {
            State::Empty => {}
            State::Item(_, entry) => self.add_new_item(bucket, entry),
            State::Node(node) | State::Collision(node) => self.add_new_child_node(bucket, node),
        }
    }

    /// Adds a subtree made of `entries`, all sharing `hash`, at `bucket`.
    pub fn add_new_collision(&mut self, bucket: Bucket, hash: KeyHash, entries: Vec<Entry<K, V>>) {
        let branch = Self::from_collision_entries(self.level.descend(), hash, entries);
        self.add_new_child_branch(bucket, branch);
    }

    /// Copies the items of regular node `source` whose buckets are in
    /// `selector`.
    pub fn copy_items(&mut self, source: &Node<K, V>, selector: Bitmap) {
        for (bucket, slot) in source.item_map().slots() {
            if selector.contains(bucket) {
                self.add_new_item(bucket, source.item(slot).clone());
            }
        }
    }

    /// Copies the items and children of regular node `source` whose buckets
    /// are in `selector`. Children are shared, not copied.
    pub fn copy_items_and_children(&mut self, source: &Node<K, V>, selector: Bitmap) {
        self.copy_items(source, selector);
        for (bucket, slot) in source.child_map().slots() {
            if selector.contains(bucket) {
                self.add_new_child_node(bucket, Arc::clone(source.child(slot)));
            }
        }
    }

    /// Copies whatever `source` stores at `bucket`.
    pub fn copy_bucket(&mut self, source: &Node<K, V>, bucket: Bucket) {
        match source.content(bucket) {
            Content::Item(_, entry) => self.add_new_item(bucket, entry.clone()),
            Content::Child(_, child) => self.add_new_child_node(bucket, Arc::clone(child)),
            Content::Empty => {}
        }
    }
}

impl<K, V> fmt::Debug for Builder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Empty => "Empty",
            State::Item(..) => "Item",
            State::Node(_) => "Node",
            State::Collision(_) => "Collision",
        };
        f.debug_struct("Builder")
            .field("level", &self.level)
            .field("state", &state)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Fork
// ---------------------------------------------------------------------------

/// Lazy divergence from a regular source node.
///
/// Buckets must be visited in ascending order, each at most once, and every
/// occupied bucket of the source must be visited by [`keep`](Self::keep) or
/// [`edit`](Self::edit).
pub struct Fork<'a, K, V> {
    source: &'a Node<K, V>,
    level: Level,
    builder: Option<Builder<K, V>>,
}

impl<'a, K: Clone, V: Clone> Fork<'a, K, V> {
    /// Starts walking `source`, a regular node at `level`.
    #[must_use]
    pub const fn new(level: Level, source: &'a Node<K, V>) -> Self {
        Self {
            source,
            level,
            builder: None,
        }
    }

    /// Keeps the source's content at `bucket`.
    pub fn keep(&mut self, bucket: Bucket) {
        if let Some(builder) = &mut self.builder {
            builder.copy_bucket(self.source, bucket);
        }
    }

    /// Diverges at `bucket`: the source's content there is dropped and the
    /// returned builder receives the replacement, if any.
    pub fn edit(&mut self, bucket: Bucket) -> &mut Builder<K, V> {
        let source = self.source;
        let level = self.level;
        self.builder.get_or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::trace!(level = level.depth(), bucket = bucket.value(), "fork: diverged");
            let mut builder = Builder::empty(level);
            builder.copy_items_and_children(source, Bitmap::below(bucket));
            builder
        })
    }

    /// Drops the source's content at `bucket`.
    pub fn discard(&mut self, bucket: Bucket) {
        self.edit(bucket);
    }

    /// Returns the builder, or `None` if the source is the result unchanged.
    #[must_use]
    pub fn finish(self) -> Option<Builder<K, V>> {
        self.builder
    }
}
