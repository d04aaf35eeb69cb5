//! CHAMP trie node types.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::{Bitmap, Bucket, Slot};
use crate::hash::{KeyHash, Level};
use crate::storage::Storage;

/// Inline entry storing a key-value pair with its precomputed hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// Precomputed hash of the key.
    pub hash: KeyHash,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry.
    #[inline]
    #[must_use]
    pub const fn new(hash: KeyHash, key: K, value: V) -> Self {
        Self { hash, key, value }
    }

    /// Returns `(&key, &value)`.
    #[inline]
    #[must_use]
    pub const fn pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("hash", &self.hash)
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Shared, reference-counted handle to a node.
pub type NodeRef<K, V> = Arc<Node<K, V>>;

/// Node kind.
///
/// - [`Regular`](Self::Regular): bitmap-addressed node
/// - [`Collision`](Self::Collision): linear node for full-hash collisions
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Bitmap-compressed node.
    ///
    /// Invariant: `item_map` and `child_map` are disjoint.
    Regular {
        /// Buckets holding an inline entry.
        item_map: Bitmap,
        /// Buckets holding a child node.
        child_map: Bitmap,
    },
    /// Collision node for keys sharing the same full hash.
    ///
    /// Invariant: at least two entries (one only transiently during removal).
    Collision {
        /// The shared hash value.
        hash: KeyHash,
    },
}

/// Content of a regular node's bucket.
pub enum Content<'a, K, V> {
    /// Nothing stored at the bucket.
    Empty,
    /// An inline entry.
    Item(Slot, &'a Entry<K, V>),
    /// A child subtree.
    Child(Slot, &'a NodeRef<K, V>),
}

/// CHAMP trie node: a header plus packed storage.
pub struct Node<K, V> {
    kind: Kind,
    count: usize,
    storage: Storage<K, V>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Creates an empty regular node. Only legal as a root.
    #[must_use]
    pub fn empty() -> Self {
        Self::regular_with_capacity(0)
    }

    /// Creates an empty regular node with room for `units` items and children.
    #[must_use]
    pub fn regular_with_capacity(units: usize) -> Self {
        Self {
            kind: Kind::Regular {
                item_map: Bitmap::EMPTY,
                child_map: Bitmap::EMPTY,
            },
            count: 0,
            storage: Storage::with_capacity(units),
        }
    }

    /// Creates a regular node holding a single item.
    #[must_use]
    pub fn with_item(level: Level, entry: Entry<K, V>) -> Self {
        let mut node = Self::regular_with_capacity(1);
        node.insert_item(entry.hash.bucket(level), entry);
        node
    }

    /// Creates a regular node holding two items in distinct buckets.
    #[must_use]
    pub fn with_two_items(level: Level, a: Entry<K, V>, b: Entry<K, V>) -> Self {
        debug_assert_ne!(a.hash.bucket(level), b.hash.bucket(level));
        let mut node = Self::regular_with_capacity(2);
        node.insert_item(a.hash.bucket(level), a);
        node.insert_item(b.hash.bucket(level), b);
        node
    }

    /// Creates a regular node holding a single child.
    #[must_use]
    pub fn with_child(bucket: Bucket, child: NodeRef<K, V>) -> Self {
        let mut node = Self::regular_with_capacity(1);
        node.insert_child(bucket, child);
        node
    }

    /// Creates a regular node holding one item and one child.
    #[must_use]
    pub fn with_item_and_child(
        item_bucket: Bucket,
        entry: Entry<K, V>,
        child_bucket: Bucket,
        child: NodeRef<K, V>,
    ) -> Self {
        debug_assert_ne!(item_bucket, child_bucket);
        let mut node = Self::regular_with_capacity(2);
        node.insert_item(item_bucket, entry);
        node.insert_child(child_bucket, child);
        node
    }

    /// Creates a collision node from entries sharing one full hash.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two entries are given.
    #[must_use]
    pub fn collision(hash: KeyHash, entries: impl IntoIterator<Item = Entry<K, V>>) -> Self {
        let entries = entries.into_iter();
        let mut storage = Storage::with_capacity(entries.size_hint().0.max(2));
        for entry in entries {
            debug_assert_eq!(entry.hash, hash);
            if storage.free() == 0 {
                storage.grow(1);
            }
            storage.push_item(entry);
        }
        assert!(
            storage.item_count() >= 2,
            "a collision node needs at least two entries"
        );
        #[cfg(feature = "tracing")]
        tracing::trace!(hash = ?hash, len = storage.item_count(), "node: collision created");
        Self {
            kind: Kind::Collision { hash },
            count: storage.item_count(),
            storage,
        }
    }

    /// Builds the subtree holding two entries that meet in the same bucket
    /// one level above `level`.
    ///
    /// Descends through single-child nodes until the hashes diverge; equal
    /// hashes produce a collision node right away.
    #[must_use]
    pub fn spawn(level: Level, a: Entry<K, V>, b: Entry<K, V>) -> Self {
        if a.hash == b.hash {
            return Self::collision(a.hash, [a, b]);
        }
        let bucket_a = a.hash.bucket(level);
        let bucket_b = b.hash.bucket(level);
        if bucket_a == bucket_b {
            #[cfg(feature = "tracing")]
            tracing::trace!(level = level.depth(), "node: spawn chain");
            let child = Self::spawn(level.descend(), a, b);
            Self::with_child(bucket_a, Arc::new(child))
        } else {
            Self::with_two_items(level, a, b)
        }
    }

    /// Materializes the regular levels above a compressed collision node so
    /// that `entry`, whose hash differs from the collision's, can sit beside it.
    #[must_use]
    pub fn expansion(level: Level, collision: NodeRef<K, V>, entry: Entry<K, V>) -> Self {
        let collision_hash = collision.collision_hash();
        debug_assert_ne!(collision_hash, entry.hash);
        let collision_bucket = collision_hash.bucket(level);
        let entry_bucket = entry.hash.bucket(level);
        if collision_bucket == entry_bucket {
            let child = Self::expansion(level.descend(), collision, entry);
            Self::with_child(collision_bucket, Arc::new(child))
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!(level = level.depth(), "node: collision expanded");
            Self::with_item_and_child(entry_bucket, entry, collision_bucket, collision)
        }
    }
}

// ---------------------------------------------------------------------------
// Read accessors
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Returns the node kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns `true` for collision nodes.
    #[inline]
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        matches!(self.kind, Kind::Collision { .. })
    }

    /// Returns `true` for regular nodes.
    #[inline]
    #[must_use]
    pub const fn is_regular(&self) -> bool {
        matches!(self.kind, Kind::Regular { .. })
    }

    /// Total number of entries in this subtree.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Number of entries held directly.
    #[inline]
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.storage.item_count()
    }

    /// Number of children (always 0 for collision nodes).
    #[inline]
    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.storage.child_count()
    }

    /// Buckets holding inline entries (empty for collision nodes).
    #[inline]
    #[must_use]
    pub const fn item_map(&self) -> Bitmap {
        match self.kind {
            Kind::Regular { item_map, .. } => item_map,
            Kind::Collision { .. } => Bitmap::EMPTY,
        }
    }

    /// Buckets holding children (empty for collision nodes).
    #[inline]
    #[must_use]
    pub const fn child_map(&self) -> Bitmap {
        match self.kind {
            Kind::Regular { child_map, .. } => child_map,
            Kind::Collision { .. } => Bitmap::EMPTY,
        }
    }

    /// Buckets holding anything.
    #[inline]
    #[must_use]
    pub const fn occupancy(&self) -> Bitmap {
        self.item_map().union(self.child_map())
    }

    /// Returns the shared hash of a collision node.
    ///
    /// # Panics
    ///
    /// Panics on regular nodes.
    #[inline]
    #[must_use]
    pub fn collision_hash(&self) -> KeyHash {
        match self.kind {
            Kind::Collision { hash } => hash,
            Kind::Regular { .. } => panic!("regular node has no collision hash"),
        }
    }

    /// Returns the entry at item `slot`.
    #[inline]
    #[must_use]
    pub fn item(&self, slot: Slot) -> &Entry<K, V> {
        self.storage.item(slot)
    }

    /// Returns the child at `slot`.
    #[inline]
    #[must_use]
    pub fn child(&self, slot: Slot) -> &NodeRef<K, V> {
        self.storage.child(slot)
    }

    /// Iterates over the entries held directly, in slot order.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &Entry<K, V>> + ExactSizeIterator {
        self.storage.items()
    }

    /// Iterates over the children, in slot order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &NodeRef<K, V>> + ExactSizeIterator {
        self.storage.children()
    }

    /// Classifies what a regular node stores at `bucket`.
    #[must_use]
    pub fn content(&self, bucket: Bucket) -> Content<'_, K, V> {
        let item_map = self.item_map();
        if item_map.contains(bucket) {
            let slot = item_map.slot_of(bucket);
            return Content::Item(slot, self.item(slot));
        }
        let child_map = self.child_map();
        if child_map.contains(bucket) {
            let slot = child_map.slot_of(bucket);
            return Content::Child(slot, self.child(slot));
        }
        Content::Empty
    }

    /// Returns `true` if the node holds exactly one item and nothing else.
    ///
    /// Such a node is only legal as the root; elsewhere it is inlined into
    /// its parent.
    #[inline]
    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        self.item_count() == 1 && self.child_count() == 0
    }

    /// Returns `true` if the node has no items and a single collision child.
    #[must_use]
    pub fn is_atrophied(&self) -> bool {
        self.is_regular()
            && self.item_count() == 0
            && self.child_count() == 1
            && self.child(Slot::ZERO).is_collision()
    }

    /// Returns the storage (read-only).
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &Storage<K, V> {
        &self.storage
    }
}

// ---------------------------------------------------------------------------
// Mutation (caller guarantees unique ownership and enough free units)
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Returns the entry at item `slot` mutably.
    #[inline]
    pub fn item_mut(&mut self, slot: Slot) -> &mut Entry<K, V> {
        self.storage.item_mut(slot)
    }

    /// Returns the child at `slot` mutably.
    #[inline]
    pub fn child_mut(&mut self, slot: Slot) -> &mut NodeRef<K, V> {
        self.storage.child_mut(slot)
    }

    /// Adjusts the cached count after a descendant gained an entry.
    #[inline]
    pub const fn count_inserted(&mut self) {
        self.count += 1;
    }

    /// Adjusts the cached count after a descendant lost an entry.
    #[inline]
    pub const fn count_removed(&mut self) {
        self.count -= 1;
    }

    /// Places `entry` at `bucket` of a regular node.
    pub fn insert_item(&mut self, bucket: Bucket, entry: Entry<K, V>) {
        let Kind::Regular { item_map, child_map } = &mut self.kind else {
            panic!("insert_item on a collision node");
        };
        debug_assert!(!child_map.contains(bucket));
        let slot = item_map.slot_of(bucket);
        item_map.insert(bucket);
        self.storage.insert_item(slot, entry);
        self.count += 1;
    }

    /// Removes and returns the entry at `bucket` of a regular node.
    pub fn remove_item(&mut self, bucket: Bucket) -> Entry<K, V> {
        let Kind::Regular { item_map, .. } = &mut self.kind else {
            panic!("remove_item on a collision node");
        };
        let slot = item_map.slot_of(bucket);
        item_map.remove(bucket);
        self.count -= 1;
        self.storage.remove_item(slot)
    }

    /// Places `child` at `bucket` of a regular node.
    pub fn insert_child(&mut self, bucket: Bucket, child: NodeRef<K, V>) {
        let Kind::Regular { item_map, child_map } = &mut self.kind else {
            panic!("insert_child on a collision node");
        };
        debug_assert!(!item_map.contains(bucket));
        let slot = child_map.slot_of(bucket);
        child_map.insert(bucket);
        self.count += child.count();
        self.storage.insert_child(slot, child);
    }

    /// Removes and returns the child at `bucket` of a regular node.
    pub fn remove_child(&mut self, bucket: Bucket) -> NodeRef<K, V> {
        let Kind::Regular { child_map, .. } = &mut self.kind else {
            panic!("remove_child on a collision node");
        };
        let slot = child_map.slot_of(bucket);
        child_map.remove(bucket);
        let child = self.storage.remove_child(slot);
        self.count -= child.count();
        child
    }

    /// Appends an entry to a collision node.
    pub fn append_collision(&mut self, entry: Entry<K, V>) {
        debug_assert_eq!(entry.hash, self.collision_hash());
        self.storage.push_item(entry);
        self.count += 1;
    }

    /// Removes the entry at `slot` of a collision node.
    ///
    /// A node left with a single entry becomes a regular node at `level`.
    pub fn remove_collision(&mut self, level: Level, slot: Slot) -> Entry<K, V> {
        debug_assert!(self.is_collision());
        let removed = self.storage.remove_item(slot);
        self.count -= 1;
        if self.storage.item_count() == 1 {
            let bucket = self.collision_hash().bucket(level);
            self.kind = Kind::Regular {
                item_map: Bitmap::single(bucket),
                child_map: Bitmap::EMPTY,
            };
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Copy-on-write admission
// ---------------------------------------------------------------------------

impl<K: Clone, V: Clone> Node<K, V> {
    /// Duplicates this node into fresh storage with at least `extra` free units.
    ///
    /// Children are shared, entries are cloned.
    #[must_use]
    pub fn copy(&self, extra: usize) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(count = self.count, extra, "node: copied shared node");
        Self {
            kind: self.kind,
            count: self.count,
            storage: self.storage.copy(extra),
        }
    }

    /// Returns a mutable view of `node` with at least `extra` free units.
    ///
    /// A uniquely owned node is mutated in place (grown first if it is out of
    /// room); a shared node is copied so other owners keep their view.
    pub fn make_mut(node: &mut NodeRef<K, V>, extra: usize) -> &mut Self {
        if Arc::get_mut(node).is_none() {
            *node = Arc::new(node.copy(extra));
        }
        let this = Arc::make_mut(node);
        if this.storage.free() < extra {
            this.storage.grow(extra);
        }
        this
    }

    /// Extracts the single entry of a singleton node, moving it out when the
    /// node is not shared.
    #[must_use]
    pub fn into_only_item(node: NodeRef<K, V>) -> Entry<K, V> {
        debug_assert_eq!(node.item_count(), 1);
        match Arc::try_unwrap(node) {
            Ok(mut owned) => owned.storage.take_only_item(),
            Err(shared) => shared.item(Slot::ZERO).clone(),
        }
    }
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        self.copy(0)
    }
}

// ---------------------------------------------------------------------------
// Value mapping
// ---------------------------------------------------------------------------

impl<K: Clone, V> Node<K, V> {
    /// Builds a node with the same shape whose values are transformed by `f`.
    pub fn map_values<T, F>(&self, f: &mut F) -> Node<K, T>
    where
        F: FnMut(&K, &V) -> T,
    {
        let mut storage = Storage::with_capacity(self.item_count() + self.child_count());
        for entry in self.items() {
            let value = f(&entry.key, &entry.value);
            storage.push_item(Entry::new(entry.hash, entry.key.clone(), value));
        }
        for child in self.children() {
            storage.insert_child(
                Slot::new(storage.child_count()),
                Arc::new(child.map_values(f)),
            );
        }
        Node {
            kind: self.kind,
            count: self.count,
            storage,
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

impl<K: Eq, V> Node<K, V> {
    /// Verifies the structural invariants of the subtree rooted here.
    ///
    /// `path_hash` carries the bucket bits consumed above `level`; every entry
    /// in the subtree must agree with it up to `level`.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    pub fn check_invariants(&self, level: Level, path_hash: KeyHash, is_root: bool) {
        self.storage.check_layout();
        match self.kind {
            Kind::Collision { hash } => {
                assert!(
                    self.item_count() >= 2,
                    "collision node with {} entries",
                    self.item_count()
                );
                assert_eq!(self.child_count(), 0, "collision node with children");
                assert!(
                    hash.is_equal_up_to(path_hash, level),
                    "collision hash disagrees with its path"
                );
                for (i, entry) in self.items().enumerate() {
                    assert_eq!(entry.hash, hash, "collision entry hash mismatch");
                    for other in self.items().skip(i + 1) {
                        assert!(entry.key != other.key, "duplicate key in collision node");
                    }
                }
                assert_eq!(self.count, self.item_count(), "collision count mismatch");
            }
            Kind::Regular { item_map, child_map } => {
                assert!(item_map.is_disjoint(child_map), "item and child maps overlap");
                assert_eq!(item_map.count(), self.item_count(), "item map size mismatch");
                assert_eq!(child_map.count(), self.child_count(), "child map size mismatch");
                if !is_root {
                    assert!(!self.is_singleton(), "non-root node holds a single item");
                    assert!(self.count > 0, "non-root node is empty");
                }
                assert!(!self.is_atrophied(), "atrophied node");
                let mut total = self.item_count();
                for ((bucket, _), entry) in item_map.slots().zip(self.items()) {
                    assert!(
                        entry.hash.is_equal_up_to(path_hash, level),
                        "entry hash disagrees with its path"
                    );
                    assert_eq!(entry.hash.bucket(level), bucket, "entry in wrong bucket");
                }
                for ((bucket, _), child) in child_map.slots().zip(self.children()) {
                    let bits = u64::from(bucket.value())
                        .checked_shl(level.shift())
                        .unwrap_or(0);
                    let below = KeyHash::new(path_hash.raw() | bits);
                    child.check_invariants(level.descend(), below, false);
                    if child.is_collision() {
                        assert_eq!(
                            child.collision_hash().bucket(level),
                            bucket,
                            "collision child in wrong bucket"
                        );
                    }
                    total += child.count();
                }
                assert_eq!(self.count, total, "cached count mismatch");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls
// ---------------------------------------------------------------------------

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular { item_map, child_map } => f
                .debug_struct("Regular")
                .field("item_map", item_map)
                .field("child_map", child_map)
                .finish(),
            Self::Collision { hash } => f.debug_struct("Collision").field("hash", hash).finish(),
        }
    }
}

impl<K, V> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("count", &self.count)
            .field("storage", &self.storage)
            .finish()
    }
}
