//! Positions within a trie.
//!
//! A [`Path`] names one item (or the end position) by the child slots taken
//! from the root, packed in a single word, plus the item slot in the final
//! node. It borrows the tree, so it cannot outlive it or observe a mutation.
//! Stepping re-walks from the root when it has to go up, which keeps the
//! path `Copy` and bounded by the trie depth.

use std::cmp::Ordering;
use std::fmt;

use crate::bitmap::{BITS_PER_LEVEL, Slot};
use crate::hash::{HASH_BITS, Level, MAX_DEPTH};
use crate::node::{Entry, Node};

/// Child slots taken at each depth, 5 bits per field.
///
/// The field for depth 12 only gets the 4 remaining bits, which is enough:
/// a node at depth 12 addresses 16 buckets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AncestorSlots(u64);

impl AncestorSlots {
    /// No ancestors: a path at the root.
    pub const EMPTY: Self = Self(0);

    const fn shift(depth: usize) -> u32 {
        depth as u32 * BITS_PER_LEVEL
    }

    const fn mask(depth: usize) -> u64 {
        let width = HASH_BITS - Self::shift(depth);
        if width < BITS_PER_LEVEL {
            (1 << width) - 1
        } else {
            (1 << BITS_PER_LEVEL) - 1
        }
    }

    /// Returns the child slot taken at `depth`.
    #[inline]
    #[must_use]
    pub const fn get(self, depth: usize) -> Slot {
        debug_assert!(depth < MAX_DEPTH);
        Slot::new(((self.0 >> Self::shift(depth)) & Self::mask(depth)) as usize)
    }

    /// Returns a copy recording `slot` at `depth`.
    #[inline]
    #[must_use]
    pub const fn with(self, depth: usize, slot: Slot) -> Self {
        debug_assert!(depth < MAX_DEPTH);
        let mask = Self::mask(depth);
        debug_assert!(slot.value() as u64 <= mask);
        let shift = Self::shift(depth);
        Self((self.0 & !(mask << shift)) | ((slot.value() as u64 & mask) << shift))
    }

    /// Returns a copy keeping only the fields above `depth`.
    #[inline]
    #[must_use]
    pub const fn truncated(self, depth: usize) -> Self {
        if depth >= MAX_DEPTH {
            return self;
        }
        Self(self.0 & ((1 << Self::shift(depth)) - 1))
    }

    /// Number of leading fields on which both agree, at most `limit`.
    #[must_use]
    pub fn common_prefix(self, other: Self, limit: usize) -> usize {
        (0..limit)
            .find(|&depth| self.get(depth) != other.get(depth))
            .unwrap_or(limit)
    }
}

impl fmt::Debug for AncestorSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..MAX_DEPTH).map(|depth| self.get(depth).value()))
            .finish()
    }
}

/// Position of an item in a trie, or the end position.
pub struct Path<'a, K, V> {
    node: &'a Node<K, V>,
    ancestors: AncestorSlots,
    level: Level,
    slot: Slot,
    on_item: bool,
}

impl<K, V> Clone for Path<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Path<'_, K, V> {}

impl<'a, K, V> Path<'a, K, V> {
    /// Positions at `root` without addressing anything yet.
    pub(crate) const fn at_root(root: &'a Node<K, V>) -> Self {
        Self {
            node: root,
            ancestors: AncestorSlots::EMPTY,
            level: Level::ROOT,
            slot: Slot::ZERO,
            on_item: false,
        }
    }

    /// The position past the last item.
    #[must_use]
    pub const fn end(root: &'a Node<K, V>) -> Self {
        Self::at_root(root)
    }

    /// The position of the first item, or the end for an empty trie.
    #[must_use]
    pub fn start(root: &'a Node<K, V>) -> Self {
        let mut path = Self::at_root(root);
        if root.count() > 0 {
            path.descend_to_first_item();
        }
        path
    }

    /// Returns `true` for the end position.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        !self.on_item
    }

    /// The addressed entry, `None` at the end.
    #[must_use]
    pub fn entry(&self) -> Option<&'a Entry<K, V>> {
        self.on_item.then(|| self.node.item(self.slot))
    }

    /// The addressed key-value pair, `None` at the end.
    #[must_use]
    pub fn pair(&self) -> Option<(&'a K, &'a V)> {
        self.entry().map(Entry::pair)
    }

    /// Level of the node holding the item.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Child slots taken from the root.
    #[inline]
    #[must_use]
    pub const fn ancestors(&self) -> AncestorSlots {
        self.ancestors
    }

    /// Item slot within the node holding the item.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.slot
    }

    /// Node holding the item (the root at the end position).
    #[inline]
    #[must_use]
    pub const fn node(&self) -> &'a Node<K, V> {
        self.node
    }

    pub(crate) const fn select_item(&mut self, slot: Slot) {
        self.slot = slot;
        self.on_item = true;
    }

    /// Moves into the child at `slot` of the current node.
    pub(crate) fn descend(&mut self, slot: Slot) {
        self.ancestors = self.ancestors.with(self.level.depth(), slot);
        self.node = self.node.child(slot);
        self.level = self.level.descend();
        self.slot = Slot::ZERO;
        self.on_item = false;
    }

    /// Moves to the parent of the current node, re-walking from `root`.
    ///
    /// Returns the child slot the path came from.
    pub(crate) fn ascend(&mut self, root: &'a Node<K, V>) -> Slot {
        debug_assert!(!self.level.is_at_root());
        let parent_depth = self.level.depth() - 1;
        let mut node = root;
        for depth in 0..parent_depth {
            node = node.child(self.ancestors.get(depth));
        }
        let from = self.ancestors.get(parent_depth);
        self.node = node;
        self.ancestors = self.ancestors.truncated(parent_depth);
        self.level = self.level.ascend();
        self.slot = from;
        self.on_item = false;
        from
    }

    /// Moves to the first item of the current node's subtree in pre-order.
    pub(crate) fn descend_to_first_item(&mut self) {
        while self.node.item_count() == 0 {
            self.descend(Slot::ZERO);
        }
        self.select_item(Slot::ZERO);
    }

    /// Moves to the last item of the current node's subtree in pre-order.
    pub(crate) fn descend_to_last_item(&mut self) {
        while self.node.child_count() > 0 {
            self.descend(Slot::new(self.node.child_count() - 1));
        }
        self.select_item(Slot::new(self.node.item_count() - 1));
    }

    /// Advances to the next item in iteration order.
    ///
    /// Returns `false` (and becomes the end position) when there is none.
    ///
    /// # Panics
    ///
    /// Panics if the path is already at the end.
    pub fn find_successor_item(&mut self, root: &'a Node<K, V>) -> bool {
        assert!(self.on_item, "cannot advance past the end position");
        let next = self.slot.next();
        if next.value() < self.node.item_count() {
            self.slot = next;
            return true;
        }
        if self.node.child_count() > 0 {
            self.descend(Slot::ZERO);
            self.descend_to_first_item();
            return true;
        }
        while !self.level.is_at_root() {
            let next = self.ascend(root).next();
            if next.value() < self.node.child_count() {
                self.descend(next);
                self.descend_to_first_item();
                return true;
            }
        }
        *self = Self::end(root);
        false
    }

    /// Steps back to the previous item in iteration order.
    ///
    /// Returns `false` and leaves the path unchanged when it addresses the
    /// first item (or the end of an empty trie).
    pub fn find_predecessor_item(&mut self, root: &'a Node<K, V>) -> bool {
        if !self.on_item {
            if root.count() == 0 {
                return false;
            }
            *self = Self::at_root(root);
            self.descend_to_last_item();
            return true;
        }
        if self.slot.value() > 0 {
            self.slot = self.slot.previous();
            return true;
        }
        let original = *self;
        while !self.level.is_at_root() {
            let from = self.ascend(root);
            if from.value() > 0 {
                self.descend(from.previous());
                self.descend_to_last_item();
                return true;
            }
            if self.node.item_count() > 0 {
                self.select_item(Slot::new(self.node.item_count() - 1));
                return true;
            }
        }
        *self = original;
        false
    }
}

impl<K, V> PartialEq for Path<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K, V> Eq for Path<'_, K, V> {}

impl<K, V> PartialOrd for Path<'_, K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders paths of the same trie by iteration order; the end comes last.
impl<K, V> Ord for Path<'_, K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.on_item, other.on_item) {
            (false, false) => return Ordering::Equal,
            (false, true) => return Ordering::Greater,
            (true, false) => return Ordering::Less,
            (true, true) => {}
        }
        let depth = self.level.depth().min(other.level.depth());
        let common = self.ancestors.common_prefix(other.ancestors, depth);
        if common < depth {
            return self.ancestors.get(common).cmp(&other.ancestors.get(common));
        }
        // One node is an ancestor of (or equal to) the other; its items come
        // before anything in its children.
        self.level
            .cmp(&other.level)
            .then_with(|| self.slot.cmp(&other.slot))
    }
}

impl<K, V> fmt::Debug for Path<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.on_item {
            return f.write_str("Path(end)");
        }
        f.debug_struct("Path")
            .field("level", &self.level)
            .field("ancestors", &self.ancestors)
            .field("slot", &self.slot)
            .finish()
    }
}
