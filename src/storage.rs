//! Packed per-node storage.
//!
//! Each node owns one contiguous buffer of allocation [`Unit`]s. Children are
//! packed from the front, items from the back (item slot `i` lives at unit
//! `capacity - 1 - i`), and the free region sits between them so either side
//! can grow into it. Capacities are powers of two to amortize growth.

use std::fmt;
use std::mem;

use crate::bitmap::Slot;
use crate::node::{Entry, NodeRef};

/// One allocation cell of node storage.
pub enum Unit<K, V> {
    /// Part of the free region.
    Free,
    /// A child reference (front region).
    Child(NodeRef<K, V>),
    /// A key-value entry (back region).
    Item(Entry<K, V>),
}

impl<K, V> Default for Unit<K, V> {
    fn default() -> Self {
        Self::Free
    }
}

/// Rounds a requested unit count up to an allocation size.
#[inline]
#[must_use]
pub const fn rounded_capacity(units: usize) -> usize {
    if units == 0 { 0 } else { units.next_power_of_two() }
}

/// Contiguous buffer of children (front) and items (back).
pub struct Storage<K, V> {
    units: Box<[Unit<K, V>]>,
    items: usize,
    children: usize,
}

impl<K, V> Storage<K, V> {
    /// Creates empty storage able to hold `units` items and children.
    #[must_use]
    pub fn with_capacity(units: usize) -> Self {
        let capacity = rounded_capacity(units);
        Self {
            units: std::iter::repeat_with(|| Unit::Free).take(capacity).collect(),
            items: 0,
            children: 0,
        }
    }

    /// Total number of units allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    /// Number of units in the free region.
    #[inline]
    #[must_use]
    pub fn free(&self) -> usize {
        self.units.len() - self.items - self.children
    }

    /// Number of stored items.
    #[inline]
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.items
    }

    /// Number of stored children.
    #[inline]
    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.children
    }

    #[inline]
    fn item_index(&self, slot: Slot) -> usize {
        debug_assert!(slot.value() < self.items);
        self.units.len() - 1 - slot.value()
    }

    /// Returns the item at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if the unit does not hold an item.
    #[must_use]
    pub fn item(&self, slot: Slot) -> &Entry<K, V> {
        match &self.units[self.item_index(slot)] {
            Unit::Item(entry) => entry,
            _ => panic!("storage unit at item {slot:?} is not an item"),
        }
    }

    /// Returns the item at `slot` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the unit does not hold an item.
    pub fn item_mut(&mut self, slot: Slot) -> &mut Entry<K, V> {
        let index = self.item_index(slot);
        match &mut self.units[index] {
            Unit::Item(entry) => entry,
            _ => panic!("storage unit at item {slot:?} is not an item"),
        }
    }

    /// Returns the child at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if the unit does not hold a child.
    #[must_use]
    pub fn child(&self, slot: Slot) -> &NodeRef<K, V> {
        debug_assert!(slot.value() < self.children);
        match &self.units[slot.value()] {
            Unit::Child(child) => child,
            _ => panic!("storage unit at child {slot:?} is not a child"),
        }
    }

    /// Returns the child at `slot` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the unit does not hold a child.
    pub fn child_mut(&mut self, slot: Slot) -> &mut NodeRef<K, V> {
        debug_assert!(slot.value() < self.children);
        match &mut self.units[slot.value()] {
            Unit::Child(child) => child,
            _ => panic!("storage unit at child {slot:?} is not a child"),
        }
    }

    /// Iterates over items in slot order.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &Entry<K, V>> + ExactSizeIterator {
        let start = self.units.len() - self.items;
        self.units[start..].iter().rev().map(|unit| match unit {
            Unit::Item(entry) => entry,
            _ => unreachable!("item region holds a non-item unit"),
        })
    }

    /// Iterates over children in slot order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &NodeRef<K, V>> + ExactSizeIterator {
        self.units[..self.children].iter().map(|unit| match unit {
            Unit::Child(child) => child,
            _ => unreachable!("child region holds a non-child unit"),
        })
    }

    /// Inserts `entry` at item `slot`, shifting later items toward the front.
    ///
    /// # Panics
    ///
    /// Panics if the free region is empty.
    pub fn insert_item(&mut self, slot: Slot, entry: Entry<K, V>) {
        assert!(self.free() > 0, "node storage is full");
        debug_assert!(slot.value() <= self.items);
        let capacity = self.units.len();
        let first = capacity - self.items - 1;
        let target = capacity - 1 - slot.value();
        self.units[first..=target].rotate_left(1);
        self.units[target] = Unit::Item(entry);
        self.items += 1;
    }

    /// Removes and returns the item at `slot`, closing the gap.
    pub fn remove_item(&mut self, slot: Slot) -> Entry<K, V> {
        let capacity = self.units.len();
        let target = self.item_index(slot);
        let first = capacity - self.items;
        let Unit::Item(entry) = mem::take(&mut self.units[target]) else {
            unreachable!("item region holds a non-item unit");
        };
        self.units[first..=target].rotate_right(1);
        self.items -= 1;
        entry
    }

    /// Appends `entry` after the last item slot. No shifting is needed.
    ///
    /// # Panics
    ///
    /// Panics if the free region is empty.
    pub fn push_item(&mut self, entry: Entry<K, V>) {
        self.insert_item(Slot::new(self.items), entry);
    }

    /// Inserts `child` at child `slot`, shifting later children toward the back.
    ///
    /// # Panics
    ///
    /// Panics if the free region is empty.
    pub fn insert_child(&mut self, slot: Slot, child: NodeRef<K, V>) {
        assert!(self.free() > 0, "node storage is full");
        debug_assert!(slot.value() <= self.children);
        self.units[slot.value()..=self.children].rotate_right(1);
        self.units[slot.value()] = Unit::Child(child);
        self.children += 1;
    }

    /// Removes and returns the child at `slot`, closing the gap.
    pub fn remove_child(&mut self, slot: Slot) -> NodeRef<K, V> {
        debug_assert!(slot.value() < self.children);
        let Unit::Child(child) = mem::take(&mut self.units[slot.value()]) else {
            unreachable!("child region holds a non-child unit");
        };
        self.units[slot.value()..self.children].rotate_left(1);
        self.children -= 1;
        child
    }

    /// Moves every unit into a larger buffer with at least `extra` free units.
    ///
    /// Used only on uniquely owned storage that ran out of room.
    pub fn grow(&mut self, extra: usize) {
        let mut grown = Self::with_capacity(self.items + self.children + extra);
        let capacity = grown.units.len();
        let old_capacity = self.units.len();
        for i in 0..self.children {
            grown.units[i] = mem::take(&mut self.units[i]);
        }
        for i in 0..self.items {
            grown.units[capacity - 1 - i] = mem::take(&mut self.units[old_capacity - 1 - i]);
        }
        grown.items = self.items;
        grown.children = self.children;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            from = old_capacity,
            to = capacity,
            "storage: resized in place"
        );
        *self = grown;
    }

    /// Removes and returns the only stored item, leaving the storage empty.
    ///
    /// # Panics
    ///
    /// Panics unless the storage holds exactly one item and no children.
    pub fn take_only_item(&mut self) -> Entry<K, V> {
        assert!(
            self.items == 1 && self.children == 0,
            "storage does not hold a single item"
        );
        self.remove_item(Slot::ZERO)
    }

    /// Verifies the free-region bookkeeping against the actual unit layout.
    ///
    /// # Panics
    ///
    /// Panics if any unit is out of place.
    pub fn check_layout(&self) {
        let capacity = self.units.len();
        assert!(self.items + self.children <= capacity, "storage overflow");
        for (i, unit) in self.units.iter().enumerate() {
            let ok = if i < self.children {
                matches!(unit, Unit::Child(_))
            } else if i >= capacity - self.items {
                matches!(unit, Unit::Item(_))
            } else {
                matches!(unit, Unit::Free)
            };
            assert!(ok, "storage unit {i} is out of place");
        }
    }
}

impl<K: Clone, V: Clone> Storage<K, V> {
    /// Duplicates the storage, sharing children and cloning items, leaving at
    /// least `extra` free units.
    #[must_use]
    pub fn copy(&self, extra: usize) -> Self {
        let mut copy = Self::with_capacity(self.items + self.children + extra);
        let capacity = copy.units.len();
        for (i, child) in self.children().enumerate() {
            copy.units[i] = Unit::Child(NodeRef::clone(child));
        }
        for (i, entry) in self.items().enumerate() {
            copy.units[capacity - 1 - i] = Unit::Item(entry.clone());
        }
        copy.items = self.items;
        copy.children = self.children;
        copy
    }
}

impl<K, V> fmt::Debug for Storage<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("capacity", &self.capacity())
            .field("items", &self.items)
            .field("children", &self.children)
            .field("free", &self.free())
            .finish()
    }
}
