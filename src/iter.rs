//! Iterator types for [`HashTree`](crate::HashTree).
//!
//! Traversal is pre-order: a node's items come before its children, and
//! children are visited left to right. The stack is a fixed-capacity array
//! sized for the deepest possible trie, so iterating never allocates.

use std::iter::FusedIterator;

use arrayvec::ArrayVec;

use crate::bitmap::Slot;
use crate::hash::MAX_DEPTH;
use crate::node::{Entry, Node};

/// Stack capacity: one frame per level plus the bottom collision level.
const STACK_DEPTH: usize = MAX_DEPTH + 1;

/// One node on the traversal stack with its cursors.
struct Frame<'a, K, V> {
    node: &'a Node<K, V>,
    item: usize,
    child: usize,
}

impl<K, V> Clone for Frame<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            item: self.item,
            child: self.child,
        }
    }
}

/// Iterator over the entries of a subtree.
pub struct Entries<'a, K, V> {
    stack: ArrayVec<Frame<'a, K, V>, STACK_DEPTH>,
    remaining: usize,
}

impl<'a, K, V> Entries<'a, K, V> {
    /// Starts a traversal of the subtree rooted at `root`.
    #[must_use]
    pub fn new(root: &'a Node<K, V>) -> Self {
        let mut stack = ArrayVec::new();
        if root.count() > 0 {
            stack.push(Frame {
                node: root,
                item: 0,
                child: 0,
            });
        }
        Self {
            stack,
            remaining: root.count(),
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            if frame.item < node.item_count() {
                let entry = node.item(Slot::new(frame.item));
                frame.item += 1;
                self.remaining -= 1;
                return Some(entry);
            }
            if frame.child < node.child_count() {
                let child = node.child(Slot::new(frame.child));
                frame.child += 1;
                self.stack.push(Frame {
                    node: child,
                    item: 0,
                    child: 0,
                });
            } else {
                self.stack.pop();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Entries<'_, K, V> {}

impl<K, V> FusedIterator for Entries<'_, K, V> {}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over references to key-value pairs of a [`HashTree`](crate::HashTree).
pub struct Iter<'a, K, V> {
    entries: Entries<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        Self {
            entries: Entries::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Entry::pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

/// Iterator over the keys of a [`HashTree`](crate::HashTree).
pub struct Keys<'a, K, V> {
    entries: Entries<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        Self {
            entries: Entries::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| &entry.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over the values of a [`HashTree`](crate::HashTree).
pub struct Values<'a, K, V> {
    entries: Entries<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        Self {
            entries: Entries::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| &entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}
