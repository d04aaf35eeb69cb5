//! Generic three-way combine.
//!
//! Every key falls in exactly one region: left only, right only, or both.
//! A [`Strategy`] picks an [`Action`] per region; [`Action::Merge`] defers to
//! a callback receiving the key and whichever values exist.

use std::sync::Arc;

use crate::builder::{Builder, Fork};
use crate::hash::Level;
use crate::node::{Content, Entry, Node, NodeRef};
use crate::ops::get::get;
use crate::ops::insert::insert;
use crate::ops::map_values::compact_map_values;
use crate::ops::remove::remove;

/// What to do with the keys of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Keep the entry. For keys on both sides the left entry is kept.
    Include,
    /// Drop the entry.
    Discard,
    /// Ask the callback; `None` drops the key.
    Merge,
}

/// Per-region actions of a combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    /// Keys present only in the left input.
    pub left_only: Action,
    /// Keys present only in the right input.
    pub right_only: Action,
    /// Keys present in both inputs.
    pub both: Action,
}

impl Strategy {
    /// Keeps every key; left values win.
    pub const UNION: Self = Self {
        left_only: Action::Include,
        right_only: Action::Include,
        both: Action::Include,
    };

    /// Keeps every key; shared keys are resolved by the callback.
    pub const MERGE: Self = Self {
        left_only: Action::Include,
        right_only: Action::Include,
        both: Action::Merge,
    };
}

/// Which input an entry comes from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Walk state shared by every level of one combine.
struct Combiner<'f, F> {
    strategy: Strategy,
    f: &'f mut F,
}

/// Combines two subtrees at `level` under `strategy`.
///
/// `f` receives `(key, left value, right value)` for the regions whose action
/// is [`Action::Merge`]. Returns `None` when the result is `left` unchanged.
pub fn combine<K, V, F>(
    level: Level,
    left: &NodeRef<K, V>,
    right: &NodeRef<K, V>,
    strategy: Strategy,
    f: &mut F,
) -> Option<Builder<K, V>>
where
    K: Eq + Clone,
    V: Clone,
    F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
{
    Combiner { strategy, f }.nodes(level, left, right)
}

impl<F> Combiner<'_, F> {
    fn action(&self, side: Side) -> Action {
        match side {
            Side::Left => self.strategy.left_only,
            Side::Right => self.strategy.right_only,
        }
    }

    fn nodes<K, V>(
        &mut self,
        level: Level,
        left: &NodeRef<K, V>,
        right: &NodeRef<K, V>,
    ) -> Option<Builder<K, V>>
    where
        K: Eq + Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        if right.count() == 0 {
            return self.side(level, left, Side::Left);
        }
        if left.count() == 0 {
            return Some(
                self.side(level, right, Side::Right)
                    .unwrap_or_else(|| Builder::from_node(level, Arc::clone(right))),
            );
        }
        if left.is_collision() {
            return Some(self.entries_vs_node(level, left.items(), right, Side::Left));
        }
        if right.is_collision() {
            return Some(self.entries_vs_node(level, right.items(), left, Side::Right));
        }
        self.regular(level, left, right)
    }

    /// Applies a one-sided action to a whole subtree.
    ///
    /// Returns `None` when the subtree is kept as is.
    fn side<K, V>(&mut self, level: Level, node: &Node<K, V>, side: Side) -> Option<Builder<K, V>>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        match self.action(side) {
            Action::Include => None,
            Action::Discard => Some(Builder::empty(level)),
            Action::Merge => {
                let f = &mut *self.f;
                Some(compact_map_values(level, node, &mut |key: &K, value: &V| match side {
                    Side::Left => f(key, Some(value), None),
                    Side::Right => f(key, None, Some(value)),
                }))
            }
        }
    }

    /// Resolves a key present on one side only.
    fn single<K, V>(&mut self, entry: &Entry<K, V>, side: Side) -> Option<Entry<K, V>>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        match self.action(side) {
            Action::Include => Some(entry.clone()),
            Action::Discard => None,
            Action::Merge => {
                let value = match side {
                    Side::Left => (self.f)(&entry.key, Some(&entry.value), None),
                    Side::Right => (self.f)(&entry.key, None, Some(&entry.value)),
                }?;
                Some(Entry::new(entry.hash, entry.key.clone(), value))
            }
        }
    }

    /// Resolves a key present on both sides.
    fn both<K, V>(&mut self, left: &Entry<K, V>, right: &Entry<K, V>) -> Option<Entry<K, V>>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        match self.strategy.both {
            Action::Include => Some(left.clone()),
            Action::Discard => None,
            Action::Merge => {
                let value = (self.f)(&left.key, Some(&left.value), Some(&right.value))?;
                Some(Entry::new(left.hash, left.key.clone(), value))
            }
        }
    }

    fn regular<K, V>(
        &mut self,
        level: Level,
        left: &Node<K, V>,
        right: &Node<K, V>,
    ) -> Option<Builder<K, V>>
    where
        K: Eq + Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        let mut fork = Fork::new(level, left);
        for bucket in left.occupancy().union(right.occupancy()) {
            match (left.content(bucket), right.content(bucket)) {
                (Content::Empty, Content::Empty) => {}
                (Content::Item(_, a), Content::Empty) => match self.action(Side::Left) {
                    Action::Include => fork.keep(bucket),
                    _ => {
                        let resolved = self.single(a, Side::Left);
                        let builder = fork.edit(bucket);
                        if let Some(entry) = resolved {
                            builder.add_new_item(bucket, entry);
                        }
                    }
                },
                (Content::Child(_, child), Content::Empty) => {
                    match self.side(level.descend(), child, Side::Left) {
                        None => fork.keep(bucket),
                        Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                    }
                }
                (Content::Empty, Content::Item(_, b)) => {
                    if let Some(entry) = self.single(b, Side::Right) {
                        fork.edit(bucket).add_new_item(bucket, entry);
                    }
                }
                (Content::Empty, Content::Child(_, child)) => {
                    let below = level.descend();
                    let branch = self
                        .side(below, child, Side::Right)
                        .unwrap_or_else(|| Builder::from_node(below, Arc::clone(child)));
                    if !branch.is_empty() {
                        fork.edit(bucket).add_new_child_branch(bucket, branch);
                    }
                }
                (Content::Item(_, a), Content::Item(_, b)) => {
                    let unchanged = if a.hash == b.hash && a.key == b.key {
                        self.strategy.both == Action::Include
                    } else {
                        self.strategy.left_only == Action::Include
                            && self.strategy.right_only == Action::Discard
                    };
                    if unchanged {
                        fork.keep(bucket);
                    } else {
                        let branch = self.entries_vs_entry(level.descend(), a, b);
                        fork.edit(bucket).add_new_child_branch(bucket, branch);
                    }
                }
                (Content::Item(_, a), Content::Child(_, child)) => {
                    let once = std::iter::once(a);
                    let branch = self.entries_vs_node(level.descend(), once, child, Side::Left);
                    fork.edit(bucket).add_new_child_branch(bucket, branch);
                }
                (Content::Child(_, child), Content::Item(_, b)) => {
                    let once = std::iter::once(b);
                    let branch = self.entries_vs_node(level.descend(), once, child, Side::Right);
                    fork.edit(bucket).add_new_child_branch(bucket, branch);
                }
                (Content::Child(_, a), Content::Child(_, b)) => {
                    match self.nodes(level.descend(), a, b) {
                        None => fork.keep(bucket),
                        Some(branch) => fork.edit(bucket).add_new_child_branch(bucket, branch),
                    }
                }
            }
        }
        fork.finish()
    }

    /// Two lone entries meeting in one bucket, resolved one level down.
    fn entries_vs_entry<K, V>(
        &mut self,
        level: Level,
        left: &Entry<K, V>,
        right: &Entry<K, V>,
    ) -> Builder<K, V>
    where
        K: Eq + Clone,
        V: Clone,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        let resolved = if left.hash == right.hash && left.key == right.key {
            vec![self.both(left, right)]
        } else {
            vec![self.single(left, Side::Left), self.single(right, Side::Right)]
        };
        let mut node = Arc::new(Node::empty());
        for entry in resolved.into_iter().flatten() {
            insert(&mut node, level, entry);
        }
        Builder::from_node(level, node)
    }

    /// Combines a handful of loose entries from side `side` against a whole
    /// subtree from the opposite side.
    ///
    /// The subtree is copied, its partners of the loose entries are taken
    /// out, the one-sided action is applied to what remains, and finally
    /// the resolved loose entries are inserted back.
    fn entries_vs_node<'e, K, V, I>(
        &mut self,
        level: Level,
        entries: I,
        node: &NodeRef<K, V>,
        side: Side,
    ) -> Builder<K, V>
    where
        K: Eq + Clone + 'e,
        V: Clone + 'e,
        I: Iterator<Item = &'e Entry<K, V>>,
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        let other = match side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        let mut rest = Arc::clone(node);
        let mut pairs = Vec::new();
        for entry in entries {
            let partner = remove(&mut rest, level, entry.hash, &entry.key);
            pairs.push((entry, partner));
        }
        let mut result = match self.side(level, &rest, other) {
            None => rest,
            Some(builder) => builder.finalize(),
        };
        for (entry, partner) in pairs {
            let resolved = match (&partner, side) {
                (None, _) => self.single(entry, side),
                (Some(partner), Side::Left) => self.both(entry, partner),
                (Some(partner), Side::Right) => self.both(partner, entry),
            };
            if let Some(resolved) = resolved {
                insert(&mut result, level, resolved);
            }
        }
        Builder::from_node(level, result)
    }
}
