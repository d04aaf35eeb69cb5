//! The [`HashTree`] handle.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops;
use std::sync::Arc;

use crate::builder::Builder;
use crate::hash::{DefaultHashBuilder, KeyHash, Level};
use crate::index;
use crate::iter::{Iter, Keys, Values};
use crate::node::{Entry, Node, NodeRef};
use crate::ops::combine::{Strategy, combine};
use crate::ops::filter::filter;
use crate::ops::get::get;
use crate::ops::insert::insert;
use crate::ops::intersection::intersection;
use crate::ops::map_values::{compact_map_values, map_values};
use crate::ops::predicates;
use crate::ops::remove::{compress_root, remove};
use crate::ops::subtracting::subtracting;
use crate::ops::symmetric_difference::symmetric_difference;
use crate::ops::union::union;
use crate::path::Path;
use crate::stats::Statistics;

/// Persistent hash map based on a CHAMP trie.
///
/// Cloning is O(1): both handles share every node. A mutation copies only
/// the nodes on its path that are still shared, so other handles never see
/// it. The same set of keys always produces the same trie shape.
///
/// Bulk operations combine two trees node by node and reuse every subtree
/// they leave untouched. Both operands must hash keys the same way.
pub struct HashTree<K, V, S = DefaultHashBuilder> {
    root: NodeRef<K, V>,
    hasher: S,
}

// ---------------------------------------------------------------------------
// Construction & accessors (no trait bounds)
// ---------------------------------------------------------------------------

impl<K, V> HashTree<K, V> {
    /// Creates an empty tree with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashTree<K, V, S> {
    /// Creates an empty tree hashing keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: Arc::new(Node::empty()),
            hasher,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.count() == 0
    }

    /// Returns the hasher.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &NodeRef<K, V> {
        &self.root
    }

    /// Returns `true` if both handles share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Returns an iterator over `(&K, &V)` pairs in trie order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root)
    }

    /// Returns an iterator over the keys in trie order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(&self.root)
    }

    /// Returns an iterator over the values in trie order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.root)
    }

    /// Gathers shape and memory statistics.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::gather(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

impl<K, V, S> HashTree<K, V, S> {
    /// Path of the first item in iteration order (the end if empty).
    #[must_use]
    pub fn start_path(&self) -> Path<'_, K, V> {
        Path::start(&self.root)
    }

    /// Path past the last item.
    #[must_use]
    pub fn end_path(&self) -> Path<'_, K, V> {
        Path::end(&self.root)
    }

    /// Path of the item at `position` in iteration order; `len()` yields the
    /// end path.
    ///
    /// # Panics
    ///
    /// Panics if `position > len()`.
    #[must_use]
    pub fn item_at(&self, position: usize) -> Path<'_, K, V> {
        index::item_at(&self.root, position)
    }

    /// Iteration position of `path`.
    #[must_use]
    pub fn position_of(&self, path: &Path<'_, K, V>) -> usize {
        index::position_of(&self.root, path)
    }

    /// Path of the item following `path`, or the end path.
    ///
    /// # Panics
    ///
    /// Panics if `path` is the end path.
    #[must_use]
    pub fn successor<'a>(&'a self, path: Path<'a, K, V>) -> Path<'a, K, V> {
        let mut path = path;
        path.find_successor_item(&self.root);
        path
    }

    /// Path of the item preceding `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is the start path.
    #[must_use]
    pub fn predecessor<'a>(&'a self, path: Path<'a, K, V>) -> Path<'a, K, V> {
        let mut path = path;
        assert!(
            path.find_predecessor_item(&self.root),
            "no item precedes the start position"
        );
        path
    }

    /// Number of steps from `from` to `to`; negative if `to` comes first.
    #[must_use]
    pub fn distance(&self, from: &Path<'_, K, V>, to: &Path<'_, K, V>) -> isize {
        index::distance(&self.root, from, to)
    }

    /// Moves `path` by `offset` items, stopping at `limit` if it lies on the
    /// way. Returns `false` if the limit was hit.
    ///
    /// # Panics
    ///
    /// Panics if the target lies outside `0..=len()` and no limit stops it.
    pub fn seek<'a>(
        &'a self,
        path: &mut Path<'a, K, V>,
        offset: isize,
        limit: Option<&Path<'a, K, V>>,
    ) -> bool {
        index::seek(&self.root, path, offset, limit)
    }
}

// ---------------------------------------------------------------------------
// Read operations (K: Hash + Eq)
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, S: BuildHasher> HashTree<K, V, S> {
    fn hash_of<Q: Hash + ?Sized>(&self, key: &Q) -> KeyHash {
        KeyHash::of(&self.hasher, key)
    }

    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        get(&self.root, Level::ROOT, self.hash_of(key), key).map(|entry| &entry.value)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        get(&self.root, Level::ROOT, self.hash_of(key), key).map(Entry::pair)
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns the path of `key`, if present.
    #[must_use]
    pub fn path_to<Q>(&self, key: &Q) -> Option<Path<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        index::path_to(&self.root, self.hash_of(key), key)
    }
}

// ---------------------------------------------------------------------------
// Write operations (K: Hash + Eq + Clone, V: Clone)
// ---------------------------------------------------------------------------

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> HashTree<K, V, S> {
    /// Inserts a key-value pair.
    ///
    /// Returns `None` if the key was new, or `Some(old_value)` if an existing
    /// value was replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_of(&key);
        insert(&mut self.root, Level::ROOT, Entry::new(hash, key, value))
    }

    /// Removes a key from the tree. Returns the removed value, or `None` if
    /// the key was not present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let removed = remove(&mut self.root, Level::ROOT, hash, key)?;
        compress_root(&mut self.root);
        Some((removed.key, removed.value))
    }
}

// ---------------------------------------------------------------------------
// Bulk operations (K: Eq + Clone, V: Clone)
// ---------------------------------------------------------------------------

impl<K: Eq + Clone, V: Clone, S: Clone> HashTree<K, V, S> {
    fn with_root<T>(&self, root: NodeRef<K, T>) -> HashTree<K, T, S> {
        HashTree {
            root,
            hasher: self.hasher.clone(),
        }
    }

    fn rebuild(&self, result: Option<Builder<K, V>>) -> Self {
        match result {
            None => self.clone(),
            Some(builder) => self.with_root(builder.finalize()),
        }
    }

    /// Returns the entries of both trees; on shared keys `self` wins.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.rebuild(union(Level::ROOT, &self.root, &other.root))
    }

    /// Returns the entries of `self` whose keys are also in `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.rebuild(intersection(Level::ROOT, &self.root, &other.root))
    }

    /// Returns the entries of `self` whose keys are not in `other`.
    #[must_use]
    pub fn subtracting(&self, other: &Self) -> Self {
        self.rebuild(subtracting(Level::ROOT, &self.root, &other.root))
    }

    /// Returns the entries whose keys are in exactly one of the trees.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.rebuild(symmetric_difference(Level::ROOT, &self.root, &other.root))
    }

    /// Returns the entries for which `keep` returns `true`.
    #[must_use]
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.rebuild(filter(Level::ROOT, &self.root, &mut keep))
    }

    /// Returns a tree with the same keys and shape, and values mapped by `f`.
    #[must_use]
    pub fn map_values<T, F>(&self, mut f: F) -> HashTree<K, T, S>
    where
        F: FnMut(&K, &V) -> T,
    {
        self.with_root(map_values(&self.root, &mut f))
    }

    /// Returns a tree of the values mapped by `f`, dropping the keys for
    /// which it returns `None`.
    #[must_use]
    pub fn compact_map_values<T, F>(&self, mut f: F) -> HashTree<K, T, S>
    where
        T: Clone,
        F: FnMut(&K, &V) -> Option<T>,
    {
        self.with_root(compact_map_values(Level::ROOT, &self.root, &mut f).finalize())
    }

    /// Returns the union of both trees, resolving shared keys with `f`.
    #[must_use]
    pub fn merge<F>(&self, other: &Self, mut f: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        self.combine(other, Strategy::MERGE, |key, left, right| {
            left.zip(right).map(|(left, right)| f(key, left, right))
        })
    }

    /// Combines both trees under `strategy`.
    ///
    /// `f` is called with `(key, left value, right value)` for each key in a
    /// region whose action is [`Action::Merge`](crate::Action::Merge);
    /// returning `None` drops the key.
    #[must_use]
    pub fn combine<F>(&self, other: &Self, strategy: Strategy, mut f: F) -> Self
    where
        F: FnMut(&K, Option<&V>, Option<&V>) -> Option<V>,
    {
        self.rebuild(combine(Level::ROOT, &self.root, &other.root, strategy, &mut f))
    }
}

// ---------------------------------------------------------------------------
// Predicates (K: Eq)
// ---------------------------------------------------------------------------

impl<K: Eq, V, S> HashTree<K, V, S> {
    /// Returns `true` if every key of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        predicates::is_subset(Level::ROOT, &self.root, &other.root)
    }

    /// Returns `true` if the trees share no key.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        predicates::is_disjoint(Level::ROOT, &self.root, &other.root)
    }

    /// Returns `true` if both trees hold the same keys, whatever the values.
    #[must_use]
    pub fn is_equal_set(&self, other: &Self) -> bool {
        predicates::is_equal_set(Level::ROOT, &self.root, &other.root)
    }

    /// Verifies every structural invariant of the trie.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    pub fn check_invariants(&self) {
        self.root.check_invariants(Level::ROOT, KeyHash::new(0), true);
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, S: Clone> Clone for HashTree<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S: Default> Default for HashTree<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTree<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Eq, V: PartialEq, S> PartialEq for HashTree<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        predicates::equals(Level::ROOT, &self.root, &other.root, &mut |a: &V, b: &V| a == b)
    }
}

impl<K: Eq, V: Eq, S> Eq for HashTree<K, V, S> {}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> Extend<(K, V)> for HashTree<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashTree<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K, Q, V, S> ops::Index<&Q> for HashTree<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTree<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
