use std::hash::{BuildHasherDefault, Hash, Hasher};

use crate::HashTree;
use crate::node::{Kind, Node};

mod algebra;
mod canonical;
mod persistence;
mod primitives;
mod scenario;
mod stress;
mod traits;

/// Hasher whose output is the last `u64` written, so tests choose the
/// exact hash of `u64` keys and of [`Probe`]s.
#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(byte);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

pub type IdentityState = BuildHasherDefault<IdentityHasher>;

/// Key with a chosen hash; `id` tells apart keys sharing a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub id: u32,
    pub hash: u64,
}

impl Hash for Probe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

pub const fn probe(id: u32, hash: u64) -> Probe {
    Probe { id, hash }
}

/// Tree whose `u64` keys hash to themselves.
pub type ExactTree<V> = HashTree<u64, V, IdentityState>;

/// Tree of [`Probe`] keys.
pub type ProbeTree<V> = HashTree<Probe, V, IdentityState>;

/// Builds an [`ExactTree`] mapping each key to itself.
pub fn exact_tree(keys: impl IntoIterator<Item = u64>) -> ExactTree<u64> {
    keys.into_iter().map(|k| (k, k)).collect()
}

/// Returns `true` if both subtrees have the same shape and keys.
///
/// Collision entries are compared as sets.
pub fn same_shape<K: Eq, V>(a: &Node<K, V>, b: &Node<K, V>) -> bool {
    if a.count() != b.count() {
        return false;
    }
    match (a.kind(), b.kind()) {
        (Kind::Collision { hash: ha }, Kind::Collision { hash: hb }) => {
            ha == hb && a.items().all(|x| b.items().any(|y| x.key == y.key))
        }
        (Kind::Regular { .. }, Kind::Regular { .. }) => {
            a.item_map() == b.item_map()
                && a.child_map() == b.child_map()
                && a.items().zip(b.items()).all(|(x, y)| x.key == y.key)
                && a.children().zip(b.children()).all(|(x, y)| same_shape(x, y))
        }
        _ => false,
    }
}
