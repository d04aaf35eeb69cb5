//! Persistent hash map based on CHAMP.
//!
//! CHAMP (Compressed Hash-Array Mapped Prefix-tree) is a refined HAMT that
//! guarantees **canonical form**: the same set of keys always produces the
//! same trie structure, regardless of insertion order.
//!
//! # Key properties
//!
//! - **Canonical form**: same contents = same structure
//! - **COW structural sharing**: O(1) clone; a mutation copies only the
//!   shared nodes on its path and writes uniquely owned nodes in place
//! - **Bulk set algebra**: union, intersection, subtraction, symmetric
//!   difference, filtering and merging reuse every untouched subtree
//! - **Positional indexing**: the pre-order item sequence supports
//!   O(depth) random access and distance computation
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Example
//!
//! ```
//! use champ_tree::HashTree;
//!
//! let mut a = HashTree::new();
//! a.insert("one", 1);
//! a.insert("two", 2);
//!
//! let mut b = a.clone();
//! b.insert("three", 3);
//! assert_eq!(a.len(), 2);
//! assert_eq!(b.len(), 3);
//!
//! let both = a.union(&b);
//! assert!(b.is_equal_set(&both));
//! assert_eq!(both.position_of(&both.item_at(1)), 1);
//! ```
//!
//! # Features
//!
//! - `tracing`: emits `trace!` events for structural changes (node copies,
//!   resizes, collision handling, path compression)
//!
//! # References
//!
//! - Steindorfer & Vinju, 2015: "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015
//! - Bagwell, 2001: "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod builder;
pub mod hash;
pub mod index;
pub mod iter;
pub mod node;
pub mod ops;
pub mod path;
pub mod stats;
pub mod storage;

mod tree;

#[cfg(test)]
mod tests;

pub use hash::{DefaultHashBuilder, KeyHash};
pub use iter::{Iter, Keys, Values};
pub use ops::combine::{Action, Strategy};
pub use path::Path;
pub use stats::Statistics;
pub use tree::HashTree;
