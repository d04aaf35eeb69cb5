//! Subtree-level operations.
//!
//! Every function takes the subtree's root node, the [`Level`](crate::hash::Level)
//! it sits at, and where needed the precomputed [`KeyHash`](crate::hash::KeyHash)
//! of a key. Bulk operations return `Option<Builder>`: `None` means the
//! left input is the result unchanged.

pub mod combine;
pub mod filter;
pub mod get;
pub mod insert;
pub mod intersection;
pub mod map_values;
pub mod predicates;
pub mod remove;
pub mod subtracting;
pub mod symmetric_difference;
pub mod union;
