//! Hand-traced shapes with exact hashes.

use std::sync::Arc;

use crate::bitmap::{Bitmap, Bucket, Slot};
use crate::tests::exact_tree;

fn buckets(values: &[u32]) -> Bitmap {
    values
        .iter()
        .fold(Bitmap::EMPTY, |map, &b| map.inserting(Bucket::new(b)))
}

/// 3 and 35 share bucket 3 at the root and split one level down.
#[test]
fn shared_prefix_spawns_child() {
    let tree = exact_tree([3, 35, 9, 20]);
    let root = tree.root();

    assert_eq!(root.item_map(), buckets(&[9, 20]));
    assert_eq!(root.child_map(), buckets(&[3]));

    let child = root.child(Slot::ZERO);
    assert_eq!(child.item_map(), buckets(&[0, 1]));
    assert_eq!(child.child_map(), Bitmap::EMPTY);
    assert_eq!(child.count(), 2);
    assert_eq!(root.count(), 4);
    tree.check_invariants();
}

/// Removing 35 leaves a singleton child, which is pulled back into the root.
#[test]
fn singleton_child_is_inlined() {
    let mut tree = exact_tree([3, 35, 9, 20]);
    assert_eq!(tree.remove(&35), Some(35));

    let root = tree.root();
    assert_eq!(root.item_map(), buckets(&[3, 9, 20]));
    assert_eq!(root.child_map(), Bitmap::EMPTY);
    tree.check_invariants();
}

/// Items sit in ascending bucket order, before the children.
#[test]
fn iteration_follows_bucket_order() {
    let tree = exact_tree([20, 35, 9, 3, 1]);
    let keys: Vec<u64> = tree.keys().copied().collect();
    assert_eq!(keys, [1, 9, 20, 3, 35]);
}

/// Keys sharing 10 low bits nest two levels deep.
#[test]
fn two_level_split() {
    let a = 7;
    let b = 7 | (1 << 10);
    let tree = exact_tree([a, b]);
    let root = tree.root();
    assert_eq!(root.child_map(), buckets(&[7]));
    let mid = root.child(Slot::ZERO);
    assert_eq!(mid.item_map(), Bitmap::EMPTY);
    assert_eq!(mid.child_map(), buckets(&[0]));
    let leaf = mid.child(Slot::ZERO);
    assert_eq!(leaf.item_map(), buckets(&[0, 1]));
    tree.check_invariants();

    let mut shrunk = tree.clone();
    shrunk.remove(&b);
    assert_eq!(shrunk.root().item_map(), buckets(&[7]));
    assert_eq!(shrunk.root().child_map(), Bitmap::EMPTY);
    shrunk.check_invariants();
}

/// An insert after a clone copies the root path and shares the rest.
#[test]
fn insert_copies_only_its_path() {
    let base = exact_tree([3, 35, 9, 20]);
    let mut edited = base.clone();
    edited.insert(10, 10);

    assert!(!edited.ptr_eq(&base));
    assert!(Arc::ptr_eq(
        base.root().child(Slot::ZERO),
        edited.root().child(Slot::ZERO)
    ));
    assert_eq!(base.len(), 4);
    assert_eq!(edited.len(), 5);
}

/// A unique root is edited in place.
#[test]
fn unique_root_is_edited_in_place() {
    let mut tree = exact_tree([3, 35, 9, 20]);
    let before = Arc::as_ptr(tree.root());
    tree.insert(10, 10);
    assert_eq!(Arc::as_ptr(tree.root()), before);
}
