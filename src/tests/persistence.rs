use std::sync::Arc;

use crate::HashTree;
use crate::tests::{ProbeTree, probe};

/// Clone + insert leaves the clone's source untouched.
#[test]
fn snapshot_survives_insert() {
    let mut tree = HashTree::new();
    tree.insert(1, 10);
    tree.insert(2, 20);

    let snapshot = tree.clone();
    tree.insert(3, 30);
    tree.insert(4, 40);
    assert_eq!(tree.len(), 4);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get(&1), Some(&10));
    assert_eq!(snapshot.get(&2), Some(&20));
    assert_eq!(snapshot.get(&3), None);
    assert_eq!(snapshot.get(&4), None);
}

/// Clone + remove leaves the clone's source untouched.
#[test]
fn snapshot_survives_remove() {
    let mut tree = HashTree::new();
    tree.insert("a", 1);
    tree.insert("b", 2);

    let snapshot = tree.clone();
    tree.remove(&"a");
    assert_eq!(tree.len(), 1);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get(&"a"), Some(&1));
    assert_eq!(snapshot.get(&"b"), Some(&2));
}

/// Overwriting a value in one handle does not leak into another.
#[test]
fn snapshot_survives_overwrite() {
    let base: HashTree<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    let mut edited = base.clone();
    for i in (0..1000).step_by(7) {
        edited.insert(i, 0);
    }
    for i in 0..1000 {
        assert_eq!(base.get(&i), Some(&i));
        let expected = if i % 7 == 0 { 0 } else { i };
        assert_eq!(edited.get(&i), Some(&expected));
    }
    base.check_invariants();
    edited.check_invariants();
}

/// A chain of snapshots each keeps its own version.
#[test]
fn snapshot_chain() {
    let mut tree = HashTree::new();
    let mut versions = Vec::new();
    for i in 0..50_u32 {
        versions.push(tree.clone());
        tree.insert(i, i);
    }
    for (len, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), len);
        assert!(version.keys().all(|k| (*k as usize) < len));
    }
}

/// Collision nodes are copied on write like any other node.
#[test]
fn shared_collision_node() {
    let mut tree: ProbeTree<u32> = (0..4).map(|i| (probe(i, 77), i)).collect();
    let snapshot = tree.clone();

    tree.remove(&probe(1, 77));
    tree.insert(probe(9, 77), 9);
    tree.insert(probe(2, 77), 20);

    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot.get(&probe(2, 77)), Some(&2));
    assert_eq!(snapshot.get(&probe(9, 77)), None);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.get(&probe(1, 77)), None);
    assert_eq!(tree.get(&probe(2, 77)), Some(&20));
    snapshot.check_invariants();
    tree.check_invariants();
}

/// Bulk results never mutate their operands.
#[test]
fn bulk_operations_leave_operands_intact() {
    let left: HashTree<u32, u32> = (0..500).map(|i| (i, i)).collect();
    let right: HashTree<u32, u32> = (250..750).map(|i| (i, i + 1)).collect();
    let (left_before, right_before) = (left.clone(), right.clone());

    let _ = left.union(&right);
    let _ = left.intersection(&right);
    let _ = left.subtracting(&right);
    let _ = left.symmetric_difference(&right);
    let _ = left.merge(&right, |_, a, b| a + b);
    let _ = left.filter(|k, _| k % 2 == 0);

    assert!(left.ptr_eq(&left_before));
    assert!(right.ptr_eq(&right_before));
    assert_eq!(left, left_before);
    assert_eq!(right, right_before);
}

/// Dropping every handle but one makes the nodes unique again.
#[test]
fn dropping_snapshot_restores_uniqueness() {
    let mut tree: HashTree<u32, u32> = (0..100).map(|i| (i, i)).collect();
    let snapshot = tree.clone();
    assert_eq!(Arc::strong_count(tree.root()), 2);
    drop(snapshot);
    assert_eq!(Arc::strong_count(tree.root()), 1);

    let before = Arc::as_ptr(tree.root());
    tree.insert(1000, 1000);
    assert_eq!(Arc::as_ptr(tree.root()), before);
}
