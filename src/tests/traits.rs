use crate::HashTree;

#[test]
fn default_is_empty() {
    let tree: HashTree<i32, i32> = HashTree::default();
    assert!(tree.is_empty());
    tree.check_invariants();
}

#[test]
fn debug_format() {
    let mut tree: HashTree<i32, i32> = HashTree::new();
    assert_eq!(format!("{tree:?}"), "{}");
    tree.insert(1, 10);
    assert_eq!(format!("{tree:?}"), "{1: 10}");
}

#[test]
fn from_iterator() {
    let tree: HashTree<i32, i32> = vec![(1, 10), (2, 20), (3, 30)].into_iter().collect();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get(&1), Some(&10));
}

#[test]
fn from_iterator_last_value_wins() {
    let tree: HashTree<i32, i32> = vec![(1, 10), (1, 11)].into_iter().collect();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(&1), Some(&11));
}

#[test]
fn extend_trait() {
    let mut tree = HashTree::new();
    tree.insert(1, 10);
    tree.extend(vec![(2, 20), (3, 30)]);
    assert_eq!(tree.len(), 3);
}

#[test]
fn index_existing() {
    let mut tree = HashTree::new();
    tree.insert("key", 42);
    assert_eq!(tree[&"key"], 42);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let tree: HashTree<i32, i32> = HashTree::new();
    let _ = tree[&999];
}

/// Equality ignores insertion history.
#[test]
fn equality_is_structural() {
    let a: HashTree<i32, i32> = (0..100).map(|i| (i, i)).collect();
    let mut b: HashTree<i32, i32> = (0..150).rev().map(|i| (i, i)).collect();
    assert_ne!(a, b);
    for i in 100..150 {
        b.remove(&i);
    }
    assert_eq!(a, b);
    b.insert(5, 6);
    assert_ne!(a, b);
}

#[test]
fn into_iterator_for_reference() {
    let tree: HashTree<i32, i32> = (0..10).map(|i| (i, i * i)).collect();
    let mut total = 0;
    for (k, v) in &tree {
        assert_eq!(k * k, *v);
        total += v;
    }
    assert_eq!(total, 285);
}

#[test]
fn iterators_report_exact_length() {
    let tree: HashTree<i32, i32> = (0..64).map(|i| (i, i)).collect();
    let mut iter = tree.iter();
    assert_eq!(iter.len(), 64);
    iter.next();
    assert_eq!(iter.len(), 63);
    assert_eq!(iter.clone().count(), 63);
    assert_eq!(tree.values().len(), 64);
}

#[test]
fn tree_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HashTree<String, Vec<u8>>>();
}
