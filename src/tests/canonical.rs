use crate::HashTree;
use crate::tests::{ProbeTree, exact_tree, probe, same_shape};

/// Insertion order must not affect the resulting structure.
#[test]
fn insert_order_abc_cba_bca() {
    let orders: [&[(i32, i32)]; 3] = [
        &[(1, 10), (2, 20), (3, 30)],
        &[(3, 30), (2, 20), (1, 10)],
        &[(2, 20), (3, 30), (1, 10)],
    ];

    let trees: Vec<HashTree<i32, i32>> = orders
        .iter()
        .map(|pairs| pairs.iter().copied().collect())
        .collect();

    assert!(same_shape(trees[0].root(), trees[1].root()));
    assert!(same_shape(trees[1].root(), trees[2].root()));
    assert_eq!(trees[0], trees[2]);
}

/// 1000 entries in three orderings.
#[test]
fn insert_order_1000_entries() {
    let entries: Vec<(u64, u64)> = (0..1000).map(|i| (i, i * 7)).collect();

    let forward: HashTree<u64, u64> = entries.iter().copied().collect();
    let backward: HashTree<u64, u64> = entries.iter().rev().copied().collect();
    let mut interleaved = HashTree::new();
    interleaved.extend(entries.iter().step_by(2).copied());
    interleaved.extend(entries.iter().skip(1).step_by(2).copied());

    assert!(same_shape(forward.root(), backward.root()));
    assert!(same_shape(forward.root(), interleaved.root()));
    assert_eq!(forward.len(), 1000);
}

/// After delete, the shape matches a tree that never held the key.
#[test]
fn delete_preserves_canonicity() {
    let mut a = exact_tree((0..300).map(|i| i * 33));
    for i in (0..300).step_by(3) {
        a.remove(&(i * 33));
    }
    let b = exact_tree((0..300).filter(|i| i % 3 != 0).map(|i| i * 33));
    a.check_invariants();
    assert!(same_shape(a.root(), b.root()));
}

/// Collisions reached in different orders end up in the same place.
#[test]
fn collision_placement_is_order_independent() {
    let keys = [
        probe(1, 0x45),
        probe(2, 0x45),
        probe(3, 0x25),
        probe(4, 0x1_0000_0045),
        probe(5, 0x45),
    ];
    let forward: ProbeTree<u32> = keys.iter().map(|k| (k.clone(), k.id)).collect();
    let backward: ProbeTree<u32> = keys.iter().rev().map(|k| (k.clone(), k.id)).collect();
    forward.check_invariants();
    backward.check_invariants();
    assert!(same_shape(forward.root(), backward.root()));
}

/// Bulk results are canonical too.
#[test]
fn bulk_results_match_incremental_build() {
    let a = exact_tree(0..400);
    let b = exact_tree(200..600);
    let union = a.union(&b);
    let diff = a.subtracting(&b);
    let both = a.intersection(&b);
    union.check_invariants();
    diff.check_invariants();
    both.check_invariants();
    assert!(same_shape(union.root(), exact_tree(0..600).root()));
    assert!(same_shape(diff.root(), exact_tree(0..200).root()));
    assert!(same_shape(both.root(), exact_tree(200..400).root()));
}
