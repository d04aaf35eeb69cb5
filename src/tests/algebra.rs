use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::HashTree;
use crate::tests::{Probe, ProbeTree, exact_tree, probe, same_shape};

fn contents<V: Clone + Ord>(tree: &ProbeTree<V>) -> BTreeMap<(u64, u32), V> {
    tree.iter()
        .map(|(k, v)| ((k.hash, k.id), v.clone()))
        .collect()
}

/// Random probe trees whose keys collide often.
fn random_pair(seed: u64, hashes: u64) -> (ProbeTree<u32>, ProbeTree<u32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut left = ProbeTree::default();
    let mut right = ProbeTree::default();
    for _ in 0..300 {
        let id = rng.gen_range(0..400);
        let key = probe(id, rng.gen_range(0..hashes) * 0x4_0021);
        if rng.gen_bool(0.5) {
            left.insert(key, id);
        } else {
            right.insert(key, id + 1000);
        }
    }
    (left, right)
}

fn keyset(tree: &ProbeTree<u32>) -> HashMap<Probe, u32> {
    tree.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

#[test]
fn union_prefers_left() {
    let left: HashTree<u32, &str> = [(1, "l1"), (2, "l2")].into_iter().collect();
    let right: HashTree<u32, &str> = [(2, "r2"), (3, "r3")].into_iter().collect();
    let union = left.union(&right);
    assert_eq!(union.len(), 3);
    assert_eq!(union.get(&1), Some(&"l1"));
    assert_eq!(union.get(&2), Some(&"l2"));
    assert_eq!(union.get(&3), Some(&"r3"));
    union.check_invariants();
}

#[test]
fn set_operations_match_model() {
    for (seed, hashes) in [(1, 8), (2, 64), (3, 4096), (4, 2)] {
        let (left, right) = random_pair(seed, hashes);
        let l = keyset(&left);
        let r = keyset(&right);

        let union = left.union(&right);
        union.check_invariants();
        let mut expected = r.clone();
        expected.extend(l.iter().map(|(k, v)| (k.clone(), *v)));
        assert_eq!(keyset(&union), expected, "union, seed {seed}");

        let both = left.intersection(&right);
        both.check_invariants();
        let expected: HashMap<Probe, u32> = l
            .iter()
            .filter(|(k, _)| r.contains_key(*k))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        assert_eq!(keyset(&both), expected, "intersection, seed {seed}");

        let diff = left.subtracting(&right);
        diff.check_invariants();
        let expected: HashMap<Probe, u32> = l
            .iter()
            .filter(|(k, _)| !r.contains_key(*k))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        assert_eq!(keyset(&diff), expected, "subtracting, seed {seed}");

        let sym = left.symmetric_difference(&right);
        sym.check_invariants();
        let expected: HashMap<Probe, u32> = l
            .iter()
            .filter(|(k, _)| !r.contains_key(*k))
            .chain(r.iter().filter(|(k, _)| !l.contains_key(*k)))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        assert_eq!(keyset(&sym), expected, "symmetric difference, seed {seed}");
    }
}

/// (A − B) ∪ (B − A) ∪ (A ∩ B) has the keys of A ∪ B, and A ∩ B lies in both.
#[test]
fn partition_laws() {
    for seed in 10..14 {
        let (a, b) = random_pair(seed, 32);
        let both = a.intersection(&b);
        let only_a = a.subtracting(&b);
        let only_b = b.subtracting(&a);

        let rebuilt = both.union(&only_a).union(&only_b);
        assert!(rebuilt.is_equal_set(&a.union(&b)));
        assert!(a.symmetric_difference(&b).union(&both).is_equal_set(&rebuilt));
        assert!(both.is_subset(&a));
        assert!(both.is_subset(&b));
        assert!(only_a.is_disjoint(&b));
        assert!(only_a.is_disjoint(&only_b));
        assert!(!a.is_empty() && a.is_subset(&a.union(&b)));
        assert_eq!(both.len() + only_a.len() + only_b.len(), a.union(&b).len());
    }
}

/// Results are canonical whatever path built them.
#[test]
fn results_are_canonical() {
    let (a, b) = random_pair(21, 16);
    let union = a.union(&b);
    let mut incremental = a.clone();
    for (k, v) in &b {
        if !incremental.contains_key(k) {
            incremental.insert(k.clone(), *v);
        }
    }
    assert!(same_shape(union.root(), incremental.root()));
    assert_eq!(union, incremental);

    let diff = a.subtracting(&b);
    let mut removed = a.clone();
    for k in b.keys() {
        removed.remove(k);
    }
    assert!(same_shape(diff.root(), removed.root()));
    assert_eq!(contents(&diff), contents(&removed));
}

#[test]
fn identities_return_shared_roots() {
    let tree = exact_tree(0..500);
    let empty = exact_tree([]);

    assert!(tree.union(&empty).ptr_eq(&tree));
    assert!(tree.union(&tree).ptr_eq(&tree));
    assert!(tree.intersection(&tree).ptr_eq(&tree));
    assert!(tree.subtracting(&empty).ptr_eq(&tree));
    assert!(tree.symmetric_difference(&empty).ptr_eq(&tree));
    assert!(tree.subtracting(&tree).is_empty());
    assert!(tree.symmetric_difference(&tree).is_empty());
    assert!(tree.intersection(&empty).is_empty());
}

/// Subtrees untouched by an operation are shared with the operand.
#[test]
fn disjoint_subtrees_are_reused() {
    let left = exact_tree((0..2000).map(|i| i * 32));
    let right = exact_tree((0..50).map(|i| i * 32 + 1));
    let union = left.union(&right);
    let reused = union
        .root()
        .children()
        .filter(|child| left.root().children().any(|l| Arc::ptr_eq(child, l)))
        .count();
    assert_eq!(reused, left.root().child_count());
    union.check_invariants();
}

#[test]
fn predicates() {
    let small = exact_tree(0..10);
    let large = exact_tree(0..100);
    let other = exact_tree(100..110);

    assert!(small.is_subset(&large));
    assert!(!large.is_subset(&small));
    assert!(small.is_disjoint(&other));
    assert!(!small.is_disjoint(&large));
    assert!(small.is_equal_set(&exact_tree((0..10).rev())));
    assert!(!small.is_equal_set(&other));

    let relabeled = small.map_values(|_, v| v + 1);
    assert!(small.is_equal_set(&relabeled));
    assert_ne!(small, relabeled);
}

#[test]
fn predicates_with_collisions() {
    let a: ProbeTree<u32> = [probe(1, 7), probe(2, 7), probe(3, 9)]
        .into_iter()
        .map(|k| (k, 0))
        .collect();
    let b: ProbeTree<u32> = [probe(2, 7), probe(1, 7), probe(3, 9), probe(4, 7)]
        .into_iter()
        .map(|k| (k, 0))
        .collect();
    let c: ProbeTree<u32> = [probe(5, 7), probe(6, 7)].into_iter().map(|k| (k, 0)).collect();

    assert!(a.is_subset(&b));
    assert!(!b.is_subset(&a));
    assert!(a.is_disjoint(&c));
    assert!(!b.is_disjoint(&a));
    assert!(a.is_equal_set(&b.subtracting(&c).filter(|k, _| k.id != 4)));
}
