use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::HashTree;
use crate::tests::{Probe, ProbeTree, probe};

/// 1000 entries: insert all, verify all, remove all.
#[test]
fn thousand_entries() {
    let mut tree = HashTree::new();
    for i in 0_u64..1000 {
        tree.insert(i, i * 3);
    }
    assert_eq!(tree.len(), 1000);

    for i in 0_u64..1000 {
        assert_eq!(tree.get(&i), Some(&(i * 3)), "missing key {i}");
    }

    for i in 0_u64..1000 {
        assert!(tree.remove(&i).is_some(), "failed to remove key {i}");
    }
    assert!(tree.is_empty());
    tree.check_invariants();
}

/// Insert + overwrite + remove interleaved.
#[test]
fn interleaved_operations() {
    let mut tree = HashTree::new();
    for i in 0_u64..200 {
        tree.insert(i, i);
    }
    for i in (0_u64..200).step_by(2) {
        tree.insert(i, i + 1000);
    }
    for i in (1_u64..200).step_by(2) {
        assert!(tree.remove(&i).is_some());
    }
    assert_eq!(tree.len(), 100);
    for i in (0_u64..200).step_by(2) {
        assert_eq!(tree.get(&i), Some(&(i + 1000)));
    }
    tree.check_invariants();
}

/// 100K entries with a few spot checks.
#[test]
fn hundred_thousand_entries() {
    let tree: HashTree<u64, u64> = (0..100_000).map(|i| (i, i)).collect();
    assert_eq!(tree.len(), 100_000);
    assert_eq!(tree.iter().count(), 100_000);
    for i in [0, 1, 4242, 99_999] {
        assert_eq!(tree.get(&i), Some(&i));
    }
    tree.check_invariants();
}

/// Random operations over colliding keys, checked against a `HashMap`.
#[test]
fn random_mix_against_model() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut tree: ProbeTree<u32> = ProbeTree::default();
    let mut model: HashMap<Probe, u32> = HashMap::new();

    for step in 0..20_000_u32 {
        let key = probe(rng.gen_range(0..256), rng.gen_range(0..64_u64) << rng.gen_range(0..60));
        if rng.gen_bool(0.6) {
            assert_eq!(tree.insert(key.clone(), step), model.insert(key, step));
        } else {
            assert_eq!(tree.remove(&key), model.remove(&key));
        }
        if step % 1000 == 0 {
            tree.check_invariants();
        }
    }
    tree.check_invariants();
    assert_eq!(tree.len(), model.len());
    for (k, v) in &model {
        assert_eq!(tree.get(k), Some(v));
    }
}

/// Many snapshots mutated independently stay consistent.
#[test]
fn random_snapshots() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut trees: Vec<HashTree<u32, u32>> = vec![HashTree::new()];
    let mut models: Vec<HashMap<u32, u32>> = vec![HashMap::new()];

    for _ in 0..2000 {
        let i = rng.gen_range(0..trees.len());
        if rng.gen_bool(0.05) {
            trees.push(trees[i].clone());
            models.push(models[i].clone());
            continue;
        }
        let key = rng.gen_range(0..500);
        if rng.gen_bool(0.7) {
            trees[i].insert(key, key + 1);
            models[i].insert(key, key + 1);
        } else {
            trees[i].remove(&key);
            models[i].remove(&key);
        }
    }
    for (tree, model) in trees.iter().zip(&models) {
        tree.check_invariants();
        assert_eq!(tree.len(), model.len());
        assert!(model.iter().all(|(k, v)| tree.get(k) == Some(v)));
    }
}
