use crate::bitmap::{Bitmap, Bucket, Slot};
use crate::hash::{KeyHash, Level, MAX_DEPTH};
use crate::path::AncestorSlots;

#[test]
fn bitmap_rank_and_select() {
    let map = Bitmap::from_bits(0b1010_0110);
    assert_eq!(map.count(), 4);
    assert_eq!(map.slot_of(Bucket::new(1)), Slot::new(0));
    assert_eq!(map.slot_of(Bucket::new(5)), Slot::new(2));
    assert_eq!(map.slot_of(Bucket::new(6)), Slot::new(3));
    assert_eq!(map.bucket_at(Slot::new(0)), Bucket::new(1));
    assert_eq!(map.bucket_at(Slot::new(3)), Bucket::new(7));
    assert_eq!(map.first(), Some(Bucket::new(1)));
    assert_eq!(Bitmap::EMPTY.first(), None);
}

#[test]
fn bitmap_set_algebra() {
    let a = Bitmap::from_bits(0b1100);
    let b = Bitmap::from_bits(0b0110);
    assert_eq!(a.union(b).bits(), 0b1110);
    assert_eq!(a.intersection(b).bits(), 0b0100);
    assert_eq!(a.subtracting(b).bits(), 0b1000);
    assert!(a.intersection(b).is_subset(a));
    assert!(a.subtracting(b).is_disjoint(b));
    assert_eq!(Bitmap::below(Bucket::new(3)).bits(), 0b111);
}

#[test]
fn bitmap_iterates_buckets_with_slots() {
    let map = Bitmap::from_bits((1 << 31) | (1 << 4) | 1);
    let buckets: Vec<u32> = map.buckets().map(Bucket::value).collect();
    assert_eq!(buckets, [0, 4, 31]);
    let slots: Vec<(u32, usize)> = map.slots().map(|(b, s)| (b.value(), s.value())).collect();
    assert_eq!(slots, [(0, 0), (4, 1), (31, 2)]);
    assert_eq!(map.buckets().len(), 3);
}

/// Each level reads the next 5 bits; the last one gets 4.
#[test]
fn hash_buckets_per_level() {
    let hash = KeyHash::new(0b11111_00011_00010_00001);
    assert_eq!(hash.bucket(Level::ROOT), Bucket::new(1));
    assert_eq!(hash.bucket(Level::at_depth(1)), Bucket::new(2));
    assert_eq!(hash.bucket(Level::at_depth(2)), Bucket::new(3));
    assert_eq!(hash.bucket(Level::at_depth(3)), Bucket::new(31));

    let top = KeyHash::new(u64::MAX);
    assert_eq!(top.bucket(Level::at_depth(MAX_DEPTH - 1)), Bucket::new(15));
    assert_eq!(top.bucket(Level::at_depth(MAX_DEPTH)), Bucket::ZERO);
    assert!(Level::at_depth(MAX_DEPTH).is_at_bottom());
}

#[test]
fn hash_prefix_comparison() {
    let a = KeyHash::new(0x1234);
    let b = KeyHash::new(0x1234 | (1 << 40));
    assert!(a.is_equal_up_to(b, Level::at_depth(8)));
    assert!(!a.is_equal_up_to(b, Level::at_depth(9)));
    assert!(a.is_equal_up_to(b, Level::ROOT));
}

#[test]
fn level_steps() {
    let level = Level::ROOT.descend().descend();
    assert_eq!(level.depth(), 2);
    assert_eq!(level.shift(), 10);
    assert_eq!(level.ascend(), Level::at_depth(1));
    assert!(Level::ROOT.is_at_root());
}

#[test]
fn ancestor_slots_fields() {
    let slots = AncestorSlots::EMPTY
        .with(0, Slot::new(3))
        .with(1, Slot::new(31))
        .with(MAX_DEPTH - 1, Slot::new(15));
    assert_eq!(slots.get(0), Slot::new(3));
    assert_eq!(slots.get(1), Slot::new(31));
    assert_eq!(slots.get(2), Slot::ZERO);
    assert_eq!(slots.get(MAX_DEPTH - 1), Slot::new(15));

    let replaced = slots.with(1, Slot::new(4));
    assert_eq!(replaced.get(1), Slot::new(4));
    assert_eq!(replaced.get(0), Slot::new(3));

    assert_eq!(slots.truncated(1), AncestorSlots::EMPTY.with(0, Slot::new(3)));
    assert_eq!(slots.common_prefix(replaced, 5), 1);
    assert_eq!(slots.common_prefix(slots, 5), 5);
}
