//! Bit-addressing primitives: buckets, slots and 32-bit occupancy bitmaps.

use std::fmt;

/// Bits of hash consumed per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Number of buckets in a node.
pub const BUCKET_COUNT: u32 = 1 << BITS_PER_LEVEL;

/// One of the 32 branch positions at a trie level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket(u8);

impl Bucket {
    /// The lowest bucket.
    pub const ZERO: Self = Self(0);

    /// Creates a bucket from its 5-bit value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        debug_assert!(value < BUCKET_COUNT);
        Self(value as u8)
    }

    /// Returns the numeric value (0..32).
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0 as u32
    }

    /// Returns the single-bit mask for this bucket.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket({})", self.0)
    }
}

/// Rank-compressed position of an item or child within a node's storage.
///
/// For regular nodes a slot is the number of occupied buckets below the
/// addressed one; for collision nodes it is a plain index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u32);

impl Slot {
    /// The first slot.
    pub const ZERO: Self = Self(0);

    /// Creates a slot from an index.
    #[inline]
    #[must_use]
    pub const fn new(value: usize) -> Self {
        debug_assert!(value <= u32::MAX as usize);
        Self(value as u32)
    }

    /// Returns the slot as an index.
    #[inline]
    #[must_use]
    pub const fn value(self) -> usize {
        self.0 as usize
    }

    /// Returns the following slot.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the preceding slot.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when called on [`Slot::ZERO`].
    #[inline]
    #[must_use]
    pub const fn previous(self) -> Self {
        debug_assert!(self.0 > 0);
        Self(self.0 - 1)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// A set of buckets, stored as a 32-bit membership map.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bitmap(u32);

impl Bitmap {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Wraps raw membership bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The set containing only `bucket`.
    #[inline]
    #[must_use]
    pub const fn single(bucket: Bucket) -> Self {
        Self(bucket.mask())
    }

    /// All buckets strictly below `bucket`.
    #[inline]
    #[must_use]
    pub const fn below(bucket: Bucket) -> Self {
        Self(bucket.mask() - 1)
    }

    /// Returns the raw membership bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the number of buckets in the set.
    #[inline]
    #[must_use]
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no bucket is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `bucket` is a member.
    #[inline]
    #[must_use]
    pub const fn contains(self, bucket: Bucket) -> bool {
        self.0 & bucket.mask() != 0
    }

    /// Returns a copy with `bucket` added.
    #[inline]
    #[must_use]
    pub const fn inserting(self, bucket: Bucket) -> Self {
        Self(self.0 | bucket.mask())
    }

    /// Returns a copy with `bucket` removed.
    #[inline]
    #[must_use]
    pub const fn removing(self, bucket: Bucket) -> Self {
        Self(self.0 & !bucket.mask())
    }

    /// Adds `bucket` in place.
    #[inline]
    pub const fn insert(&mut self, bucket: Bucket) {
        debug_assert!(!self.contains(bucket));
        self.0 |= bucket.mask();
    }

    /// Removes `bucket` in place.
    #[inline]
    pub const fn remove(&mut self, bucket: Bucket) {
        debug_assert!(self.contains(bucket));
        self.0 &= !bucket.mask();
    }

    /// Returns the slot `bucket` occupies (or would occupy) in packed storage.
    #[inline]
    #[must_use]
    pub const fn slot_of(self, bucket: Bucket) -> Slot {
        Slot::new((self.0 & (bucket.mask() - 1)).count_ones() as usize)
    }

    /// Returns the bucket stored at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below [`count`](Self::count).
    #[must_use]
    pub const fn bucket_at(self, slot: Slot) -> Bucket {
        assert!(slot.value() < self.count(), "slot out of range");
        let mut bits = self.0;
        let mut remaining = slot.value();
        while remaining > 0 {
            bits &= bits - 1;
            remaining -= 1;
        }
        Bucket::new(bits.trailing_zeros())
    }

    /// Returns the lowest bucket, if any.
    #[inline]
    #[must_use]
    pub const fn first(self) -> Option<Bucket> {
        if self.0 == 0 {
            None
        } else {
            Some(Bucket::new(self.0.trailing_zeros()))
        }
    }

    /// Set union.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Buckets in `self` but not in `other`.
    #[inline]
    #[must_use]
    pub const fn subtracting(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns `true` if every bucket of `self` is in `other`.
    #[inline]
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Returns `true` if the sets share no bucket.
    #[inline]
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// Iterates over member buckets in ascending order.
    #[inline]
    #[must_use]
    pub const fn buckets(self) -> Buckets {
        Buckets { bits: self.0 }
    }

    /// Iterates over `(bucket, slot)` pairs in ascending order.
    #[inline]
    #[must_use]
    pub const fn slots(self) -> BucketSlots {
        BucketSlots {
            bits: self.0,
            slot: 0,
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#034b}", self.0)
    }
}

impl IntoIterator for Bitmap {
    type Item = Bucket;
    type IntoIter = Buckets;

    fn into_iter(self) -> Buckets {
        self.buckets()
    }
}

/// Ascending iterator over the buckets of a [`Bitmap`].
#[derive(Clone, Debug)]
pub struct Buckets {
    bits: u32,
}

impl Iterator for Buckets {
    type Item = Bucket;

    #[inline]
    fn next(&mut self) -> Option<Bucket> {
        if self.bits == 0 {
            return None;
        }
        let bucket = Bucket::new(self.bits.trailing_zeros());
        self.bits &= self.bits - 1;
        Some(bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Buckets {}

/// Ascending iterator over `(bucket, slot)` pairs of a [`Bitmap`].
#[derive(Clone, Debug)]
pub struct BucketSlots {
    bits: u32,
    slot: usize,
}

impl Iterator for BucketSlots {
    type Item = (Bucket, Slot);

    #[inline]
    fn next(&mut self) -> Option<(Bucket, Slot)> {
        if self.bits == 0 {
            return None;
        }
        let bucket = Bucket::new(self.bits.trailing_zeros());
        self.bits &= self.bits - 1;
        let slot = Slot::new(self.slot);
        self.slot += 1;
        Some((bucket, slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BucketSlots {}
