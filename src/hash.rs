//! Key hashes and trie levels.
//!
//! A [`KeyHash`] is sliced into 5-bit buckets, one per [`Level`]. The level at
//! which no hash bits remain is the *bottom*; only collision nodes live there.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use crate::bitmap::{BITS_PER_LEVEL, Bucket};

/// Width of a key hash in bits.
pub const HASH_BITS: u32 = u64::BITS;

/// Maximum trie depth, ⌈64 / 5⌉.
pub const MAX_DEPTH: usize = HASH_BITS.div_ceil(BITS_PER_LEVEL) as usize;

/// Default hasher builder: deterministic SipHash with fixed keys.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// Precomputed 64-bit hash of a key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyHash(u64);

impl KeyHash {
    /// Wraps a raw hash value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Hashes `key` with a hasher built by `builder`.
    #[must_use]
    pub fn of<Q: Hash + ?Sized, S: BuildHasher>(builder: &S, key: &Q) -> Self {
        Self(builder.hash_one(key))
    }

    /// Returns the raw hash value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Extracts the 5-bit bucket addressed by `level`.
    ///
    /// Past the bottom of the trie every hash maps to bucket zero.
    #[inline]
    #[must_use]
    pub const fn bucket(self, level: Level) -> Bucket {
        if level.is_at_bottom() {
            return Bucket::ZERO;
        }
        Bucket::new(((self.0 >> level.shift()) & 0x1F) as u32)
    }

    /// Returns `true` if both hashes agree on every bit consumed above `level`.
    #[inline]
    #[must_use]
    pub const fn is_equal_up_to(self, other: Self, level: Level) -> bool {
        if level.is_at_bottom() {
            return self.0 == other.0;
        }
        let mask = (1_u64 << level.shift()) - 1;
        (self.0 ^ other.0) & mask == 0
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Depth in the trie, tracked as the bit-shift applied to key hashes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level {
    shift: u8,
}

impl Level {
    /// The root level.
    pub const ROOT: Self = Self { shift: 0 };

    /// Returns the level at the given depth (root = 0).
    #[inline]
    #[must_use]
    pub const fn at_depth(depth: usize) -> Self {
        debug_assert!(depth <= MAX_DEPTH);
        Self {
            shift: (depth as u32 * BITS_PER_LEVEL) as u8,
        }
    }

    /// Returns the bit-shift of this level.
    #[inline]
    #[must_use]
    pub const fn shift(self) -> u32 {
        self.shift as u32
    }

    /// Returns the depth of this level (root = 0).
    #[inline]
    #[must_use]
    pub const fn depth(self) -> usize {
        (self.shift as u32 / BITS_PER_LEVEL) as usize
    }

    /// Returns `true` at the root.
    #[inline]
    #[must_use]
    pub const fn is_at_root(self) -> bool {
        self.shift == 0
    }

    /// Returns `true` once no hash bits remain.
    #[inline]
    #[must_use]
    pub const fn is_at_bottom(self) -> bool {
        self.shift as u32 >= HASH_BITS
    }

    /// Returns the level one step further from the root.
    #[inline]
    #[must_use]
    pub const fn descend(self) -> Self {
        debug_assert!(!self.is_at_bottom());
        Self {
            shift: self.shift + BITS_PER_LEVEL as u8,
        }
    }

    /// Returns the level one step closer to the root.
    #[inline]
    #[must_use]
    pub const fn ascend(self) -> Self {
        debug_assert!(!self.is_at_root());
        Self {
            shift: self.shift - BITS_PER_LEVEL as u8,
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level(depth: {})", self.depth())
    }
}
