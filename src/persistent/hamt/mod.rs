//! Hash Array Mapped Trie engine shared by the map and the set.
//!
//! Keys are placed by successive 5-bit fragments of a 32-bit hash, least
//! significant fragment first. Nodes are reference counted; a node is edited
//! in place only when the caller holds the sole reference to it, otherwise it
//! is copied first. Persistent updates therefore copy exactly the path they
//! touch, and a transient that owns its nodes edits them directly.

mod iter;
mod modify;
mod node;
#[cfg(feature = "rayon")]
mod parallel;
mod shape;

use std::hash::{BuildHasher, Hash};

pub(crate) use iter::{IntoIter, Iter};
pub use modify::Edit;
pub(crate) use modify::{delete, insert, modify, replace};
pub(crate) use node::{Child, Node, empty, lookup};
#[cfg(feature = "rayon")]
pub(crate) use parallel::Producer;

/// Hash bits consumed per trie level.
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Children per fully populated node.
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Largest child count an indexed node keeps before it becomes an array node.
pub(crate) const MAX_INDEX_NODE: usize = BRANCHING_FACTOR / 2;

/// Live child count at which an array node shrinks back to an indexed node.
pub(crate) const MIN_ARRAY_NODE: usize = BRANCHING_FACTOR / 4;

/// Branching levels needed to consume a 32-bit hash.
pub(crate) const MAX_DEPTH: usize = 7;

const FRAGMENT_MASK: u32 = 0b1_1111;

/// Hashes a key to the 32-bit value the trie is indexed by.
///
/// The 64-bit hasher output is folded so both halves contribute.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn hash_key<Q, S>(hasher: &S, key: &Q) -> u32
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    let full = hasher.hash_one(key);
    (full ^ (full >> 32)) as u32
}

/// The child position selected by `hash` at the level starting at `shift`.
#[inline]
pub(crate) const fn fragment(hash: u32, shift: u32) -> usize {
    match hash.checked_shr(shift) {
        Some(shifted) => (shifted & FRAGMENT_MASK) as usize,
        None => 0,
    }
}

#[inline]
pub(crate) const fn bit_position(position: usize) -> u32 {
    1 << position
}

/// Index into an indexed node's dense child vector.
#[inline]
pub(crate) const fn sparse_index(mask: u32, bit: u32) -> usize {
    (mask & (bit - 1)).count_ones() as usize
}
