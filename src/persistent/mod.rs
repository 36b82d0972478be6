//! Persistent (immutable) hash containers on a Hash Array Mapped Trie.
//!
//! - [`PersistentHashMap`]: persistent hash map
//! - [`PersistentHashSet`]: persistent hash set, a map with `()` values
//! - [`TransientHashMap`] / [`TransientHashSet`]: single-owner handles that
//!   batch edits and freeze back into a persistent container
//!
//! # Structural Sharing
//!
//! An update copies only the nodes on the path from the root to the edited
//! entry. Every other subtree is shared by reference with the previous
//! version, so old versions stay valid and cheap to keep around.
//!
//! # Examples
//!
//! ## `PersistentHashMap`
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! ## `PersistentHashSet`
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashSet;
//!
//! let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//!
//! assert_eq!(set.union(&other).len(), 4);        // {1, 2, 3, 4}
//! assert_eq!(set.intersection(&other).len(), 2); // {2, 3}
//! ```
//!
//! ## Transients
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashMap;
//!
//! let mut transient = PersistentHashMap::new().transient();
//! for index in 0..1000 {
//!     transient.insert(index, index * 2);
//! }
//! let map = transient.persistent();
//! assert_eq!(map.len(), 1000);
//! assert_eq!(map.get(&500), Some(&1000));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Default Hasher
// =============================================================================

/// The hasher builder containers use unless one is supplied.
///
/// SipHash with fixed keys by default, so a key hashes the same way in every
/// container of the process. The `fxhash` and `ahash` features swap in a
/// faster hasher; `ahash` wins when both are enabled.
#[cfg(feature = "ahash")]
pub type DefaultHashBuilder = std::hash::BuildHasherDefault<ahash::AHasher>;

/// The hasher builder containers use unless one is supplied.
#[cfg(all(feature = "fxhash", not(feature = "ahash")))]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// The hasher builder containers use unless one is supplied.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder =
    std::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;

// =============================================================================
// Tracing
// =============================================================================

/// Emits a TRACE event when the `tracing` feature is on, nothing otherwise.
macro_rules! trace_event {
    ($($argument:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: "persistent_hamt::hamt", $($argument)*);
    };
}

mod hamt;
mod hashmap;
mod hashset;

pub use hamt::Edit;
pub use hashmap::DuplicateKeyError;
pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use hashmap::TransientHashMap;
pub use hashset::PersistentHashSet;
pub use hashset::PersistentHashSetIntoIterator;
pub use hashset::PersistentHashSetIterator;
pub use hashset::TransientHashSet;

// Rayon parallel iterator re-exports
#[cfg(feature = "rayon")]
pub use hashmap::PersistentHashMapParallelIterator;
#[cfg(feature = "rayon")]
pub use hashmap::PersistentHashMapParallelRefIterator;
#[cfg(feature = "rayon")]
pub use hashset::PersistentHashSetParallelIterator;
#[cfg(feature = "rayon")]
pub use hashset::PersistentHashSetParallelRefIterator;

// =============================================================================
// Tests
// =============================================================================
