//! # persistent-hamt
//!
//! Persistent hash maps and hash sets built on a Hash Array Mapped Trie
//! (HAMT), with transient handles for cheap batched edits.
//!
//! ## Overview
//!
//! - **Persistent containers**: [`PersistentHashMap`](persistent::PersistentHashMap)
//!   and [`PersistentHashSet`](persistent::PersistentHashSet). Every update
//!   returns a new version and shares all untouched subtrees with the old one.
//! - **Transients**: [`TransientHashMap`](persistent::TransientHashMap) and
//!   [`TransientHashSet`](persistent::TransientHashSet) edit nodes in place
//!   when they own them exclusively, then freeze back into a persistent value.
//! - **Type classes**: [`Semigroup`](typeclass::Semigroup) and
//!   [`Foldable`](typeclass::Foldable), used for bulk construction and folds.
//!
//! ## Feature Flags
//!
//! - `typeclass`: `Semigroup`, `Foldable`, `TypeConstructor` and numeric wrappers
//! - `persistent`: the trie and the containers
//! - `arc`: share nodes through `Arc` so persistent containers are `Send + Sync`
//! - `rayon`: parallel iteration and collection (implies `arc`)
//! - `serde`: serialization support
//! - `fxhash` / `ahash`: faster default hashers
//! - `tracing`: TRACE events for trie reshaping and transient lifetimes
//! - `full`: everything except the hasher swaps
//!
//! ## Example
//!
//! ```rust
//! use persistent_hamt::prelude::*;
//!
//! let base = PersistentHashMap::new()
//!     .insert("apples".to_string(), 3)
//!     .insert("pears".to_string(), 5);
//!
//! let restocked = base.mutate(|transient| {
//!     transient.insert("plums".to_string(), 7);
//!     transient.update_with("apples", |count| count.map(|count| count + 10));
//! });
//!
//! assert_eq!(base.get("apples"), Some(&3));
//! assert_eq!(restocked.get("apples"), Some(&13));
//! assert_eq!(restocked.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use persistent_hamt::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "persistent")]
pub mod persistent;
