//! Type classes the persistent containers implement and consume.
//!
//! - [`TypeConstructor`]: higher-kinded type emulation through GATs
//! - [`Semigroup`]: types with an associative `combine`
//! - [`Foldable`]: structures that reduce to a summary value
//! - [`Sum`], [`Max`], [`Min`]: wrappers selecting a numeric semigroup
//!
//! Bulk constructors such as
//! [`PersistentHashMap::from_foldable`](crate::persistent::PersistentHashMap::from_foldable)
//! fold any [`Foldable`] source and merge values of repeated keys through
//! their [`Semigroup`].
//!
//! # Examples
//!
//! ```rust
//! use persistent_hamt::typeclass::{Foldable, Semigroup, Sum};
//!
//! assert_eq!(Sum::new(2).combine(Sum::new(3)), Sum::new(5));
//! assert_eq!(vec![1, 2, 3].fold_left(0, |total, element| total + element), 6);
//! ```

mod foldable;
mod higher;
mod semigroup;
mod wrappers;

pub use foldable::Foldable;
pub use higher::TypeConstructor;
pub use semigroup::Semigroup;
pub use wrappers::{Max, Min, Sum};
