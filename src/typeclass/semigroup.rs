//! Semigroup type class - an associative binary operation.
//!
//! # Laws
//!
//! For all `a`, `b`, `c`:
//!
//! ```text
//! (a.combine(b)).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! The persistent containers use it to resolve repeated keys during bulk
//! construction: the value already stored is the left operand and the
//! incoming value is the right one.

use super::wrappers::{Max, Min, Sum};
use std::ops::Add;

/// A type with an associative `combine`.
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::typeclass::Semigroup;
///
/// assert_eq!(String::from("ab").combine(String::from("cd")), "abcd");
/// assert_eq!(vec![1].combine(vec![2, 3]), vec![1, 2, 3]);
/// ```
pub trait Semigroup {
    /// Combines `self` (left) with `other` (right).
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Combines borrowed operands, cloning them.
    #[must_use]
    fn combine_ref(&self, other: &Self) -> Self
    where
        Self: Clone,
    {
        self.clone().combine(other.clone())
    }

    /// Reduces a sequence, or returns `None` when it is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::typeclass::{Semigroup, Max};
    ///
    /// let largest = Max::reduce_all([Max::new(3), Max::new(9), Max::new(4)]);
    /// assert_eq!(largest, Some(Max::new(9)));
    /// assert_eq!(Max::<i32>::reduce_all([]), None);
    /// ```
    fn reduce_all<I>(iterator: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator.into_iter().reduce(Self::combine)
    }
}

impl Semigroup for String {
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Semigroup for Vec<T> {
    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

/// `None` is neutral; two `Some` values combine their contents.
impl<T: Semigroup> Semigroup for Option<T> {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Some(left), Some(right)) => Some(left.combine(right)),
            (Some(value), None) | (None, Some(value)) => Some(value),
            (None, None) => None,
        }
    }
}

impl Semigroup for () {
    fn combine(self, _other: Self) -> Self {}
}

impl<A: Add<Output = A>> Semigroup for Sum<A> {
    fn combine(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl<A: Ord> Semigroup for Max<A> {
    fn combine(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl<A: Ord> Semigroup for Min<A> {
    fn combine(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}
