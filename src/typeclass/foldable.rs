//! Foldable type class - structures that reduce to a summary value.
//!
//! `fold_left` is the only required method; the rest are derived from it,
//! and implementors override them when they can do better (for example a
//! container that stores its length).

use super::higher::TypeConstructor;

/// A structure whose elements can be folded into a single value.
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::typeclass::Foldable;
///
/// let numbers = vec![1, 2, 3, 4];
/// assert_eq!(numbers.clone().fold_left(0, |total, element| total + element), 10);
/// assert!(numbers.exists(|element| *element == 3));
/// ```
pub trait Foldable: TypeConstructor {
    /// Folds from the first element to the last.
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, Self::Inner) -> B,
        Self: Sized;

    /// Folds from the last element to the first.
    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(Self::Inner, B) -> B,
        Self: Sized,
    {
        self.to_list()
            .into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    /// Returns `true` when there are no elements.
    fn is_empty(&self) -> bool
    where
        Self: Clone,
    {
        self.length() == 0
    }

    /// Counts the elements.
    fn length(&self) -> usize
    where
        Self: Clone,
    {
        self.clone().fold_left(0, |count, _| count + 1)
    }

    /// Collects the elements in fold order.
    fn to_list(self) -> Vec<Self::Inner>
    where
        Self: Sized,
    {
        self.fold_left(Vec::new(), |mut elements, element| {
            elements.push(element);
            elements
        })
    }

    /// Returns the first element satisfying `predicate`.
    fn find<P>(&self, mut predicate: P) -> Option<Self::Inner>
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Clone,
    {
        self.clone()
            .fold_left(None, |found, element| match found {
                Some(_) => found,
                None if predicate(&element) => Some(element),
                None => None,
            })
    }

    /// Returns `true` when any element satisfies `predicate`.
    fn exists<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Clone,
    {
        self.clone()
            .fold_left(false, |found, element| found || predicate(&element))
    }

    /// Returns `true` when every element satisfies `predicate`.
    fn for_all<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Clone,
    {
        !self.exists(|element| !predicate(element))
    }
}

impl<A> Foldable for Option<A> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, A) -> B,
    {
        match self {
            Some(value) => function(init, value),
            None => init,
        }
    }

    fn length(&self) -> usize {
        usize::from(self.is_some())
    }
}

impl<A> Foldable for Vec<A> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, A) -> B,
    {
        self.into_iter().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(A, B) -> B,
    {
        self.into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn to_list(self) -> Vec<A> {
        self
    }
}
