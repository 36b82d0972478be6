//! Persistent (immutable) hash set.
//!
//! This module provides [`PersistentHashSet`], an immutable hash set
//! that uses [`PersistentHashMap`] internally, and [`TransientHashSet`],
//! its single-owner mutable counterpart.
//!
//! # Overview
//!
//! `PersistentHashSet` is a wrapper around `PersistentHashMap<T, ()>` that
//! provides set operations like union, intersection, difference, and
//! symmetric difference.
//!
//! - O(log32 N) contains (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashSet;
//!
//! let set = PersistentHashSet::new()
//!     .insert(1)
//!     .insert(2)
//!     .insert(3);
//!
//! assert!(set.contains(&1));
//! assert!(!set.contains(&4));
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);      // Original unchanged
//! assert_eq!(updated.len(), 4);  // New version
//! ```
//!
//! # Set Operations
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashSet;
//!
//! let set_a: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
//! let set_b: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//!
//! let union = set_a.union(&set_b);           // {1, 2, 3, 4}
//! let intersection = set_a.intersection(&set_b);  // {2, 3}
//! let difference = set_a.difference(&set_b);      // {1}
//! let symmetric_diff = set_a.symmetric_difference(&set_b);  // {1, 4}
//!
//! assert_eq!(union.len(), 4);
//! assert_eq!(intersection.len(), 2);
//! assert_eq!(difference.len(), 1);
//! assert_eq!(symmetric_diff.len(), 2);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::rc::Rc;

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use super::{
    DefaultHashBuilder, PersistentHashMap, PersistentHashMapIntoIterator, PersistentHashMapIterator,
    TransientHashMap,
};
use crate::typeclass::{Foldable, Semigroup, TypeConstructor};

// =============================================================================
// PersistentHashSet Definition
// =============================================================================

/// A persistent (immutable) hash set based on [`PersistentHashMap`].
///
/// # Time Complexity
///
/// | Operation      | Complexity     |
/// |----------------|----------------|
/// | `new`          | O(1)           |
/// | `contains`     | O(log32 N)     |
/// | `insert`       | O(log32 N)     |
/// | `remove`       | O(log32 N)     |
/// | `len`          | O(1)           |
/// | `union`        | O(m log32 N)   |
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::PersistentHashSet;
///
/// let set = PersistentHashSet::new().insert("apple").insert("banana");
/// assert!(set.contains("apple"));
/// assert_eq!(set.len(), 2);
/// ```
pub struct PersistentHashSet<T, S = DefaultHashBuilder> {
    inner: PersistentHashMap<T, (), S>,
}

impl<T, S: Clone> Clone for PersistentHashSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = PersistentHashSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentHashMap::new(),
        }
    }
}

impl<T, S> PersistentHashSet<T, S> {
    /// Creates a new empty set that places elements with `hasher`.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: PersistentHashMap::with_hasher(hasher),
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the hasher the set places elements with.
    #[inline]
    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.inner.hasher()
    }

    /// Returns `true` if both sets share the same root node.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Returns an iterator over the elements of the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
    /// let mut elements: Vec<i32> = set.iter().copied().collect();
    /// elements.sort_unstable();
    /// assert_eq!(elements, vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }

    /// Folds every element into an accumulator.
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter().fold(init, |accumulator, element| function(accumulator, element))
    }

    /// Converts this persistent set into a transient set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let persistent: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    ///
    /// let mut transient = persistent.transient();
    /// transient.insert(4);
    /// transient.insert(5);
    /// transient.remove(&1);
    ///
    /// let updated = transient.persistent();
    /// assert_eq!(updated.len(), 4);
    /// assert!(!updated.contains(&1));
    /// ```
    #[must_use]
    pub fn transient(self) -> TransientHashSet<T, S> {
        TransientHashSet {
            inner: self.inner.transient(),
            _marker: PhantomData,
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> PersistentHashSet<T, S> {
    /// Returns `true` if the set contains `element`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert("hello".to_string());
    /// assert!(set.contains("hello"));
    /// assert!(!set.contains("world"));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns the stored element equal to `element`.
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get_key_value(element).map(|(stored, ())| stored)
    }

    /// Returns `true` if every element of `self` is in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let subset: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let superset: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    ///
    /// assert!(subset.is_subset(&superset));
    /// assert!(!superset.is_subset(&subset));
    /// ```
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if `self` and `other` have no elements in common.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set_a: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let set_b: PersistentHashSet<i32> = [3, 4].into_iter().collect();
    /// let set_c: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// assert!(set_a.is_disjoint(&set_b));
    /// assert!(!set_a.is_disjoint(&set_c));
    /// ```
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        // Iterate over the smaller set
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !smaller.iter().any(|element| larger.contains(element))
    }
}

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Creates a set with a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Builds a set from any [`Foldable`] of elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::from_foldable(vec![3, 1, 3, 2]);
    /// assert_eq!(set.len(), 3);
    /// assert!(PersistentHashSet::from_foldable(Some(7)).contains(&7));
    /// ```
    #[must_use]
    pub fn from_foldable<F>(foldable: F) -> Self
    where
        F: Foldable<Inner = T>,
    {
        foldable
            .fold_left(TransientHashSet::new(), |mut transient, element| {
                transient.insert(element);
                transient
            })
            .persistent()
    }
}

impl<T: Clone + Hash + Eq, S: BuildHasher + Clone> PersistentHashSet<T, S> {
    /// Inserts an element into the set.
    ///
    /// Inserting an element that is already present keeps the stored one.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        if self.contains(&element) {
            return self.clone();
        }
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Removes an element from the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1).insert(2);
    /// let removed = set.remove(&1);
    ///
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(removed.len(), 1);
    /// assert!(!removed.contains(&1));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns the elements in either set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set_a: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let set_b: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let union = set_a.union(&set_b);
    /// assert_eq!(union.len(), 3);
    /// assert!(union.contains(&3));
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        larger.concat(smaller.iter().cloned())
    }

    /// Returns the elements in both sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set_a: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let set_b: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let intersection = set_a.intersection(&set_b);
    /// assert_eq!(intersection.len(), 2);
    /// assert!(intersection.contains(&2));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        // Iterate over the smaller set
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller.filter(|element| larger.contains(element))
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        if other.len() < self.len() {
            return self.remove_many(other.iter());
        }
        self.filter(|element| !other.contains(element))
    }

    /// Returns the elements in exactly one of the two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set_a: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let set_b: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let symmetric_diff = set_a.symmetric_difference(&set_b);
    /// assert_eq!(symmetric_diff.len(), 2);
    /// assert!(symmetric_diff.contains(&1));
    /// assert!(symmetric_diff.contains(&4));
    /// ```
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.mutate(|transient| {
            for element in other {
                if transient.remove(element).is_none() {
                    transient.insert(element.clone());
                }
            }
        })
    }

    /// Inserts every element of `elements`.
    #[must_use]
    pub fn concat<I>(&self, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.mutate(|transient| transient.extend(elements))
    }

    /// Removes every element yielded by `elements`.
    #[must_use]
    pub fn remove_many<'a, Q, I>(&self, elements: I) -> Self
    where
        I: IntoIterator<Item = &'a Q>,
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        Self {
            inner: self.inner.remove_many(elements),
        }
    }

    /// Runs `function` against a transient copy of this set and returns the
    /// frozen result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let base: PersistentHashSet<i32> = (0..5).collect();
    /// let shifted = base.mutate(|transient| {
    ///     transient.remove(&0);
    ///     transient.insert(5);
    /// });
    ///
    /// assert!(base.contains(&0));
    /// assert!(shifted.contains(&5));
    /// assert_eq!(shifted.len(), 5);
    /// ```
    #[must_use]
    pub fn mutate<F>(&self, function: F) -> Self
    where
        F: FnOnce(&mut TransientHashSet<T, S>),
    {
        let mut transient = self.clone().transient();
        function(&mut transient);
        transient.persistent()
    }

    /// Transforms every element. Elements that map to equal values merge.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = (-2..=2).collect();
    /// let squares = set.map(|element| element * element);
    /// assert_eq!(squares.len(), 3);
    /// ```
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> PersistentHashSet<U, S>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> U,
    {
        self.build_from(self.iter().map(function))
    }

    /// Keeps the elements satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.build_from(self.iter().filter(|element| predicate(element)).cloned())
    }

    /// Transforms elements, dropping those for which `function` returns `None`.
    #[must_use]
    pub fn filter_map<U, F>(&self, function: F) -> PersistentHashSet<U, S>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> Option<U>,
    {
        self.build_from(self.iter().filter_map(function))
    }

    /// Splits the set into the elements satisfying `predicate` and the rest.
    #[must_use]
    pub fn partition<P>(&self, mut predicate: P) -> (Self, Self)
    where
        P: FnMut(&T) -> bool,
    {
        self.partition_map(|element| {
            if predicate(element) {
                Err(element.clone())
            } else {
                Ok(element.clone())
            }
        })
    }

    /// Splits the set by the side `function` picks for each element:
    /// `Err` values go to the first set, `Ok` values to the second.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let raw: PersistentHashSet<&str> = ["1", "two", "3"].into_iter().collect();
    /// let (words, numbers) = raw.partition_map(|text| text.parse::<i32>().map_err(|_| text.to_uppercase()));
    ///
    /// assert!(words.contains("TWO"));
    /// assert_eq!(numbers.len(), 2);
    /// ```
    #[must_use]
    pub fn partition_map<A, B, F>(&self, mut function: F) -> (PersistentHashSet<A, S>, PersistentHashSet<B, S>)
    where
        A: Clone + Hash + Eq,
        B: Clone + Hash + Eq,
        F: FnMut(&T) -> Result<B, A>,
    {
        let mut left = TransientHashSet::with_hasher(self.hasher().clone());
        let mut right = TransientHashSet::with_hasher(self.hasher().clone());
        for element in self {
            match function(element) {
                Err(mapped) => {
                    left.insert(mapped);
                }
                Ok(mapped) => {
                    right.insert(mapped);
                }
            }
        }
        (left.persistent(), right.persistent())
    }

    /// Replaces every element by the elements `function` yields for it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<u32> = [1, 3].into_iter().collect();
    /// let neighbours = set.flat_map(|element| [element - 1, element + 1]);
    /// assert_eq!(neighbours.len(), 3); // 0, 2, 4
    /// ```
    #[must_use]
    pub fn flat_map<U, I, F>(&self, function: F) -> PersistentHashSet<U, S>
    where
        U: Clone + Hash + Eq,
        I: IntoIterator<Item = U>,
        F: FnMut(&T) -> I,
    {
        self.build_from(self.iter().flat_map(function))
    }

    fn build_from<U, I>(&self, elements: I) -> PersistentHashSet<U, S>
    where
        U: Clone + Hash + Eq,
        I: IntoIterator<Item = U>,
    {
        let mut transient = TransientHashSet::with_hasher(self.hasher().clone());
        transient.extend(elements);
        transient.persistent()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<T> Clone for PersistentHashSetIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for PersistentHashSetIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    inner: PersistentHashMapIntoIterator<T, ()>,
}

impl<T: Clone> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone> ExactSizeIterator for PersistentHashSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone> FusedIterator for PersistentHashSetIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Default> Default for PersistentHashSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientHashSet::with_hasher(S::default());
        transient.extend(iter);
        transient.persistent()
    }
}

impl<T: Clone, S> IntoIterator for PersistentHashSet<T, S> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashSetIntoIterator {
            inner: self.inner.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a PersistentHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Hash + Eq, S: BuildHasher> PartialEq for PersistentHashSet<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Hash + Eq, S: BuildHasher> Eq for PersistentHashSet<T, S> {}

impl<T: Hash, S> Hash for PersistentHashSet<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T: fmt::Debug, S> fmt::Debug for PersistentHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S> fmt::Display for PersistentHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T, S> TypeConstructor for PersistentHashSet<T, S> {
    type Inner = T;
    type WithType<B> = PersistentHashSet<B, S>;
}

impl<T: Clone, S> Foldable for PersistentHashSet<T, S> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.into_iter().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(T, B) -> B,
    {
        let elements: Vec<T> = self.into_iter().collect();
        elements
            .into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn length(&self) -> usize {
        self.inner.len()
    }
}

/// Combining two sets takes their union.
impl<T, S> Semigroup for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    fn combine(self, other: Self) -> Self {
        self.union(&other)
    }
}

// =============================================================================
// TransientHashSet Definition
// =============================================================================

/// A transient (temporarily mutable) hash set for efficient batch updates.
///
/// `TransientHashSet` is a wrapper around [`TransientHashMap<T, ()>`](TransientHashMap).
/// After batch updates, convert to [`PersistentHashSet`] using
/// [`persistent()`](Self::persistent).
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::TransientHashSet;
///
/// let mut transient = TransientHashSet::new();
/// assert!(transient.insert(1));
/// assert!(transient.insert(2));
/// assert!(!transient.insert(1));
///
/// let persistent = transient.persistent();
/// assert!(persistent.contains(&1));
/// assert_eq!(persistent.len(), 2);
/// ```
pub struct TransientHashSet<T, S = DefaultHashBuilder> {
    inner: TransientHashMap<T, (), S>,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientHashSet<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientHashSet<String>: Send, Sync);

#[cfg(feature = "arc")]
mod arc_send_sync_verification_hashset {
    use super::{PersistentHashSet, TransientHashSet};
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientHashSet<Arc<i32>>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentHashSet<Arc<String>>: Send, Sync);
}

impl<T> TransientHashSet<T> {
    /// Creates a new empty transient set with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<T, S> TransientHashSet<T, S> {
    /// Creates a new empty transient set that places elements with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: TransientHashMap::with_hasher(hasher),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the current elements.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }

    /// Freezes this transient set into a persistent set.
    #[must_use]
    pub fn persistent(self) -> PersistentHashSet<T, S> {
        PersistentHashSet {
            inner: self.inner.persistent(),
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> TransientHashSet<T, S> {
    /// Returns `true` if `element` is present.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }
}

impl<T: Clone + Hash + Eq, S: BuildHasher> TransientHashSet<T, S> {
    /// Inserts an element. Returns `true` if it was not already present.
    pub fn insert(&mut self, element: T) -> bool {
        if self.inner.contains_key(&element) {
            return false;
        }
        self.inner.insert(element, ());
        true
    }

    /// Removes an element, returning it if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> Option<()>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(element)
    }
}

impl<T> Default for TransientHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq, S: BuildHasher> Extend<T> for TransientHashSet<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for TransientHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = Self::new();
        transient.extend(iter);
        transient
    }
}

impl<T: fmt::Debug, S> fmt::Debug for TransientHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, S> serde::Serialize for PersistentHashSet<T, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashSetVisitor<T, S> {
    marker: PhantomData<PersistentHashSet<T, S>>,
}

#[cfg(feature = "serde")]
impl<T, S> PersistentHashSetVisitor<T, S> {
    const fn new() -> Self {
        Self { marker: PhantomData }
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::de::Visitor<'de> for PersistentHashSetVisitor<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Default,
{
    type Value = PersistentHashSet<T, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = TransientHashSet::with_hasher(S::default());
        while let Some(element) = seq.next_element()? {
            transient.insert(element);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for PersistentHashSet<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentHashSetVisitor::new())
    }
}

// =============================================================================
// Rayon Support
// =============================================================================

/// A parallel iterator over borrowed elements of a [`PersistentHashSet`].
#[cfg(feature = "rayon")]
pub struct PersistentHashSetParallelRefIterator<'a, T> {
    inner: super::PersistentHashMapParallelRefIterator<'a, T, ()>,
}

#[cfg(feature = "rayon")]
impl<'a, T: Send + Sync> rayon::iter::ParallelIterator for PersistentHashSetParallelRefIterator<'a, T> {
    type Item = &'a T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        self.inner.map(|(element, ())| element).drive_unindexed(consumer)
    }
}

/// A parallel iterator over owned elements of a [`PersistentHashSet`].
#[cfg(feature = "rayon")]
pub struct PersistentHashSetParallelIterator<T> {
    inner: super::PersistentHashMapParallelIterator<T, ()>,
}

#[cfg(feature = "rayon")]
impl<T: Send> rayon::iter::ParallelIterator for PersistentHashSetParallelIterator<T> {
    type Item = T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        self.inner.map(|(element, ())| element).drive_unindexed(consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        self.inner.opt_len()
    }
}

#[cfg(feature = "rayon")]
impl<'a, T: Send + Sync, S> rayon::iter::IntoParallelIterator for &'a PersistentHashSet<T, S> {
    type Item = &'a T;
    type Iter = PersistentHashSetParallelRefIterator<'a, T>;

    fn into_par_iter(self) -> Self::Iter {
        PersistentHashSetParallelRefIterator {
            inner: self.inner.par_iter(),
        }
    }
}

#[cfg(feature = "rayon")]
impl<T: Clone + Send + Sync, S> rayon::iter::IntoParallelIterator for PersistentHashSet<T, S> {
    type Item = T;
    type Iter = PersistentHashSetParallelIterator<T>;

    fn into_par_iter(self) -> Self::Iter {
        PersistentHashSetParallelIterator {
            inner: self.inner.into_par_iter(),
        }
    }
}

#[cfg(feature = "rayon")]
impl<T, S> rayon::iter::FromParallelIterator<T> for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq + Send,
    S: BuildHasher + Default,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: rayon::iter::IntoParallelIterator<Item = T>,
    {
        let elements: Vec<T> = par_iter.into_par_iter().collect();
        elements.into_iter().collect()
    }
}

#[cfg(feature = "rayon")]
impl<T: Send + Sync, S> PersistentHashSet<T, S> {
    /// Returns a parallel iterator over borrowed elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashSet;
    /// use rayon::prelude::*;
    ///
    /// let set: PersistentHashSet<u64> = (1..=100).collect();
    /// assert_eq!(set.par_iter().sum::<u64>(), 5050);
    /// ```
    #[must_use]
    pub fn par_iter(&self) -> PersistentHashSetParallelRefIterator<'_, T> {
        rayon::iter::IntoParallelIterator::into_par_iter(self)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_empty_hashset() {
        let set: PersistentHashSet<i32> = PersistentHashSet::new();
        assert_eq!(format!("{set}"), "{}");
    }

    #[rstest]
    fn test_display_single_element_hashset() {
        let set = PersistentHashSet::singleton(42);
        assert_eq!(format!("{set}"), "{42}");
    }

    #[rstest]
    fn test_display_multiple_elements_hashset() {
        let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
        let display = format!("{set}");
        // Order is trie order, so only the shape is checked
        assert!(display.starts_with('{'));
        assert!(display.ends_with('}'));
        assert_eq!(display.matches(", ").count(), 2);
    }

    // =========================================================================
    // Basic Operations
    // =========================================================================

    #[rstest]
    fn test_insert_present_element_shares_root() {
        let set = PersistentHashSet::new().insert(1).insert(2);
        assert!(set.insert(1).ptr_eq(&set));
    }

    #[rstest]
    fn test_get_returns_stored_element() {
        let set = PersistentHashSet::new().insert("stored".to_string());
        assert_eq!(set.get("stored").map(String::as_str), Some("stored"));
        assert_eq!(set.get("missing"), None);
    }

    #[rstest]
    #[case(&[], &[], &[])]
    #[case(&[1, 2, 3], &[], &[1, 2, 3])]
    #[case(&[1, 2, 3], &[2, 3, 4], &[1])]
    #[case(&[1, 2], &[1, 2, 3, 4, 5], &[])]
    fn test_difference(#[case] left: &[i32], #[case] right: &[i32], #[case] expected: &[i32]) {
        let left: PersistentHashSet<i32> = left.iter().copied().collect();
        let right: PersistentHashSet<i32> = right.iter().copied().collect();
        let expected: PersistentHashSet<i32> = expected.iter().copied().collect();
        assert_eq!(left.difference(&right), expected);
    }

    #[rstest]
    fn test_symmetric_difference_leaves_operands_untouched() {
        let left: PersistentHashSet<i32> = (0..10).collect();
        let right: PersistentHashSet<i32> = (5..15).collect();
        let result = left.symmetric_difference(&right);

        let expected: PersistentHashSet<i32> = (0..5).chain(10..15).collect();
        assert_eq!(result, expected);
        assert_eq!(left.len(), 10);
        assert_eq!(right.len(), 10);
    }

    #[rstest]
    fn test_partition_splits_by_predicate() {
        let set: PersistentHashSet<i32> = (0..10).collect();
        let (small, large) = set.partition(|element| *element < 3);
        let expected: PersistentHashSet<i32> = [0, 1, 2].into_iter().collect();
        assert_eq!(small, expected);
        assert_eq!(large.len(), 7);
    }

    #[rstest]
    fn test_semigroup_is_union() {
        let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
        let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
        let expected: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(left.combine(right), expected);
    }

    #[rstest]
    fn test_transient_remove_reports_presence() {
        let mut transient: TransientHashSet<i32> = (0..3).collect();
        assert_eq!(transient.remove(&1), Some(()));
        assert_eq!(transient.remove(&1), None);
        assert_eq!(transient.len(), 2);
    }
}
