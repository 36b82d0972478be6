//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map
//! that uses structural sharing for efficient operations, and
//! [`TransientHashMap`], its single-owner mutable counterpart.
//!
//! # Overview
//!
//! `PersistentHashMap` is based on a Hash Array Mapped Trie (HAMT). It uses a
//! 32-way branching trie where successive 5-bit fragments of a 32-bit key
//! hash select the path.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! All operations return new maps without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Examples
//!
//! ```rust
//! use persistent_hamt::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2)
//!     .insert("three".to_string(), 3);
//!
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(map.get("two"), Some(&2));
//! assert_eq!(map.get("three"), Some(&3));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! # Internal Structure
//!
//! The HAMT uses:
//! - 32-way branching (5 bits per level, at most 7 levels)
//! - Bitmap-indexed nodes up to 16 children, dense array nodes above that
//! - Collision nodes for keys whose hashes are equal
//! - Structural sharing via `Rc` (or `Arc` with the `arc` feature)

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Index;
use std::rc::Rc;

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use super::DefaultHashBuilder;
use super::hamt::{self, Child, Edit, hash_key};
use crate::typeclass::{Foldable, Semigroup, TypeConstructor};

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// `PersistentHashMap` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns.
///
/// `S` is the [`BuildHasher`] that places keys in the trie. Equal keys must
/// hash equally; [`DefaultHashBuilder`] is deterministic, so two maps built
/// with it agree on every key's position.
///
/// # Time Complexity
///
/// | Operation      | Complexity     |
/// |----------------|----------------|
/// | `new`          | O(1)           |
/// | `get`          | O(log32 N)     |
/// | `insert`       | O(log32 N)     |
/// | `remove`       | O(log32 N)     |
/// | `contains_key` | O(log32 N)     |
/// | `len`          | O(1)           |
/// | `iter`         | O(1) to create |
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::new()
///     .insert(1, "one")
///     .insert(2, "two");
///
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.len(), 2);
/// ```
pub struct PersistentHashMap<K, V, S = DefaultHashBuilder> {
    root: Child<K, V>,
    length: usize,
    hasher: S,
}

impl<K, V, S: Clone> Clone for PersistentHashMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
            hasher: self.hasher.clone(),
        }
    }
}

/// Returned by [`PersistentHashMap::try_from_unique_entries`] when a key
/// appears more than once.
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::PersistentHashMap;
///
/// let result = PersistentHashMap::try_from_unique_entries(vec![("a", 1), ("b", 2), ("a", 3)]);
/// let error = result.unwrap_err();
/// assert_eq!(error.key, "a");
/// assert_eq!(error.to_string(), "duplicate key \"a\" in entries");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyError<K> {
    /// The first key seen twice.
    pub key: K,
}

impl<K: fmt::Debug> fmt::Display for DuplicateKeyError<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "duplicate key {:?} in entries", self.key)
    }
}

impl<K: fmt::Debug> std::error::Error for DuplicateKeyError<K> {}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> PersistentHashMap<K, V, S> {
    /// Creates a new empty map that places keys with `hasher`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::with_hasher(RandomState::new()).insert("key", 1);
    /// assert_eq!(map.get("key"), Some(&1));
    /// ```
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: hamt::empty(),
            length: 0,
            hasher,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the hasher the map places keys with.
    #[inline]
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// Equal pointers imply equal contents; the converse does not hold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, "one");
    /// assert!(map.ptr_eq(&map.clone()));
    /// assert!(map.ptr_eq(&map.remove(&2)));
    /// assert!(!map.ptr_eq(&map.insert(2, "two")));
    /// ```
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        super::ReferenceCounter::ptr_eq(&self.root, &other.root)
    }

    /// Returns an iterator over key-value pairs in trie order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            inner: hamt::Iter::new(&self.root, self.length),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + FusedIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + FusedIterator {
        self.iter().map(|(_, value)| value)
    }

    /// Folds every entry into an accumulator, in trie order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1_usize).insert("bb", 2);
    /// let weighted = map.fold(0, |total, key, value| total + key.len() * value);
    /// assert_eq!(weighted, 5);
    /// ```
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Calls `function` on every entry.
    pub fn for_each<F>(&self, mut function: F)
    where
        F: FnMut(&K, &V),
    {
        self.iter().for_each(|(key, value)| function(key, value));
    }

    /// Converts this persistent map into a transient map.
    ///
    /// This consumes the `PersistentHashMap`. Nodes the transient holds the
    /// only reference to are edited in place; nodes still shared with other
    /// maps are copied the first time they are written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let persistent = PersistentHashMap::new().insert(1, "one");
    /// let mut transient = persistent.transient();
    /// transient.insert(2, "two");
    /// transient.remove(&1);
    ///
    /// let updated = transient.persistent();
    /// assert_eq!(updated.len(), 1);
    /// assert_eq!(updated.get(&2), Some(&"two"));
    /// ```
    #[must_use]
    pub fn transient(self) -> TransientHashMap<K, V, S> {
        trace_event!(length = self.length, "began transient");
        TransientHashMap {
            root: self.root,
            length: self.length,
            hasher: self.hasher,
            _marker: PhantomData,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> PersistentHashMap<K, V, S> {
    /// Returns a reference to the value for `key`.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash`
    /// and `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        hamt::lookup(&self.root, hash_key(&self.hasher, key), key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map with a single entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 42);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Builds a map from any [`Foldable`] of entries, combining the values
    /// of repeated keys with their [`Semigroup`] (earlier value on the left).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    /// use persistent_hamt::typeclass::Sum;
    ///
    /// let sales = vec![("apples", Sum::new(3)), ("pears", Sum::new(1)), ("apples", Sum::new(4))];
    /// let totals = PersistentHashMap::from_foldable(sales);
    ///
    /// assert_eq!(totals.get("apples"), Some(&Sum::new(7)));
    /// assert_eq!(totals.len(), 2);
    /// ```
    #[must_use]
    pub fn from_foldable<F>(foldable: F) -> Self
    where
        F: Foldable<Inner = (K, V)>,
        V: Semigroup,
    {
        Self::from_foldable_with(DefaultHashBuilder::default(), foldable, V::combine)
    }

    /// Builds a map from entries whose keys must all be distinct.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] carrying the first repeated key.
    pub fn try_from_unique_entries<I>(entries: I) -> Result<Self, DuplicateKeyError<K>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut transient = TransientHashMap::new();
        for (key, value) in entries {
            if transient.contains_key(&key) {
                return Err(DuplicateKeyError { key });
            }
            transient.insert(key, value);
        }
        Ok(transient.persistent())
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher + Clone> PersistentHashMap<K, V, S> {
    /// Builds a map from any [`Foldable`] of entries with an explicit hasher,
    /// resolving repeated keys with `combine(earlier, later)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let entries = vec![("a", 1), ("b", 2), ("a", 5)];
    /// let largest = PersistentHashMap::from_foldable_with(RandomState::new(), entries, i32::max);
    /// assert_eq!(largest.get("a"), Some(&5));
    /// ```
    #[must_use]
    pub fn from_foldable_with<F, C>(hasher: S, foldable: F, mut combine: C) -> Self
    where
        F: Foldable<Inner = (K, V)>,
        C: FnMut(V, V) -> V,
    {
        foldable
            .fold_left(
                TransientHashMap::with_hasher(hasher),
                |mut transient, (key, value)| {
                    transient.insert_combining(key, value, &mut combine);
                    transient
                },
            )
            .persistent()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced and the
    /// stored key is kept.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut map = self.clone();
        let hash = hash_key(&map.hasher, &key);
        hamt::insert(&mut map.root, hash, key, value, &mut map.length);
        map
    }

    /// Removes a key from the map.
    ///
    /// Removing an absent key returns a map that shares the original root.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.clone();
        let hash = hash_key(&map.hasher, key);
        hamt::delete(&mut map.root, hash, key, &mut map.length);
        map
    }

    /// Applies `function` to the value of a present key.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1);
    ///
    /// assert_eq!(updated.unwrap().get("count"), Some(&11));
    /// assert!(map.update("missing", |value| value + 1).is_none());
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let hash = hash_key(&self.hasher, key);
        let (_, current) = hamt::lookup(&self.root, hash, key)?;
        let value = function(current);
        let mut map = self.clone();
        hamt::replace(&mut map.root, 0, hash, key, value);
        Some(map)
    }

    /// Updates, inserts or removes the entry for `key`.
    ///
    /// `updater` receives the current value (or `None`) and returns the new
    /// value (or `None` to remove).
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    ///
    /// // Increment existing value
    /// let updated = map.update_with("count", |maybe_value| maybe_value.map(|value| value + 1));
    /// assert_eq!(updated.get("count"), Some(&11));
    ///
    /// // Insert if not exists
    /// let inserted = map.update_with("new_key", |maybe_value| Some(maybe_value.copied().unwrap_or(100)));
    /// assert_eq!(inserted.get("new_key"), Some(&100));
    ///
    /// // Remove by returning None
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        self.alter(key, |current| Edit::from(updater(current)))
    }

    /// Applies an [`Edit`] computed from the current value of `key`.
    ///
    /// `Edit::Keep` returns a map sharing this map's root, so callers can
    /// detect the no-op with [`ptr_eq`](Self::ptr_eq).
    #[must_use]
    pub fn alter<Q, F>(&self, key: &Q, function: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Edit<V>,
    {
        let mut map = self.clone();
        let hash = hash_key(&map.hasher, key);
        hamt::modify(
            &mut map.root,
            hash,
            key,
            || key.to_owned(),
            function,
            &mut map.length,
        );
        map
    }

    /// Merges two maps, with values from `other` taking precedence on key conflicts.
    ///
    /// # Complexity
    ///
    /// O(m log32 (n + m)) where m is the size of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let map2 = PersistentHashMap::new()
    ///     .insert("b".to_string(), 20)
    ///     .insert("c".to_string(), 3);
    ///
    /// let merged = map1.merge(&map2);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20)); // From map2
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.concat(other.iter().map(|(key, value)| (key.clone(), value.clone())))
    }

    /// Merges two maps, resolving shared keys with
    /// `function(key, self_value, other_value)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let stock = PersistentHashMap::new().insert("apples", 3).insert("pears", 2);
    /// let delivery = PersistentHashMap::new().insert("apples", 10).insert("plums", 4);
    ///
    /// let total = stock.merge_with(&delivery, |_, current, delivered| current + delivered);
    /// assert_eq!(total.get("apples"), Some(&13));
    /// assert_eq!(total.get("plums"), Some(&4));
    /// ```
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, mut function: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        self.mutate(|transient| {
            for (key, value) in other {
                let merged = match transient.get(key) {
                    Some(current) => function(key, current, value),
                    None => value.clone(),
                };
                transient.insert(key.clone(), merged);
            }
        })
    }

    /// Inserts every entry of `entries`; later entries overwrite earlier ones.
    #[must_use]
    pub fn concat<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.mutate(|transient| transient.extend(entries))
    }

    /// Inserts every entry of `entries`, resolving keys already present with
    /// `combine(key, current, incoming)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let words = PersistentHashMap::new().insert("a", 1);
    /// let counted = words.concat_with([("a", 1), ("b", 1), ("a", 1)], |_, current, incoming| current + incoming);
    /// assert_eq!(counted.get("a"), Some(&3));
    /// assert_eq!(counted.get("b"), Some(&1));
    /// ```
    #[must_use]
    pub fn concat_with<I, F>(&self, entries: I, mut combine: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        F: FnMut(&K, &V, V) -> V,
    {
        self.mutate(|transient| {
            for (key, value) in entries {
                let combined = match transient.get(&key) {
                    Some(current) => combine(&key, current, value),
                    None => value,
                };
                transient.insert(key, combined);
            }
        })
    }

    /// Removes every key yielded by `keys`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = (0..10).map(|key| (key, key)).collect();
    /// let trimmed = map.remove_many(&[1, 3, 5, 42]);
    /// assert_eq!(trimmed.len(), 7);
    /// assert!(!trimmed.contains_key(&3));
    /// ```
    #[must_use]
    pub fn remove_many<'a, Q, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a Q>,
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        self.mutate(|transient| {
            for key in keys {
                transient.remove(key);
            }
        })
    }

    /// Runs `function` against a transient copy of this map and returns the
    /// frozen result. This map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let base: PersistentHashMap<i32, i32> = (0..4).map(|key| (key, key)).collect();
    /// let doubled = base.mutate(|transient| {
    ///     for key in 0..4 {
    ///         transient.update_with(&key, |value| value.map(|value| value * 2));
    ///     }
    ///     transient.remove(&0);
    /// });
    ///
    /// assert_eq!(base.get(&3), Some(&3));
    /// assert_eq!(doubled.get(&3), Some(&6));
    /// assert_eq!(doubled.len(), 3);
    /// ```
    #[must_use]
    pub fn mutate<F>(&self, function: F) -> Self
    where
        F: FnOnce(&mut TransientHashMap<K, V, S>),
    {
        let mut transient = self.clone().transient();
        function(&mut transient);
        transient.persistent()
    }

    /// Transforms every value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let labels = map.map_values(|value| format!("#{value}"));
    /// assert_eq!(labels.get("b"), Some(&"#2".to_string()));
    /// ```
    #[must_use]
    pub fn map_values<W, F>(&self, mut function: F) -> PersistentHashMap<K, W, S>
    where
        W: Clone,
        F: FnMut(&V) -> W,
    {
        self.map_with_key(|_, value| function(value))
    }

    /// Transforms every value, with access to its key.
    #[must_use]
    pub fn map_with_key<W, F>(&self, mut function: F) -> PersistentHashMap<K, W, S>
    where
        W: Clone,
        F: FnMut(&K, &V) -> W,
    {
        self.build_from(|transient| {
            for (key, value) in self {
                transient.insert(key.clone(), function(key, value));
            }
        })
    }

    /// Keeps the entries whose value satisfies `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&V) -> bool,
    {
        self.filter_with_key(|_, value| predicate(value))
    }

    /// Keeps the entries satisfying `predicate`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = (0..10).map(|key| (key, key * key)).collect();
    /// let small_even = map.filter_with_key(|key, square| key % 2 == 0 && *square < 40);
    /// assert_eq!(small_even.len(), 4); // 0, 2, 4, 6
    /// ```
    #[must_use]
    pub fn filter_with_key<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.filter_map_with_key(|key, value| predicate(key, value).then(|| value.clone()))
    }

    /// Transforms values, dropping the entries for which `function` returns `None`.
    #[must_use]
    pub fn filter_map<W, F>(&self, mut function: F) -> PersistentHashMap<K, W, S>
    where
        W: Clone,
        F: FnMut(&V) -> Option<W>,
    {
        self.filter_map_with_key(|_, value| function(value))
    }

    /// Keyed form of [`filter_map`](Self::filter_map).
    #[must_use]
    pub fn filter_map_with_key<W, F>(&self, mut function: F) -> PersistentHashMap<K, W, S>
    where
        W: Clone,
        F: FnMut(&K, &V) -> Option<W>,
    {
        self.build_from(|transient| {
            for (key, value) in self {
                if let Some(mapped) = function(key, value) {
                    transient.insert(key.clone(), mapped);
                }
            }
        })
    }

    /// Splits the map into the entries whose value satisfies `predicate`
    /// and the rest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = (0..10).map(|key| (key, key)).collect();
    /// let (even, odd) = map.partition(|value| value % 2 == 0);
    /// assert_eq!(even.len(), 5);
    /// assert!(odd.contains_key(&7));
    /// ```
    #[must_use]
    pub fn partition<P>(&self, mut predicate: P) -> (Self, Self)
    where
        P: FnMut(&V) -> bool,
    {
        self.partition_with_key(|_, value| predicate(value))
    }

    /// Keyed form of [`partition`](Self::partition).
    #[must_use]
    pub fn partition_with_key<P>(&self, mut predicate: P) -> (Self, Self)
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.partition_map_with_key(|key, value| {
            if predicate(key, value) {
                Err(value.clone())
            } else {
                Ok(value.clone())
            }
        })
    }

    /// Splits the map by the side `function` picks for each value:
    /// `Err` entries go to the first map, `Ok` entries to the second.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let readings = PersistentHashMap::new().insert("a", "12").insert("b", "x").insert("c", "7");
    /// let (invalid, parsed) = readings.partition_map(|raw| raw.parse::<i32>().map_err(|_| raw.len()));
    ///
    /// assert_eq!(invalid.get("b"), Some(&1));
    /// assert_eq!(parsed.get("a"), Some(&12));
    /// assert_eq!(parsed.len(), 2);
    /// ```
    #[must_use]
    pub fn partition_map<A, B, F>(&self, mut function: F) -> (PersistentHashMap<K, A, S>, PersistentHashMap<K, B, S>)
    where
        A: Clone,
        B: Clone,
        F: FnMut(&V) -> Result<B, A>,
    {
        self.partition_map_with_key(|_, value| function(value))
    }

    fn partition_map_with_key<A, B, F>(
        &self,
        mut function: F,
    ) -> (PersistentHashMap<K, A, S>, PersistentHashMap<K, B, S>)
    where
        A: Clone,
        B: Clone,
        F: FnMut(&K, &V) -> Result<B, A>,
    {
        let mut left = TransientHashMap::with_hasher(self.hasher.clone());
        let mut right = TransientHashMap::with_hasher(self.hasher.clone());
        for (key, value) in self {
            match function(key, value) {
                Err(mapped) => {
                    left.insert(key.clone(), mapped);
                }
                Ok(mapped) => {
                    right.insert(key.clone(), mapped);
                }
            }
        }
        (left.persistent(), right.persistent())
    }

    /// Replaces every entry by the entries `function` yields for it. Later
    /// entries win when keys repeat.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    ///
    /// let ranges = PersistentHashMap::new().insert("low", 0..2).insert("high", 8..10);
    /// let expanded = ranges.flat_map(|name, range| {
    ///     let name = *name;
    ///     range.clone().map(move |number| (number, name))
    /// });
    ///
    /// assert_eq!(expanded.len(), 4);
    /// assert_eq!(expanded.get(&9), Some(&"high"));
    /// ```
    #[must_use]
    pub fn flat_map<K2, V2, I, F>(&self, mut function: F) -> PersistentHashMap<K2, V2, S>
    where
        K2: Clone + Hash + Eq,
        V2: Clone,
        I: IntoIterator<Item = (K2, V2)>,
        F: FnMut(&K, &V) -> I,
    {
        self.build_from(|transient| {
            for (key, value) in self {
                transient.extend(function(key, value));
            }
        })
    }

    /// Builds a fresh map with this map's hasher.
    fn build_from<K2, V2, F>(&self, fill: F) -> PersistentHashMap<K2, V2, S>
    where
        K2: Clone + Hash + Eq,
        V2: Clone,
        F: FnOnce(&mut TransientHashMap<K2, V2, S>),
    {
        let mut transient = TransientHashMap::with_hasher(self.hasher.clone());
        fill(&mut transient);
        transient.persistent()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
///
/// Each iterator keeps its own traversal stack, so several can walk the same
/// map independently.
pub struct PersistentHashMapIterator<'a, K, V> {
    inner: hamt::Iter<'a, K, V>,
}

impl<K, V> Clone for PersistentHashMapIterator<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
///
/// Entries are produced lazily; nodes no other map shares are taken apart
/// without cloning.
pub struct PersistentHashMapIntoIterator<K, V> {
    inner: hamt::IntoIter<K, V>,
}

impl<K: Clone, V: Clone> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K: Clone, V: Clone> FusedIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, S: Default> Default for PersistentHashMap<K, V, S> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::with_hasher(S::default());
        transient.extend(iter);
        transient.persistent()
    }
}

impl<K: Clone, V: Clone, S> IntoIterator for PersistentHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashMapIntoIterator {
            inner: hamt::IntoIter::new(self.root, self.length),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a PersistentHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> PartialEq for PersistentHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if self.ptr_eq(other) {
            return true;
        }
        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|other_value| other_value == value))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for PersistentHashMap<K, V, S> {}

/// Hashes the entries as an unordered collection, so maps that compare
/// equal hash equally whatever their trie layout or hasher.
impl<K: Hash, V: Hash, S> Hash for PersistentHashMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0_u64, |accumulator, (key, value)| {
            let mut entry_hasher = DefaultHasher::new();
            key.hash(&mut entry_hasher);
            value.hash(&mut entry_hasher);
            accumulator.wrapping_add(entry_hasher.finish())
        });
        self.length.hash(state);
        combined.hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for PersistentHashMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for PersistentHashMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

impl<K, Q, V, S> Index<&Q> for PersistentHashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in PersistentHashMap")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

/// `PersistentHashMap` as a container of `V` values with `K` (and the
/// hasher) fixed.
impl<K, V, S> TypeConstructor for PersistentHashMap<K, V, S> {
    type Inner = V;
    type WithType<B> = PersistentHashMap<K, B, S>;
}

impl<K: Clone, V: Clone, S: Clone> Foldable for PersistentHashMap<K, V, S> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, V) -> B,
    {
        self.into_iter()
            .fold(init, |accumulator, (_, value)| function(accumulator, value))
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(V, B) -> B,
    {
        // Iteration order is trie order, so "right" is the reverse of that.
        let values: Vec<V> = self.into_iter().map(|(_, value)| value).collect();
        values
            .into_iter()
            .rev()
            .fold(init, |accumulator, value| function(value, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

/// Right-biased union: on shared keys the right operand's value wins.
impl<K, V, S> Semigroup for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn combine(self, other: Self) -> Self {
        self.merge(&other)
    }
}

// =============================================================================
// TransientHashMap Definition
// =============================================================================

/// A transient (temporarily mutable) hash map for efficient batch updates.
///
/// Obtained from [`PersistentHashMap::transient`] or created empty, and
/// frozen with [`persistent()`](Self::persistent). Nodes the transient owns
/// exclusively are edited in place; nodes still shared with a persistent map
/// are copied once and owned from then on.
///
/// # Design
///
/// - `persistent(self)` consumes the handle, so it cannot be used afterwards
/// - `PhantomData<Rc<()>>` keeps it `!Send` and `!Sync`
/// - `Clone` is not implemented
///
/// ```compile_fail
/// use persistent_hamt::persistent::TransientHashMap;
///
/// let mut transient: TransientHashMap<i32, i32> = TransientHashMap::new();
/// transient.insert(1, 1);
/// let frozen = transient.persistent();
/// transient.insert(2, 2); // use after move
/// ```
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::TransientHashMap;
///
/// let mut transient = TransientHashMap::new();
/// for index in 0..100 {
///     transient.insert(index, index.to_string());
/// }
/// assert_eq!(transient.insert(7, "seven".to_string()), Some("7".to_string()));
///
/// let map = transient.persistent();
/// assert_eq!(map.len(), 100);
/// assert_eq!(map.get(&7), Some(&"seven".to_string()));
/// ```
pub struct TransientHashMap<K, V, S = DefaultHashBuilder> {
    root: Child<K, V>,
    length: usize,
    hasher: S,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

// Static assertions to verify TransientHashMap is not Send/Sync
static_assertions::assert_not_impl_any!(TransientHashMap<i32, i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientHashMap<String, String>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientHashMap<i32, i32>: Clone);

// Arc feature verification: even with Arc, TransientHashMap remains !Send/!Sync
#[cfg(feature = "arc")]
mod arc_send_sync_verification_hashmap {
    use super::{PersistentHashMap, TransientHashMap};
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientHashMap<Arc<i32>, Arc<i32>>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentHashMap<String, Arc<i32>>: Send, Sync);
}

impl<K, V> TransientHashMap<K, V> {
    /// Creates a new empty transient map with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> TransientHashMap<K, V, S> {
    /// Creates a new empty transient map that places keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: hamt::empty(),
            length: 0,
            hasher,
            _marker: PhantomData,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator over the current entries.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            inner: hamt::Iter::new(&self.root, self.length),
        }
    }

    /// Freezes this transient map into a persistent map.
    ///
    /// # Complexity
    ///
    /// O(1) - only moves fields
    #[must_use]
    pub fn persistent(self) -> PersistentHashMap<K, V, S> {
        trace_event!(length = self.length, "ended transient");
        PersistentHashMap {
            root: self.root,
            length: self.length,
            hasher: self.hasher,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> TransientHashMap<K, V, S> {
    /// Returns a reference to the value for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        hamt::lookup(&self.root, hash_key(&self.hasher, key), key).map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher> TransientHashMap<K, V, S> {
    /// Inserts a key-value pair, returning the previous value if the key was
    /// present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&self.hasher, &key);
        hamt::insert(&mut self.root, hash, key, value, &mut self.length)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        hamt::delete(&mut self.root, hash, key, &mut self.length)
    }

    /// Updates, inserts or removes the entry for `key` (see
    /// [`PersistentHashMap::update_with`]). Returns `true` if the map changed.
    pub fn update_with<Q, F>(&mut self, key: &Q, updater: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        self.alter(key, |current| Edit::from(updater(current)))
    }

    /// Applies an [`Edit`] computed from the current value of `key`.
    /// Returns `true` if the map changed.
    pub fn alter<Q, F>(&mut self, key: &Q, function: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Edit<V>,
    {
        let hash = hash_key(&self.hasher, key);
        hamt::modify(
            &mut self.root,
            hash,
            key,
            || key.to_owned(),
            function,
            &mut self.length,
        )
    }

    fn insert_combining<C>(&mut self, key: K, value: V, combine: &mut C)
    where
        C: FnMut(V, V) -> V,
    {
        let combined = match self.get(&key) {
            Some(current) => combine(current.clone(), value),
            None => value,
        };
        self.insert(key, combined);
    }
}

impl<K, V> Default for TransientHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher> Extend<(K, V)> for TransientHashMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for TransientHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = Self::new();
        transient.extend(iter);
        transient
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for TransientHashMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, S> serde::Serialize for PersistentHashMap<K, V, S>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashMapVisitor<K, V, S> {
    marker: PhantomData<PersistentHashMap<K, V, S>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::de::Visitor<'de> for PersistentHashMapVisitor<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Default,
{
    type Value = PersistentHashMap<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut transient = TransientHashMap::with_hasher(S::default());
        while let Some((key, value)) = access.next_entry()? {
            transient.insert(key, value);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::Deserialize<'de> for PersistentHashMap<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentHashMapVisitor {
            marker: PhantomData,
        })
    }
}

// =============================================================================
// Rayon Support
// =============================================================================

/// A parallel iterator over borrowed entries of a [`PersistentHashMap`].
///
/// Work is split along the trie's child slices.
#[cfg(feature = "rayon")]
pub struct PersistentHashMapParallelRefIterator<'a, K, V> {
    producer: hamt::Producer<'a, K, V>,
}

#[cfg(feature = "rayon")]
impl<'a, K: Send + Sync, V: Send + Sync> rayon::iter::ParallelIterator
    for PersistentHashMapParallelRefIterator<'a, K, V>
{
    type Item = (&'a K, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        rayon::iter::plumbing::bridge_unindexed(self.producer, consumer)
    }
}

/// A parallel iterator over owned entries of a [`PersistentHashMap`].
#[cfg(feature = "rayon")]
pub struct PersistentHashMapParallelIterator<K, V> {
    entries: rayon::vec::IntoIter<(K, V)>,
}

#[cfg(feature = "rayon")]
impl<K: Send, V: Send> rayon::iter::ParallelIterator for PersistentHashMapParallelIterator<K, V> {
    type Item = (K, V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        self.entries.drive_unindexed(consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(rayon::iter::IndexedParallelIterator::len(&self.entries))
    }
}

#[cfg(feature = "rayon")]
impl<'a, K: Send + Sync, V: Send + Sync, S> rayon::iter::IntoParallelIterator for &'a PersistentHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type Iter = PersistentHashMapParallelRefIterator<'a, K, V>;

    fn into_par_iter(self) -> Self::Iter {
        PersistentHashMapParallelRefIterator {
            producer: hamt::Producer::new(&self.root),
        }
    }
}

#[cfg(feature = "rayon")]
impl<K, V, S> rayon::iter::IntoParallelIterator for PersistentHashMap<K, V, S>
where
    K: Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    type Item = (K, V);
    type Iter = PersistentHashMapParallelIterator<K, V>;

    fn into_par_iter(self) -> Self::Iter {
        let entries: Vec<(K, V)> = self.into_iter().collect();
        PersistentHashMapParallelIterator {
            entries: entries.into_par_iter(),
        }
    }
}

#[cfg(feature = "rayon")]
impl<K, V, S> rayon::iter::FromParallelIterator<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq + Send,
    V: Clone + Send,
    S: BuildHasher + Default,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: rayon::iter::IntoParallelIterator<Item = (K, V)>,
    {
        let entries: Vec<(K, V)> = par_iter.into_par_iter().collect();
        entries.into_iter().collect()
    }
}

#[cfg(feature = "rayon")]
impl<K: Send + Sync, V: Send + Sync, S> PersistentHashMap<K, V, S> {
    /// Returns a parallel iterator over borrowed entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_hamt::persistent::PersistentHashMap;
    /// use rayon::prelude::*;
    ///
    /// let map: PersistentHashMap<u64, u64> = (0..1000).map(|key| (key, key * 2)).collect();
    /// let total: u64 = map.par_iter().map(|(_, value)| *value).sum();
    /// assert_eq!(total, 999 * 1000);
    /// ```
    #[must_use]
    pub fn par_iter(&self) -> PersistentHashMapParallelRefIterator<'_, K, V> {
        rayon::iter::IntoParallelIterator::into_par_iter(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
