#![cfg(feature = "persistent")]
//! Unit tests for PersistentHashMap.
//!
//! Covers the basic operations, collision handling, bulk updates,
//! the higher-order builders and the standard trait implementations.

use persistent_hamt::persistent::{Edit, PersistentHashMap};
use persistent_hamt::typeclass::{Foldable, Semigroup, Sum};
use rstest::rstest;
use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasherDefault, Hash, Hasher};

// =============================================================================
// Basic Operations
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.get("anything"), None);
}

#[rstest]
fn test_insert_and_get_single_entry() {
    let map = PersistentHashMap::new().insert("a".to_string(), 1);
    assert_eq!(map.get("a"), Some(&1));
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_insert_does_not_modify_original() {
    let original = PersistentHashMap::new().insert("a".to_string(), 1);
    let updated = original.insert("b".to_string(), 2).insert("a".to_string(), 10);

    assert_eq!(original.len(), 1);
    assert_eq!(original.get("a"), Some(&1));
    assert_eq!(original.get("b"), None);
    assert_eq!(updated.get("a"), Some(&10));
    assert_eq!(updated.len(), 2);
}

#[rstest]
fn test_insert_overwrite_keeps_length() {
    let map = PersistentHashMap::new().insert(1, "one").insert(1, "uno");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&"uno"));
}

#[rstest]
fn test_remove_existing_and_absent_keys() {
    let map = PersistentHashMap::new()
        .insert("a".to_string(), 1)
        .insert("b".to_string(), 2);

    let removed = map.remove("a");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get("a"), None);
    assert_eq!(removed.get("b"), Some(&2));

    let unchanged = map.remove("missing");
    assert_eq!(unchanged.len(), 2);
    assert!(unchanged.ptr_eq(&map));
}

#[rstest]
fn test_remove_all_entries() {
    let map: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    let emptied = (0..100).fold(map, |map, key| map.remove(&key));
    assert!(emptied.is_empty());
    assert_eq!(emptied.iter().count(), 0);
}

#[rstest]
fn test_get_key_value_returns_stored_key() {
    let map = PersistentHashMap::new().insert("stored".to_string(), 1);
    let (key, value) = map.get_key_value("stored").unwrap();
    assert_eq!(key, "stored");
    assert_eq!(*value, 1);
}

// =============================================================================
// Hash Collisions
// =============================================================================

/// A key type whose every value hashes identically.
#[derive(Clone, PartialEq, Eq, Debug)]
struct CollidingKey {
    value: u32,
}

impl CollidingKey {
    fn new(value: u32) -> Self {
        CollidingKey { value }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        42u64.hash(state);
    }
}

/// A hasher that maps everything to the same value.
#[derive(Default)]
struct ConstantHasher;

impl Hasher for ConstantHasher {
    fn finish(&self) -> u64 {
        7
    }

    fn write(&mut self, _bytes: &[u8]) {}
}

type Constant = BuildHasherDefault<ConstantHasher>;

#[rstest]
fn test_hash_collision_insert_keeps_every_key() {
    let map = (1..=5).fold(PersistentHashMap::new(), |map, value| {
        map.insert(CollidingKey::new(value), value * 10)
    });

    assert_eq!(map.len(), 5);
    for value in 1..=5 {
        assert_eq!(map.get(&CollidingKey::new(value)), Some(&(value * 10)));
    }
}

#[rstest]
fn test_hash_collision_overwrite() {
    let key = CollidingKey::new(1);
    let map1 = PersistentHashMap::new()
        .insert(key.clone(), "first".to_string())
        .insert(CollidingKey::new(2), "other".to_string());
    let map2 = map1.insert(key.clone(), "second".to_string());

    assert_eq!(map1.get(&key), Some(&"first".to_string()));
    assert_eq!(map2.get(&key), Some(&"second".to_string()));
    assert_eq!(map2.len(), 2);
}

#[rstest]
fn test_hash_collision_remove() {
    let map = PersistentHashMap::new()
        .insert(CollidingKey::new(1), "one")
        .insert(CollidingKey::new(2), "two")
        .insert(CollidingKey::new(3), "three");

    let map = map.remove(&CollidingKey::new(2));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&CollidingKey::new(1)), Some(&"one"));
    assert_eq!(map.get(&CollidingKey::new(2)), None);
    assert_eq!(map.get(&CollidingKey::new(3)), Some(&"three"));
}

#[rstest]
fn test_forced_hash_keeps_distinct_strings_apart() {
    let map = PersistentHashMap::with_hasher(Constant::default())
        .insert("x", 1)
        .insert("y", 2);
    assert_eq!(map.len(), 2);

    let without_x = map.remove("x");
    assert_eq!(without_x.get("y"), Some(&2));
    assert_eq!(without_x.get("x"), None);
    assert_eq!(without_x.len(), 1);
}

#[rstest]
fn test_collision_through_transient_and_alter() {
    let map = PersistentHashMap::<&str, i32, Constant>::with_hasher(Constant::default()).mutate(|transient| {
        transient.insert("a", 1);
        transient.insert("b", 2);
        transient.alter(&"c", |current| {
            assert_eq!(current, None);
            Edit::Insert(3)
        });
    });
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("c"), Some(&3));
    assert_eq!(map.update_with(&"b", |_| None).len(), 2);
}

// =============================================================================
// Update, UpdateWith and Alter
// =============================================================================

#[rstest]
fn test_update_existing_key() {
    let map = PersistentHashMap::new().insert("count".to_string(), 10);
    let updated = map.update("count", |value| value + 1).unwrap();

    assert_eq!(updated.get("count"), Some(&11));
    assert_eq!(map.get("count"), Some(&10));
}

#[rstest]
fn test_update_nonexistent_key_returns_none() {
    let map = PersistentHashMap::new().insert("count".to_string(), 10);
    assert!(map.update("missing", |value| value + 1).is_none());
}

#[rstest]
#[case::increment(Some(5), |value: Option<&i32>| value.map(|value| value + 1), Some(6), 1)]
#[case::insert_absent(None, |value: Option<&i32>| Some(value.copied().unwrap_or(100)), Some(100), 1)]
#[case::remove_present(Some(5), |_: Option<&i32>| None, None, 0)]
#[case::remove_absent(None, |_: Option<&i32>| None, None, 0)]
fn test_update_with(
    #[case] initial: Option<i32>,
    #[case] updater: fn(Option<&i32>) -> Option<i32>,
    #[case] expected: Option<i32>,
    #[case] expected_length: usize,
) {
    let map = initial.map_or_else(PersistentHashMap::new, |value| {
        PersistentHashMap::singleton("key".to_string(), value)
    });
    let updated = map.update_with("key", updater);

    assert_eq!(updated.get("key").copied(), expected);
    assert_eq!(updated.len(), expected_length);
}

#[rstest]
fn test_alter_keep_returns_same_root() {
    let map: PersistentHashMap<i32, i32> = (0..50).map(|key| (key, key)).collect();
    let kept = map.alter(&10, |current| {
        assert_eq!(current, Some(&10));
        Edit::Keep
    });
    assert!(kept.ptr_eq(&map));

    let absent = map.alter(&99, |_| Edit::Remove);
    assert!(absent.ptr_eq(&map));
}

// =============================================================================
// Merge, Concat and RemoveMany
// =============================================================================

#[rstest]
fn test_merge_overlapping_maps_prefers_other() {
    let map1 = PersistentHashMap::new()
        .insert("a".to_string(), 1)
        .insert("b".to_string(), 2);
    let map2 = PersistentHashMap::new()
        .insert("b".to_string(), 20)
        .insert("c".to_string(), 3);

    let merged = map1.merge(&map2);

    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get("a"), Some(&1));
    assert_eq!(merged.get("b"), Some(&20));
    assert_eq!(merged.get("c"), Some(&3));
}

#[rstest]
fn test_merge_with_empty_map() {
    let map = PersistentHashMap::new().insert(1, 1);
    let empty = PersistentHashMap::new();

    assert_eq!(map.merge(&empty), map);
    assert!(empty.merge(&map).ptr_eq(&map));
}

#[rstest]
fn test_merge_with_combines_shared_keys() {
    let left: PersistentHashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    let right: PersistentHashMap<&str, i32> = [("b", 10), ("c", 3)].into_iter().collect();

    let merged = left.merge_with(&right, |key, mine, theirs| {
        assert_eq!(*key, "b");
        mine * theirs
    });

    assert_eq!(merged.get("a"), Some(&1));
    assert_eq!(merged.get("b"), Some(&20));
    assert_eq!(merged.get("c"), Some(&3));
}

#[rstest]
fn test_concat_later_entries_win() {
    let map = PersistentHashMap::new().insert("a", 0);
    let concatenated = map.concat(vec![("a", 1), ("b", 2), ("a", 3)]);

    assert_eq!(concatenated.len(), 2);
    assert_eq!(concatenated.get("a"), Some(&3));
    assert_eq!(map.get("a"), Some(&0));
}

#[rstest]
fn test_concat_with_counts_words() {
    let words = "the cat saw the other cat near the door";
    let counts = PersistentHashMap::new().concat_with(
        words.split_whitespace().map(|word| (word, 1)),
        |_, current, incoming| current + incoming,
    );

    assert_eq!(counts.get("the"), Some(&3));
    assert_eq!(counts.get("cat"), Some(&2));
    assert_eq!(counts.get("door"), Some(&1));
    assert_eq!(counts.len(), 6);
}

#[rstest]
fn test_remove_many() {
    let map: PersistentHashMap<String, usize> = (0..20).map(|index| (index.to_string(), index)).collect();
    let keys = ["1", "3", "5", "not-a-key"];
    let trimmed = map.remove_many(keys.iter().copied());

    assert_eq!(trimmed.len(), 17);
    assert!(!trimmed.contains_key("3"));
    assert!(trimmed.contains_key("4"));
    assert_eq!(map.len(), 20);
}

// =============================================================================
// Higher-Order Builders
// =============================================================================

#[rstest]
fn test_map_values_and_with_key() {
    let map: PersistentHashMap<i32, i32> = (1..=3).map(|key| (key, key * 10)).collect();

    let doubled = map.map_values(|value| value * 2);
    assert_eq!(doubled.get(&2), Some(&40));

    let labelled = map.map_with_key(|key, value| format!("{key}={value}"));
    assert_eq!(labelled.get(&3), Some(&"3=30".to_string()));
    assert_eq!(labelled.len(), 3);
}

#[rstest]
fn test_filter_and_filter_with_key() {
    let map: PersistentHashMap<i32, i32> = (0..10).map(|key| (key, key * 3)).collect();

    let large = map.filter(|value| *value >= 15);
    assert_eq!(large.len(), 5);
    assert!(large.contains_key(&5));

    let odd_keys = map.filter_with_key(|key, _| key % 2 == 1);
    assert_eq!(odd_keys.len(), 5);
    assert!(!odd_keys.contains_key(&4));
}

#[rstest]
fn test_filter_map_drops_none() {
    let map = PersistentHashMap::new()
        .insert("a", "1")
        .insert("b", "oops")
        .insert("c", "3");

    let parsed = map.filter_map(|raw| raw.parse::<i32>().ok());
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.get("c"), Some(&3));

    let keyed = map.filter_map_with_key(|key, raw| (*key != "a").then(|| raw.len()));
    assert_eq!(keyed.len(), 2);
    assert_eq!(keyed.get("b"), Some(&4));
}

#[rstest]
fn test_partition_covers_every_entry_once() {
    let map: PersistentHashMap<i32, i32> = (0..30).map(|key| (key, key)).collect();
    let (satisfying, rest) = map.partition(|value| value % 3 == 0);

    assert_eq!(satisfying.len(), 10);
    assert_eq!(rest.len(), 20);
    assert_eq!(satisfying.merge(&rest), map);

    let (low_keys, high_keys) = map.partition_with_key(|key, _| *key < 5);
    assert_eq!(low_keys.len(), 5);
    assert_eq!(high_keys.len(), 25);
}

#[rstest]
fn test_partition_map_routes_err_left_and_ok_right() {
    let map: PersistentHashMap<i32, i32> = (-3..3).map(|key| (key, key)).collect();
    let (negative, non_negative) = map.partition_map(|value| {
        if *value < 0 {
            Err(value.abs())
        } else {
            Ok(value.to_string())
        }
    });

    assert_eq!(negative.len(), 3);
    assert_eq!(negative.get(&-2), Some(&2));
    assert_eq!(non_negative.get(&2), Some(&"2".to_string()));
}

#[rstest]
fn test_flat_map_may_change_keys() {
    let map = PersistentHashMap::new().insert("ab", 1).insert("cd", 2);
    let characters = map.flat_map(|word, value| {
        let value = *value;
        word.chars().map(move |character| (character, value))
    });

    assert_eq!(characters.len(), 4);
    assert_eq!(characters.get(&'c'), Some(&2));
}

#[rstest]
fn test_fold_and_for_each() {
    let map: PersistentHashMap<i32, i32> = (1..=4).map(|key| (key, key * key)).collect();

    assert_eq!(map.fold(0, |total, key, value| total + key + value), 10 + 30);

    let mut visited = 0;
    map.for_each(|_, _| visited += 1);
    assert_eq!(visited, 4);
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_from_iter_with_duplicate_keys_keeps_last() {
    let map: PersistentHashMap<&str, i32> = vec![("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a"), Some(&3));
}

#[rstest]
fn test_from_foldable_combines_with_semigroup() {
    let entries = vec![
        ("tea".to_string(), Sum::new(2)),
        ("coffee".to_string(), Sum::new(1)),
        ("tea".to_string(), Sum::new(5)),
    ];
    let totals = PersistentHashMap::from_foldable(entries);

    assert_eq!(totals.get("tea"), Some(&Sum::new(7)));
    assert_eq!(totals.get("coffee"), Some(&Sum::new(1)));
}

#[rstest]
fn test_from_foldable_combines_earlier_on_the_left() {
    let entries = vec![("k", "a".to_string()), ("k", "b".to_string()), ("k", "c".to_string())];
    let map = PersistentHashMap::from_foldable(entries);
    assert_eq!(map.get("k"), Some(&"abc".to_string()));
}

#[rstest]
fn test_from_foldable_with_custom_combine() {
    let entries = Some(("only", 4));
    let map = PersistentHashMap::from_foldable_with(Constant::default(), entries, |left, right| left - right);
    assert_eq!(map.get("only"), Some(&4));
}

#[rstest]
fn test_try_from_unique_entries() {
    let ok = PersistentHashMap::try_from_unique_entries(vec![(1, "a"), (2, "b")]).unwrap();
    assert_eq!(ok.len(), 2);

    let error = PersistentHashMap::try_from_unique_entries(vec![(1, "a"), (2, "b"), (2, "c")]).unwrap_err();
    assert_eq!(error.key, 2);
    assert_eq!(error.to_string(), "duplicate key 2 in entries");
}

// =============================================================================
// Iteration
// =============================================================================

#[rstest]
fn test_iter_keys_values_agree_with_len() {
    let map: PersistentHashMap<i32, String> = (0..500).map(|key| (key, key.to_string())).collect();

    assert_eq!(map.iter().len(), 500);
    assert_eq!(map.keys().count(), 500);
    let mut keys: Vec<i32> = map.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, (0..500).collect::<Vec<_>>());
    assert!(map.values().all(|value| value.parse::<i32>().is_ok()));
}

#[rstest]
fn test_iterators_are_independent() {
    let map: PersistentHashMap<i32, i32> = (0..64).map(|key| (key, key)).collect();
    let mut first = map.iter();
    let _ = first.by_ref().take(10).count();
    let second = map.iter();

    assert_eq!(first.len(), 54);
    assert_eq!(second.len(), 64);
    assert_eq!(first.count() + 10, second.count());
}

#[rstest]
fn test_into_iter_matches_iter_order() {
    let map: PersistentHashMap<i32, i32> = (0..300).map(|key| (key * 7, key)).collect();
    let borrowed: Vec<(i32, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
    let owned: Vec<(i32, i32)> = map.clone().into_iter().collect();
    assert_eq!(borrowed, owned);
}

#[rstest]
fn test_for_loop_over_reference() {
    let map = PersistentHashMap::new().insert(1, 10).insert(2, 20);
    let mut total = 0;
    for (key, value) in &map {
        total += key * value;
    }
    assert_eq!(total, 50);
}

// =============================================================================
// Standard and Type Class Traits
// =============================================================================

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[rstest]
fn test_equality_ignores_insertion_order() {
    let forward: PersistentHashMap<i32, i32> = (0..200).map(|key| (key, key)).collect();
    let backward: PersistentHashMap<i32, i32> = (0..200).rev().map(|key| (key, key)).collect();

    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));
}

#[rstest]
fn test_equality_detects_different_values() {
    let map1 = PersistentHashMap::new().insert(1, "a");
    let map2 = PersistentHashMap::new().insert(1, "b");
    let map3 = map1.insert(2, "c");
    assert_ne!(map1, map2);
    assert_ne!(map1, map3);
}

#[rstest]
fn test_hash_ignores_layout_after_removals() {
    let grown: PersistentHashMap<i32, i32> = (0..40).map(|key| (key, key)).collect();
    let shrunk = grown.remove_many(&(5..40).collect::<Vec<_>>());
    let direct: PersistentHashMap<i32, i32> = (0..5).map(|key| (key, key)).collect();

    assert_eq!(shrunk, direct);
    assert_eq!(hash_of(&shrunk), hash_of(&direct));
}

#[rstest]
fn test_debug_format() {
    let map = PersistentHashMap::new().insert("key".to_string(), 42);
    assert_eq!(format!("{map:?}"), "{\"key\": 42}");
}

#[rstest]
fn test_default_is_empty() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::default();
    assert!(map.is_empty());
}

#[rstest]
fn test_index_operator() {
    let map = PersistentHashMap::new().insert("present".to_string(), 3);
    assert_eq!(map["present"], 3);
}

#[rstest]
fn test_foldable_over_values() {
    let map = PersistentHashMap::new()
        .insert("a".to_string(), 1)
        .insert("b".to_string(), 2)
        .insert("c".to_string(), 3);

    assert_eq!(map.clone().fold_left(0, |total, value| total + value), 6);
    assert_eq!(Foldable::length(&map), 3);
    assert!(map.exists(|value| *value == 2));
    assert!(map.for_all(|value| *value > 0));
}

#[rstest]
fn test_semigroup_is_right_biased_union() {
    let left = PersistentHashMap::new().insert(1, "left").insert(2, "left");
    let right = PersistentHashMap::new().insert(2, "right").insert(3, "right");

    let combined = left.combine(right);
    assert_eq!(combined.get(&1), Some(&"left"));
    assert_eq!(combined.get(&2), Some(&"right"));
    assert_eq!(combined.len(), 3);
}

// =============================================================================
// Large Maps
// =============================================================================

#[rstest]
fn test_large_map_with_removals() {
    let map: PersistentHashMap<u32, u32> = (0..10_000).map(|key| (key, key)).collect();
    let evens = map.filter_with_key(|key, _| key % 2 == 0);
    let removed = (0..10_000).filter(|key| key % 2 == 1).fold(map.clone(), |map, key| map.remove(&key));

    assert_eq!(removed.len(), 5_000);
    assert_eq!(removed, evens);
    assert_eq!(map.len(), 10_000);
    assert!((0..10_000).step_by(2).all(|key| removed.get(&key) == Some(&key)));
}
