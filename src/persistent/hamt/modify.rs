//! The update engine every mutation funnels through.
//!
//! All functions take the slot holding a node (`&mut Child`) and rewrite it
//! through [`ReferenceCounter::make_mut`]: a node the caller owns uniquely is
//! edited in place, a shared one is copied first. The container's length is
//! threaded through as `&mut usize` and changes once per structural insert
//! or delete, never on value replacement.

use std::borrow::Borrow;
use std::mem;

use super::node::{Child, Leaf, Node, lookup};
use super::shape::{collapse, expand, merge_leaves, pack, remove_child};
use super::{BITS_PER_LEVEL, MAX_INDEX_NODE, MIN_ARRAY_NODE, bit_position, fragment, sparse_index};
use crate::persistent::ReferenceCounter;

/// The outcome of an update function passed to
/// [`PersistentHashMap::alter`](crate::persistent::PersistentHashMap::alter).
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::{Edit, PersistentHashMap};
///
/// let map = PersistentHashMap::new().insert("stock".to_string(), 3);
///
/// // Keep leaves the map untouched and shares its root.
/// let same = map.alter("stock", |_| Edit::Keep);
/// assert!(same.ptr_eq(&map));
///
/// let restocked = map.alter("stock", |current| match current {
///     Some(count) if *count < 5 => Edit::Insert(count + 10),
///     _ => Edit::Keep,
/// });
/// assert_eq!(restocked.get("stock"), Some(&13));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edit<V> {
    /// Leave the entry as it is, present or absent.
    Keep,
    /// Remove the entry if present.
    Remove,
    /// Insert the value or overwrite the present one.
    Insert(V),
}

impl<V> From<Option<V>> for Edit<V> {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Remove, Self::Insert)
    }
}

/// Inserts or overwrites an entry, returning the previous value.
pub(crate) fn insert<K, V>(root: &mut Child<K, V>, hash: u32, key: K, value: V, length: &mut usize) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
{
    put(root, 0, Leaf { hash, key, value }, length)
}

/// Removes an entry, returning its value. An absent key leaves the trie
/// and every reference count untouched.
pub(crate) fn delete<K, V, Q>(root: &mut Child<K, V>, hash: u32, key: &Q, length: &mut usize) -> Option<V>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    lookup(root, hash, key)?;
    remove(root, 0, hash, key, length)
}

/// Overwrites the value of a present key without needing an owned key.
/// Returns `None` and changes nothing structurally when the key is absent.
pub(crate) fn replace<K, V, Q>(slot: &mut Child<K, V>, shift: u32, hash: u32, key: &Q, value: V) -> Option<V>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    match ReferenceCounter::make_mut(slot) {
        Node::Leaf(leaf) if leaf.hash == hash && leaf.key.borrow() == key => {
            Some(mem::replace(&mut leaf.value, value))
        }
        Node::Collision(collision) if collision.hash == hash => collision
            .entries
            .iter_mut()
            .find(|(entry_key, _)| entry_key.borrow() == key)
            .map(|(_, current)| mem::replace(current, value)),
        Node::Indexed(indexed) => {
            let bit = bit_position(fragment(hash, shift));
            if indexed.mask & bit == 0 {
                return None;
            }
            let index = sparse_index(indexed.mask, bit);
            replace(&mut indexed.children[index], shift + BITS_PER_LEVEL, hash, key, value)
        }
        Node::Array(array) => array.children[fragment(hash, shift)]
            .as_mut()
            .and_then(|child| replace(child, shift + BITS_PER_LEVEL, hash, key, value)),
        Node::Empty | Node::Leaf(_) | Node::Collision(_) => None,
    }
}

/// Runs `update` against the current value of `key` and applies its
/// [`Edit`]. Returns `true` when the trie changed.
///
/// The lookup happens before any node is touched, so `Edit::Keep` (and
/// `Edit::Remove` of an absent key) leaves the root pointer as it was.
pub(crate) fn modify<K, V, Q, O, F>(
    root: &mut Child<K, V>,
    hash: u32,
    key: &Q,
    to_owned: O,
    update: F,
    length: &mut usize,
) -> bool
where
    K: Eq + Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
    O: FnOnce() -> K,
    F: FnOnce(Option<&V>) -> Edit<V>,
{
    let current = lookup(root, hash, key).map(|(_, value)| value);
    let present = current.is_some();
    match update(current) {
        Edit::Keep => false,
        Edit::Remove => present && remove(root, 0, hash, key, length).is_some(),
        Edit::Insert(value) if present => {
            replace(root, 0, hash, key, value);
            true
        }
        Edit::Insert(value) => {
            put(
                root,
                0,
                Leaf {
                    hash,
                    key: to_owned(),
                    value,
                },
                length,
            );
            true
        }
    }
}

/// Returns `true` when `leaf` cannot be stored in `node` itself and the two
/// have to be merged into a new subtree.
fn diverges<K: Eq, V>(node: &Node<K, V>, leaf: &Leaf<K, V>) -> bool {
    match node {
        Node::Leaf(existing) => existing.hash != leaf.hash || existing.key != leaf.key,
        Node::Collision(collision) => collision.hash != leaf.hash,
        Node::Empty | Node::Indexed(_) | Node::Array(_) => false,
    }
}

fn put<K, V>(slot: &mut Child<K, V>, shift: u32, leaf: Leaf<K, V>, length: &mut usize) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
{
    if diverges(slot, &leaf) {
        let existing = ReferenceCounter::clone(slot);
        *slot = ReferenceCounter::new(merge_leaves(shift, existing, leaf));
        *length += 1;
        return None;
    }

    let node = ReferenceCounter::make_mut(slot);
    let replacement = match node {
        Node::Empty => {
            *length += 1;
            Node::Leaf(leaf)
        }
        Node::Leaf(existing) => return Some(mem::replace(&mut existing.value, leaf.value)),
        Node::Collision(collision) => {
            if let Some((_, current)) = collision
                .entries
                .iter_mut()
                .find(|(entry_key, _)| *entry_key == leaf.key)
            {
                return Some(mem::replace(current, leaf.value));
            }
            collision.entries.push((leaf.key, leaf.value));
            *length += 1;
            return None;
        }
        Node::Indexed(indexed) => {
            let position = fragment(leaf.hash, shift);
            let bit = bit_position(position);
            let index = sparse_index(indexed.mask, bit);
            if indexed.mask & bit != 0 {
                return put(&mut indexed.children[index], shift + BITS_PER_LEVEL, leaf, length);
            }
            *length += 1;
            if indexed.children.len() < MAX_INDEX_NODE {
                indexed.mask |= bit;
                indexed.children.insert(index, ReferenceCounter::new(Node::Leaf(leaf)));
                return None;
            }
            Node::Array(expand(indexed, position, leaf))
        }
        Node::Array(array) => {
            let position = fragment(leaf.hash, shift);
            if let Some(child) = array.children[position].as_mut() {
                return put(child, shift + BITS_PER_LEVEL, leaf, length);
            }
            array.children[position] = Some(ReferenceCounter::new(Node::Leaf(leaf)));
            array.size += 1;
            *length += 1;
            return None;
        }
    };
    *node = replacement;
    None
}

/// Takes the value out of a detached leaf, cloning it only if another
/// container still shares the leaf.
fn into_value<K, V: Clone>(child: Child<K, V>) -> Option<V> {
    ReferenceCounter::try_unwrap(child).map_or_else(
        |shared| shared.leaf_value().cloned(),
        Node::into_leaf_value,
    )
}

fn remove<K, V, Q>(slot: &mut Child<K, V>, shift: u32, hash: u32, key: &Q, length: &mut usize) -> Option<V>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    if slot.is_leaf() {
        if !slot.holds(hash, key) {
            return None;
        }
        *length -= 1;
        return into_value(mem::replace(slot, ReferenceCounter::new(Node::Empty)));
    }

    let (removed, replacement) = match ReferenceCounter::make_mut(slot) {
        Node::Empty | Node::Leaf(_) => return None,
        Node::Collision(collision) => {
            if collision.hash != hash {
                return None;
            }
            let index = collision
                .entries
                .iter()
                .position(|(entry_key, _)| entry_key.borrow() == key)?;
            let (_, value) = collision.entries.remove(index);
            *length -= 1;
            let replacement = if collision.entries.len() == 1 {
                collision.entries.pop().map(|(key, value)| {
                    ReferenceCounter::new(Node::Leaf(Leaf { hash, key, value }))
                })
            } else {
                None
            };
            (Some(value), replacement)
        }
        Node::Indexed(indexed) => {
            let bit = bit_position(fragment(hash, shift));
            if indexed.mask & bit == 0 {
                return None;
            }
            let index = sparse_index(indexed.mask, bit);
            let child = &mut indexed.children[index];
            let removed = if child.is_leaf() {
                if !child.holds(hash, key) {
                    return None;
                }
                *length -= 1;
                into_value(remove_child(indexed, bit, index))
            } else {
                let removed = remove(child, shift + BITS_PER_LEVEL, hash, key, length);
                if child.is_empty() {
                    remove_child(indexed, bit, index);
                }
                removed
            };
            (removed, collapse(indexed))
        }
        Node::Array(array) => {
            let position = fragment(hash, shift);
            let child = array.children[position].as_mut()?;
            let removed = if child.is_leaf() {
                if !child.holds(hash, key) {
                    return None;
                }
                *length -= 1;
                array.children[position].take().and_then(into_value)
            } else {
                let removed = remove(child, shift + BITS_PER_LEVEL, hash, key, length);
                if !child.is_empty() {
                    return removed;
                }
                array.children[position] = None;
                removed
            };
            array.size -= 1;
            let replacement = (array.size <= MIN_ARRAY_NODE)
                .then(|| ReferenceCounter::new(Node::Indexed(pack(array))));
            (removed, replacement)
        }
    };
    if let Some(replacement) = replacement {
        *slot = replacement;
    }
    removed
}
