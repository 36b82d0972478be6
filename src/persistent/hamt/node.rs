//! Node shapes of the trie and the read-only descent.

use std::borrow::Borrow;

use smallvec::{SmallVec, smallvec};

use super::{BITS_PER_LEVEL, BRANCHING_FACTOR, bit_position, fragment, sparse_index};
use crate::persistent::ReferenceCounter;

/// A shared pointer to a node.
pub(crate) type Child<K, V> = ReferenceCounter<Node<K, V>>;

/// Entries of keys that share one full hash.
pub(crate) type CollisionEntries<K, V> = SmallVec<[(K, V); 2]>;

#[derive(Clone)]
pub(crate) enum Node<K, V> {
    /// The root of an empty container. Never appears below the root.
    Empty,
    Leaf(Leaf<K, V>),
    /// Two or more distinct keys with the same hash.
    Collision(CollisionNode<K, V>),
    /// Sparse node: `children.len() == mask.count_ones()`, at most
    /// `MAX_INDEX_NODE` children, ordered by bit position.
    Indexed(IndexedNode<K, V>),
    /// Dense node with one slot per fragment.
    Array(ArrayNode<K, V>),
}

#[derive(Clone)]
pub(crate) struct Leaf<K, V> {
    pub(crate) hash: u32,
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Clone)]
pub(crate) struct CollisionNode<K, V> {
    pub(crate) hash: u32,
    pub(crate) entries: CollisionEntries<K, V>,
}

#[derive(Clone)]
pub(crate) struct IndexedNode<K, V> {
    pub(crate) mask: u32,
    pub(crate) children: Vec<Child<K, V>>,
}

#[derive(Clone)]
pub(crate) struct ArrayNode<K, V> {
    /// Number of occupied slots.
    pub(crate) size: usize,
    pub(crate) children: Box<[Option<Child<K, V>>; BRANCHING_FACTOR]>,
}

/// A fresh empty root.
pub(crate) fn empty<K, V>() -> Child<K, V> {
    ReferenceCounter::new(Node::Empty)
}

impl<K, V> Node<K, V> {
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Leaf-like nodes hold entries directly and have no children.
    pub(crate) const fn is_leaf_like(&self) -> bool {
        matches!(self, Self::Empty | Self::Leaf(_) | Self::Collision(_))
    }

    /// The full hash shared by the entries of a leaf-like node.
    pub(crate) const fn entry_hash(&self) -> Option<u32> {
        match self {
            Self::Leaf(leaf) => Some(leaf.hash),
            Self::Collision(collision) => Some(collision.hash),
            Self::Empty | Self::Indexed(_) | Self::Array(_) => None,
        }
    }

    /// Returns `true` if this is the leaf for `key`.
    pub(crate) fn holds<Q>(&self, hash: u32, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        matches!(self, Self::Leaf(leaf) if leaf.hash == hash && leaf.key.borrow() == key)
    }

    pub(crate) const fn leaf_value(&self) -> Option<&V> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.value),
            _ => None,
        }
    }

    pub(crate) fn into_leaf_value(self) -> Option<V> {
        match self {
            Self::Leaf(leaf) => Some(leaf.value),
            _ => None,
        }
    }

    /// Consumes a leaf-like node into its entries.
    pub(crate) fn into_entries(self) -> CollisionEntries<K, V> {
        match self {
            Self::Leaf(leaf) => smallvec![(leaf.key, leaf.value)],
            Self::Collision(collision) => collision.entries,
            Self::Empty | Self::Indexed(_) | Self::Array(_) => SmallVec::new(),
        }
    }
}

/// Finds the entry for `key` without touching reference counts.
pub(crate) fn lookup<'a, K, V, Q>(root: &'a Node<K, V>, hash: u32, key: &Q) -> Option<(&'a K, &'a V)>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut node = root;
    let mut shift = 0;
    loop {
        match node {
            Node::Empty => return None,
            Node::Leaf(leaf) => {
                return (leaf.hash == hash && leaf.key.borrow() == key)
                    .then_some((&leaf.key, &leaf.value));
            }
            Node::Collision(collision) => {
                if collision.hash != hash {
                    return None;
                }
                return collision
                    .entries
                    .iter()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(entry_key, value)| (entry_key, value));
            }
            Node::Indexed(indexed) => {
                let bit = bit_position(fragment(hash, shift));
                if indexed.mask & bit == 0 {
                    return None;
                }
                node = &*indexed.children[sparse_index(indexed.mask, bit)];
            }
            Node::Array(array) => {
                node = array.children[fragment(hash, shift)].as_deref()?;
            }
        }
        shift += BITS_PER_LEVEL;
    }
}
