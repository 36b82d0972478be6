//! Growth and shrink rules that keep each node's shape proportional to its
//! fan-out: leaf merging, indexed-to-array expansion, array-to-indexed
//! packing and single-child collapse.

use super::node::{ArrayNode, Child, CollisionNode, IndexedNode, Leaf, Node};
use super::{BITS_PER_LEVEL, BRANCHING_FACTOR, bit_position, fragment};
use crate::persistent::ReferenceCounter;

/// Combines an existing leaf-like node with a new leaf for a different key.
///
/// Equal hashes produce a collision node. Otherwise the result is the
/// shortest chain of indexed nodes whose last level tells the two apart.
pub(super) fn merge_leaves<K, V>(shift: u32, existing: Child<K, V>, leaf: Leaf<K, V>) -> Node<K, V>
where
    K: Clone,
    V: Clone,
{
    let existing_hash = existing.entry_hash().unwrap_or(leaf.hash);
    if existing_hash == leaf.hash {
        let mut entries = ReferenceCounter::unwrap_or_clone(existing).into_entries();
        entries.push((leaf.key, leaf.value));
        return Node::Collision(CollisionNode {
            hash: leaf.hash,
            entries,
        });
    }

    let existing_position = fragment(existing_hash, shift);
    let position = fragment(leaf.hash, shift);
    let children = if existing_position == position {
        vec![ReferenceCounter::new(merge_leaves(
            shift + BITS_PER_LEVEL,
            existing,
            leaf,
        ))]
    } else if existing_position < position {
        vec![existing, ReferenceCounter::new(Node::Leaf(leaf))]
    } else {
        vec![ReferenceCounter::new(Node::Leaf(leaf)), existing]
    };
    Node::Indexed(IndexedNode {
        mask: bit_position(existing_position) | bit_position(position),
        children,
    })
}

/// Spreads a full indexed node plus one new leaf over an array node.
pub(super) fn expand<K, V>(indexed: &mut IndexedNode<K, V>, position: usize, leaf: Leaf<K, V>) -> ArrayNode<K, V> {
    let mut children: [Option<Child<K, V>>; BRANCHING_FACTOR] = std::array::from_fn(|_| None);
    let mut mask = indexed.mask;
    let size = indexed.children.len() + 1;
    for child in std::mem::take(&mut indexed.children) {
        children[mask.trailing_zeros() as usize] = Some(child);
        mask &= mask - 1;
    }
    children[position] = Some(ReferenceCounter::new(Node::Leaf(leaf)));

    trace_event!(size, "expanded indexed node into array node");
    ArrayNode {
        size,
        children: Box::new(children),
    }
}

/// Compacts a sparsely populated array node into an indexed node.
pub(super) fn pack<K, V>(array: &mut ArrayNode<K, V>) -> IndexedNode<K, V> {
    let mut mask = 0;
    let mut children = Vec::with_capacity(array.size);
    for (position, slot) in array.children.iter_mut().enumerate() {
        if let Some(child) = slot.take() {
            mask |= bit_position(position);
            children.push(child);
        }
    }

    trace_event!(size = children.len(), "packed array node into indexed node");
    IndexedNode { mask, children }
}

/// Drops the child at `index` whose mask bit is `bit`.
pub(super) fn remove_child<K, V>(indexed: &mut IndexedNode<K, V>, bit: u32, index: usize) -> Child<K, V> {
    indexed.mask &= !bit;
    indexed.children.remove(index)
}

/// The node that should replace `indexed` once it is down to at most one
/// leaf-like child, if any.
pub(super) fn collapse<K, V>(indexed: &mut IndexedNode<K, V>) -> Option<Child<K, V>> {
    match indexed.children.as_slice() {
        [] => Some(ReferenceCounter::new(Node::Empty)),
        [only] if only.is_leaf_like() => {
            trace_event!("collapsed single-child indexed node");
            indexed.children.pop()
        }
        _ => None,
    }
}
