//! Depth-first traversal with an explicit stack.
//!
//! Each iterator owns its own stack, so any number of iterators can walk one
//! snapshot independently. Entries come out in trie order.

use std::iter::FusedIterator;
use std::slice;

use arrayvec::ArrayVec;

use super::MAX_DEPTH;
use super::node::{Child, Node};
use crate::persistent::ReferenceCounter;

/// Root slice, one frame per branching level, and one collision frame.
const STACK_CAPACITY: usize = MAX_DEPTH + 2;

enum Frame<'a, K, V> {
    Branch(slice::Iter<'a, Child<K, V>>),
    Slots(slice::Iter<'a, Option<Child<K, V>>>),
    Entries(slice::Iter<'a, (K, V)>),
}

/// Borrowing iterator over the entries of a trie.
pub(crate) struct Iter<'a, K, V> {
    stack: ArrayVec<Frame<'a, K, V>, STACK_CAPACITY>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a Child<K, V>, length: usize) -> Self {
        let mut stack = ArrayVec::new();
        stack.push(Frame::Branch(slice::from_ref(root).iter()));
        Self {
            stack,
            remaining: length,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        let stack = self
            .stack
            .iter()
            .map(|frame| match frame {
                Frame::Branch(children) => Frame::Branch(children.clone()),
                Frame::Slots(slots) => Frame::Slots(slots.clone()),
                Frame::Entries(entries) => Frame::Entries(entries.clone()),
            })
            .collect();
        Self {
            stack,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let child = match self.stack.last_mut()? {
                Frame::Branch(children) => children.next(),
                Frame::Slots(slots) => match slots.next() {
                    Some(None) => continue,
                    Some(Some(child)) => Some(child),
                    None => None,
                },
                Frame::Entries(entries) => {
                    if let Some((key, value)) = entries.next() {
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    None
                }
            };
            let Some(child) = child else {
                self.stack.pop();
                continue;
            };
            match &**child {
                Node::Empty => {}
                Node::Leaf(leaf) => {
                    self.remaining -= 1;
                    return Some((&leaf.key, &leaf.value));
                }
                Node::Collision(collision) => self.stack.push(Frame::Entries(collision.entries.iter())),
                Node::Indexed(indexed) => self.stack.push(Frame::Branch(indexed.children.iter())),
                Node::Array(array) => self.stack.push(Frame::Slots(array.children.iter())),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning iterator over the entries of a trie.
///
/// Nodes are unwrapped as they are reached: a node no other container
/// shares is taken apart without cloning its entries.
pub(crate) struct IntoIter<K, V> {
    nodes: Vec<Child<K, V>>,
    entries: Vec<(K, V)>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Child<K, V>, length: usize) -> Self {
        Self {
            nodes: vec![root],
            entries: Vec::new(),
            remaining: length,
        }
    }
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.entries.pop() {
                self.remaining -= 1;
                return Some(entry);
            }
            match ReferenceCounter::unwrap_or_clone(self.nodes.pop()?) {
                Node::Empty => {}
                Node::Leaf(leaf) => {
                    self.remaining -= 1;
                    return Some((leaf.key, leaf.value));
                }
                Node::Collision(collision) => self.entries.extend(collision.entries.into_iter().rev()),
                Node::Indexed(indexed) => self.nodes.extend(indexed.children.into_iter().rev()),
                Node::Array(array) => {
                    let slots = *array.children;
                    self.nodes.extend(slots.into_iter().rev().flatten());
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K: Clone, V: Clone> FusedIterator for IntoIter<K, V> {}
