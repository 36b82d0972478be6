//! Rayon producer that splits a trie along its child slices.

use rayon::iter::plumbing::{Folder, UnindexedProducer};

use super::node::{Child, Node};

pub(crate) enum Producer<'a, K, V> {
    Branch(&'a [Child<K, V>]),
    Slots(&'a [Option<Child<K, V>>]),
    /// A leaf-like node or an empty root; never split further.
    Entries(&'a Node<K, V>),
}

impl<'a, K, V> Producer<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        match root {
            Node::Indexed(indexed) => Self::from_children(&indexed.children),
            Node::Array(array) => Self::Slots(array.children.as_slice()),
            Node::Empty | Node::Leaf(_) | Node::Collision(_) => Self::Entries(root),
        }
    }

    fn from_children(children: &'a [Child<K, V>]) -> Self {
        match children {
            [only] => Self::new(only),
            _ => Self::Branch(children),
        }
    }
}

impl<'a, K, V> UnindexedProducer for Producer<'a, K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    type Item = (&'a K, &'a V);

    fn split(self) -> (Self, Option<Self>) {
        match self {
            Self::Branch(children) if children.len() > 1 => {
                let (left, right) = children.split_at(children.len() / 2);
                (Self::from_children(left), Some(Self::from_children(right)))
            }
            Self::Slots([Some(only)]) => Self::new(only).split(),
            Self::Slots(slots) if slots.len() > 1 => {
                let (left, right) = slots.split_at(slots.len() / 2);
                (Self::Slots(left), Some(Self::Slots(right)))
            }
            _ => (self, None),
        }
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        match self {
            Self::Branch(children) => fold_children(children.iter().map(|child| &**child), folder),
            Self::Slots(slots) => fold_children(slots.iter().flatten().map(|child| &**child), folder),
            Self::Entries(node) => fold_node(node, folder),
        }
    }
}

fn fold_children<'a, K: 'a, V: 'a, F>(children: impl Iterator<Item = &'a Node<K, V>>, mut folder: F) -> F
where
    F: Folder<(&'a K, &'a V)>,
{
    for child in children {
        folder = fold_node(child, folder);
        if folder.full() {
            break;
        }
    }
    folder
}

fn fold_node<'a, K, V, F>(node: &'a Node<K, V>, folder: F) -> F
where
    F: Folder<(&'a K, &'a V)>,
{
    match node {
        Node::Empty => folder,
        Node::Leaf(leaf) => folder.consume((&leaf.key, &leaf.value)),
        Node::Collision(collision) => folder.consume_iter(collision.entries.iter().map(|(key, value)| (key, value))),
        Node::Indexed(indexed) => fold_children(indexed.children.iter().map(|child| &**child), folder),
        Node::Array(array) => fold_children(array.children.iter().flatten().map(|child| &**child), folder),
    }
}
