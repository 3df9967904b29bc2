use std::iter::FusedIterator;

use super::{make_empty, Node, OptNode};

/// An iterator over the entries of an
/// [`AvlCollection`](crate::AvlCollection), sorted by key.
///
/// Nodes have no parent links, so the iterator keeps the unvisited part of
/// the leftmost spine on a stack.
pub struct Iter<'a, K, V> {
    work: Vec<&'a Node<K, V>>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(root: &'a OptNode<K, V>, len: usize) -> Self {
        let mut iter = Iter {
            work: Vec::new(),
            len,
        };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            self.work.push(n);
            curr = n.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.work.pop()?;
        self.len -= 1;
        self.push_left_spine(n.right.as_deref());
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An owning iterator over the entries of an
/// [`AvlCollection`](crate::AvlCollection), sorted by key.
///
/// Each node is unlinked as the iterator passes it.  Entries that are never
/// reached are released when the iterator is dropped.
pub struct IntoIter<K, V> {
    work: Vec<Box<Node<K, V>>>,
    len: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(root: OptNode<K, V>, len: usize) -> Self {
        let mut iter = IntoIter {
            work: Vec::new(),
            len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut curr: OptNode<K, V>) {
        while let Some(mut n) = curr {
            curr = n.left.take();
            self.work.push(n);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut n = self.work.pop()?;
        self.len -= 1;
        self.push_left_spine(n.right.take());
        let Node { key, val, .. } = *n;
        Some((key, val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// The left subtrees of stacked nodes are already detached, so each pending
// node releases its right subtree before itself.
impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        while let Some(n) = self.work.pop() {
            make_empty(Some(n));
        }
    }
}
