use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::mem::replace;

use tracing::{debug, trace};

use crate::collection::Collection;
use crate::error::{CheckError, Result};

mod iter;
pub use iter::{IntoIter, Iter};

type OptNode<K, V> = Option<Box<Node<K, V>>>;

#[cfg(test)]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let m = $x;
        assert_eq!(m.check(), Ok(()));
    }};
}

#[cfg(not(test))]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let _ = $x;
    }};
}

struct Node<K, V> {
    key: K,
    val: V,
    height: i8,
    left: OptNode<K, V>,
    right: OptNode<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, val: V) -> Self {
        Node {
            key,
            val,
            height: 1,
            left: None,
            right: None,
        }
    }

    // Returns the "balance factor" of the node, left height minus right height
    fn bal(&self) -> i8 {
        height(&self.left) - height(&self.right)
    }

    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }
}

fn height<K, V>(opt_node: &OptNode<K, V>) -> i8 {
    opt_node.as_ref().map_or(0, |n| n.height)
}

// Releases a subtree, children before parent.
fn make_empty<K, V>(opt_node: OptNode<K, V>) {
    if let Some(mut n) = opt_node {
        make_empty(n.left.take());
        make_empty(n.right.take());
    }
}

// Verifies the subtree at opt_node, whose keys must lie strictly between lower
// and upper, and returns its node count and height.
fn chk<K: Ord, V>(
    opt_node: &OptNode<K, V>,
    lower: Option<&K>,
    upper: Option<&K>,
) -> Result<(usize, usize)> {
    let Some(n) = opt_node else {
        return Ok((0, 0));
    };

    if lower.map_or(false, |k| *k >= n.key)
        || upper.map_or(false, |k| *k <= n.key)
    {
        return Err(CheckError::OutOfOrder);
    }

    let (lf_len, lf_ht) = chk(&n.left, lower, Some(&n.key))?;
    let (rt_len, rt_ht) = chk(&n.right, Some(&n.key), upper)?;

    let actual = lf_ht.max(rt_ht) + 1;
    if n.height as usize != actual {
        return Err(CheckError::StaleHeight {
            stored: n.height as usize,
            actual,
        });
    }

    if lf_ht.abs_diff(rt_ht) > 1 {
        return Err(CheckError::Unbalanced {
            left: lf_ht,
            right: rt_ht,
        });
    }

    Ok((lf_len + rt_len + 1, actual))
}

fn rot_lf<K, V>(root: &mut OptNode<K, V>) {
    // We want the following transformation:
    //    a(x, b(y, z)))   =>   b(a(x, y), z)
    // x and z retain the same parents.

    let Some(mut a) = root.take() else { return };
    let Some(mut b) = a.right.take() else {
        *root = Some(a);
        return;
    };

    // move y from b to a; a is now final, so its height can be repaired
    a.right = b.left.take();
    a.fix_height();

    b.left = Some(a);
    b.fix_height();

    trace!(height = b.height, "rotated left");
    *root = Some(b);
}

fn rot_rt<K, V>(root: &mut OptNode<K, V>) {
    // We want the following transformation:
    //    a(b(x, y), z)   =>   b(x, a(y, z))
    // x and z retain the same parents.

    let Some(mut a) = root.take() else { return };
    let Some(mut b) = a.left.take() else {
        *root = Some(a);
        return;
    };

    a.left = b.right.take();
    a.fix_height();

    b.right = Some(a);
    b.fix_height();

    trace!(height = b.height, "rotated right");
    *root = Some(b);
}

// Repairs the height of the node at root and restores its balance.  Both
// children must already be valid AVL trees whose heights differ by at most 2.
fn rebal<K, V>(root: &mut OptNode<K, V>) {
    let Some(n) = root.as_mut() else { return };
    n.fix_height();

    let bal = n.bal();
    if bal > 1 {
        // a right-leaning left child would stay too tall after one rotation
        if n.left.as_ref().map_or(0, |lf| lf.bal()) < 0 {
            rot_lf(&mut n.left);
        }
        rot_rt(root);
    } else if bal < -1 {
        if n.right.as_ref().map_or(0, |rt| rt.bal()) > 0 {
            rot_rt(&mut n.right);
        }
        rot_lf(root);
    }
}

// Inserts (k,v) into the tree rooted at root and returns the replaced value.
fn ins<K: Ord, V>(root: &mut OptNode<K, V>, k: K, v: V) -> Option<V> {
    let n = match root.as_mut() {
        None => {
            *root = Some(Box::new(Node::new(k, v)));
            return None; // *** EARLY RETURN ***
        }

        Some(n) => n,
    };

    let old_v = match k.cmp(&n.key) {
        // an existing key keeps its node; only the value changes
        Equal => return Some(replace(&mut n.val, v)),
        Less => ins(&mut n.left, k, v),
        Greater => ins(&mut n.right, k, v),
    };

    rebal(root);
    old_v
}

// Detaches the leftmost node of the tree and returns it along with the
// rebalanced remainder of the tree.
fn take_leftmost<K, V>(
    mut root: Box<Node<K, V>>,
) -> (Box<Node<K, V>>, OptNode<K, V>) {
    match root.left.take() {
        None => {
            let rest = root.right.take();
            (root, rest)
        }

        Some(lf) => {
            let (leftmost, rest) = take_leftmost(lf);
            root.left = rest;
            let mut opt_root = Some(root);
            rebal(&mut opt_root);
            (leftmost, opt_root)
        }
    }
}

// Joins the two subtrees of a removed node.  With two children, the in-order
// successor is unlinked from the right subtree and becomes the new root.
fn splice<K, V>(left: OptNode<K, V>, right: OptNode<K, V>) -> OptNode<K, V> {
    match (left, right) {
        (None, only) | (only, None) => only,

        (Some(lf), Some(rt)) => {
            let (mut succ, rest) = take_leftmost(rt);
            succ.left = Some(lf);
            succ.right = rest;
            Some(succ)
        }
    }
}

// Removes k from the tree and returns the removed entry.  The tree is left
// untouched when k is absent.
fn rm<K, V, Q>(root: &mut OptNode<K, V>, k: &Q) -> Option<(K, V)>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    let n = root.as_mut()?;

    let removed = match k.cmp(n.key.borrow()) {
        Less => rm(&mut n.left, k)?,
        Greater => rm(&mut n.right, k)?,
        Equal => {
            let old = root.take()?;
            let Node {
                key,
                val,
                left,
                right,
                ..
            } = *old;
            trace!(
                two_children = left.is_some() && right.is_some(),
                "unlinked node"
            );
            *root = splice(left, right);
            (key, val)
        }
    };

    rebal(root);
    Some(removed)
}

// Feeds the entries of the tree into dst in pre-order.
fn preorder_copy<K, V>(opt_node: &OptNode<K, V>, dst: &mut AvlCollection<K, V>)
where
    K: Clone + Ord,
    V: Clone,
{
    if let Some(n) = opt_node {
        dst.insert(n.key.clone(), n.val.clone());
        preorder_copy(&n.left, dst);
        preorder_copy(&n.right, dst);
    }
}

fn collect_range<'a, K, V, Q>(
    opt_node: &'a OptNode<K, V>,
    lo: &Q,
    hi: &Q,
    vals: &mut Vec<&'a V>,
) where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Some(n) = opt_node else { return };
    let key = n.key.borrow();

    // subtrees entirely outside [lo, hi] are skipped
    if lo < key {
        collect_range(&n.left, lo, hi, vals);
    }

    if lo <= key && key <= hi {
        vals.push(&n.val);
    }

    if key < hi {
        collect_range(&n.right, lo, hi, vals);
    }
}

/// A map from keys to values sorted by key.
///
/// The map is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree): the
/// heights of the two subtrees of every node differ by at most one, so the
/// tree height stays within about 1.44 log2(n) and every lookup, insertion, and
/// removal runs in O(log n).  Each node exclusively owns its children.
///
/// Keys are unique.  Inserting a key that is already present replaces its
/// value and leaves the tree shape alone.
///
/// Cloning builds a new tree by inserting each entry of the source, so the
/// clone shares nothing with the original.
pub struct AvlCollection<K, V> {
    len: usize,
    root: OptNode<K, V>,
}

impl<K, V> AvlCollection<K, V> {
    /// Creates a new, empty collection.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    /// let c: AvlCollection<usize, usize> = AvlCollection::new();
    /// assert!(c.is_empty());
    /// assert_eq!(c.height(), 0);
    /// ```
    pub fn new() -> Self {
        AvlCollection { len: 0, root: None }
    }

    /// Drops all entries from the collection.
    pub fn clear(&mut self) {
        debug!(len = self.len, "clearing collection");
        make_empty(self.root.take());
        self.len = 0;
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let c = AvlCollection::from([("a", 10), ("b", 20), ("c", 30)]);
    /// assert_eq!(c.height(), 2);
    /// ```
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// Creates an iterator over the entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let c = AvlCollection::from([(0, 1), (1, 2), (2, 3)]);
    /// for (i, (k, v)) in c.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i + 1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len)
    }

    /// Produces an iterator over the keys in ascending order.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let c = AvlCollection::from([("e", 5), ("a", 1), ("c", 3)]);
    /// let keys: Vec<_> = c.keys().copied().collect();
    /// assert_eq!(keys, ["a", "c", "e"]);
    /// ```
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Same as [`keys`](#method.keys); an in-order walk is already sorted.
    pub fn sort(&self) -> impl Iterator<Item = &K> {
        self.keys()
    }

    /// Produces an iterator over the values, ordered by their keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Returns the entry with the least key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(lf) = curr.left.as_deref() {
            curr = lf;
        }
        Some((&curr.key, &curr.val))
    }

    /// Returns the entry with the greatest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(rt) = curr.right.as_deref() {
            curr = rt;
        }
        Some((&curr.key, &curr.val))
    }
}

impl<K: Ord, V> AvlCollection<K, V> {
    /// Inserts a key-value pair and returns the value previously associated
    /// with the key, if there was one.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let mut c = AvlCollection::new();
    /// assert_eq!(c.insert(0, "a"), None);
    /// assert_eq!(c.insert(0, "b"), Some("a"));
    /// assert_eq!(c.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let ret = ins(&mut self.root, key, val);
        self.len += ret.is_none() as usize;
        chk_map!(&self);
        ret
    }

    /// Removes a key and returns the value it was mapped to.
    ///
    /// Removing a key that is not present changes nothing.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let mut c = AvlCollection::new();
    /// c.insert(1, 2);
    /// c.insert(2, 3);
    /// assert_eq!(c.remove(&2), Some(3));
    /// assert_eq!(c.remove(&2), None);
    /// assert_eq!(c.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key and returns the entry it belonged to.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let kv = rm(&mut self.root, key)?;
        self.len -= 1;
        chk_map!(&self);
        Some(kv)
    }

    /// Returns a reference to the value associated with k.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let mut c = AvlCollection::new();
    /// c.insert("b", 10.0);
    ///
    /// assert_eq!(c.get("b"), Some(&10.0));
    /// assert_eq!(c.get("a"), None);
    /// ```
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &self.root;
        while let Some(n) = curr {
            match k.cmp(n.key.borrow()) {
                Less => curr = &n.left,
                Equal => return Some(&n.val),
                Greater => curr = &n.right,
            }
        }

        None
    }

    /// Returns a mutable reference to the value associated with k.
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &mut self.root;
        while let Some(n) = curr {
            match k.cmp(n.key.borrow()) {
                Less => curr = &mut n.left,
                Equal => return Some(&mut n.val),
                Greater => curr = &mut n.right,
            }
        }

        None
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Collects the values of every entry with a key in the closed interval
    /// `[lo, hi]`.
    ///
    /// The values currently come out in key order, but callers should not
    /// rely on it.  An interval with `lo > hi` is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let c = AvlCollection::from([
    ///     (50, "e"), (10, "a"), (30, "c"), (40, "d"), (60, "f"), (20, "b"),
    /// ]);
    /// let mut vs = c.range_values(&20, &40);
    /// vs.sort();
    /// assert_eq!(vs, [&"b", &"c", &"d"]);
    /// ```
    pub fn range_values<Q>(&self, lo: &Q, hi: &Q) -> Vec<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut vals = Vec::new();
        collect_range(&self.root, lo, hi, &mut vals);
        vals
    }

    /// Verifies the tree invariants: cached heights, balance, key order, and
    /// the entry count.
    ///
    /// # Examples
    /// ```
    /// use avl_collection::AvlCollection;
    ///
    /// let c: AvlCollection<_, _> = (0..100).map(|i| (i, i)).collect();
    /// assert_eq!(c.check(), Ok(()));
    /// ```
    pub fn check(&self) -> Result<()> {
        let (counted, _) = chk(&self.root, None, None)?;
        if counted != self.len {
            return Err(CheckError::LenMismatch {
                recorded: self.len,
                counted,
            });
        }

        Ok(())
    }
}

impl<K, V> Drop for AvlCollection<K, V> {
    fn drop(&mut self) {
        make_empty(self.root.take());
    }
}

impl<K, V> Default for AvlCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> Clone for AvlCollection<K, V> {
    fn clone(&self) -> Self {
        let mut copy = AvlCollection::new();
        preorder_copy(&self.root, &mut copy);
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        preorder_copy(&source.root, self);
    }
}

impl<K: Debug, V: Debug> Debug for AvlCollection<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlCollection<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlCollection<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for AvlCollection<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlCollection"),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlCollection<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlCollection<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        AvlCollection::from_iter(vs)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlCollection<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut c = AvlCollection::new();
        c.extend(iter);
        c
    }
}

impl<'a, K, V> IntoIterator for &'a AvlCollection<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlCollection<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = replace(&mut self.len, 0);
        IntoIter::new(self.root.take(), len)
    }
}

impl<K: Ord, V> Collection<K, V> for AvlCollection<K, V> {
    fn add(&mut self, key: K, val: V) -> Option<V> {
        self.insert(key, val)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        AvlCollection::remove(self, key)
    }

    fn find(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&V> {
        self.range_values(k1, k2)
    }

    fn keys(&self) -> Vec<&K> {
        AvlCollection::keys(self).collect()
    }

    fn size(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        AvlCollection::height(self)
    }

    fn check(&self) -> Result<()> {
        AvlCollection::check(self)
    }
}
