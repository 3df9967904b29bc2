use crate::error::Result;

/// An ordered key-value container.
///
/// This is the container interface in the terms used by hosts that treat the
/// tree as one implementation among several: `add` and `remove` mutate, `find`
/// looks up a single key or a closed range of keys, and `keys`/`sort` list the
/// keys in ascending order.
///
/// # Examples
/// ```
/// use avl_collection::{AvlCollection, Collection};
///
/// fn load<C: Collection<u32, &'static str>>(c: &mut C) {
///     c.add(50, "e");
///     c.add(10, "a");
///     c.add(30, "c");
/// }
///
/// let mut c = AvlCollection::new();
/// load(&mut c);
/// assert_eq!(Collection::size(&c), 3);
/// assert_eq!(Collection::find(&c, &30), Some(&"c"));
/// assert_eq!(Collection::keys(&c), vec![&10, &30, &50]);
/// ```
pub trait Collection<K, V> {
    /// Adds a key-value pair, returning the value it replaced, if any.
    fn add(&mut self, key: K, val: V) -> Option<V>;

    /// Removes a key and returns its value.  Removing an absent key is a no-op.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns the value associated with `key`.
    fn find(&self, key: &K) -> Option<&V>;

    /// Returns the values of every entry whose key lies in `[k1, k2]`.
    ///
    /// Callers should treat the result as unordered.
    fn find_range(&self, k1: &K, k2: &K) -> Vec<&V>;

    /// Returns all keys in ascending order.
    fn keys(&self) -> Vec<&K>;

    /// Same as [`keys`](Collection::keys).
    fn sort(&self) -> Vec<&K> {
        self.keys()
    }

    /// Returns the number of entries.
    fn size(&self) -> usize;

    /// Returns the height of the underlying structure, 0 when empty.
    fn height(&self) -> usize;

    /// Verifies the structural invariants of the container.
    fn check(&self) -> Result<()>;
}
