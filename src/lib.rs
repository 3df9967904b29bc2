//! # An ordered key-value collection on an AVL tree
//!
//! `avl-collection` provides [`AvlCollection`], a map from keys to values kept
//! in key order by a height-balanced binary search tree.  Every node owns its
//! children outright; there is no sharing between collections, so a clone is
//! a fully independent tree.  Lookup, insertion, and removal take O(log n)
//! time, and ordered traversal of the keys takes O(n).
//!
//! The [`Collection`] trait describes the same capability in the vocabulary of
//! a generic key-value container (`add`, `find`, `find_range`, ...) for code
//! that wants to be written against the abstract interface.
//!
//! ```
//! use avl_collection::AvlCollection;
//!
//! let mut c = AvlCollection::new();
//! c.insert("b", 2);
//! c.insert("a", 1);
//! c.insert("c", 3);
//! assert_eq!(c.height(), 2);
//! assert!(c.keys().eq(["a", "b", "c"].iter()));
//! ```

mod avl;
pub use avl::{AvlCollection, IntoIter, Iter};

mod collection;
pub use collection::Collection;

mod error;
pub use error::{CheckError, Result};

#[cfg(feature = "serde")]
mod serde;
