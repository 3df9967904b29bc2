//! Errors reported by [`check`](crate::AvlCollection::check).
//!
//! Ordinary lookups never fail: a missing key is `None`.  The only error type
//! in the crate describes a broken tree invariant, which can only be observed
//! through the explicit consistency check.

use thiserror::Error;

/// A violated tree invariant, as found by a consistency check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A node's cached height disagrees with the heights of its children.
    #[error("stale height: node records {stored}, children imply {actual}")]
    StaleHeight {
        /// The height stored in the node.
        stored: usize,
        /// `1 + max(height(left), height(right))`.
        actual: usize,
    },

    /// The heights of a node's subtrees differ by more than one.
    #[error("node out of balance: left height {left}, right height {right}")]
    Unbalanced {
        /// Height of the left subtree.
        left: usize,
        /// Height of the right subtree.
        right: usize,
    },

    /// A key is not strictly between its neighbours in key order.
    #[error("keys out of order")]
    OutOfOrder,

    /// The maintained entry count disagrees with the number of nodes.
    #[error("length mismatch: recorded {recorded}, counted {counted}")]
    LenMismatch {
        /// The count the collection maintains incrementally.
        recorded: usize,
        /// The number of nodes reachable from the root.
        counted: usize,
    },
}

/// Result alias for consistency checks.
pub type Result<T> = std::result::Result<T, CheckError>;
