//! # obt-rs
//!
//! Ordered binary trees with set-like semantics: putting a key that is
//! already present is a no-op reported as `false`, and deleting a missing
//! key is a no-op reported as `false`. Nothing here returns an error.
//!
//! - [`Avl`]: height-balanced, `O(log n)` worst case for every operation.
//! - [`Bst`]: the same contract with no rebalancing; a baseline.
//! - [`Keyless`]: stores values only, deriving each key from its value.
//!
//! ## Example
//!
//! ```rust
//! use obt_rs::Avl;
//!
//! let mut tree = Avl::new();
//! assert!(tree.put(10, "ten"));
//! assert!(tree.put(5, "five"));
//! assert!(!tree.put(10, "TEN"));
//!
//! assert_eq!(tree.get(&10), Some(&"ten"));
//! assert!(tree.delete(&5));
//! assert!(!tree.contains(&5));
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! The containers are not synchronized. Wrap the whole tree in a lock when
//! several threads need to mutate it.

#![forbid(unsafe_code)]

mod avl;
mod bst;
mod error;
mod keyless;

pub use avl::{Avl, Iter};
pub use bst::{Bst, Iter as BstIter};
pub use error::InvariantError;
pub use keyless::Keyless;

/// An ordered binary tree keyed by `K`.
///
/// Implementations are set-like on keys: the first value stored under a key
/// stays until the key is deleted.
pub trait Obt<K, V> {
    /// Inserts the pair. Returns `true` iff the key was not present before.
    fn put(&mut self, key: K, value: V) -> bool;

    /// Removes the key. Returns `true` iff it was present.
    fn delete(&mut self, key: &K) -> bool;

    fn contains(&self, key: &K) -> bool;

    /// Number of keys currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered binary tree that takes values and derives the ordering key
/// itself. See [`Keyless`].
pub trait KeylessObt<V> {
    /// Inserts the value. Returns `true` iff its key was not present before.
    fn put(&mut self, value: V) -> bool;

    /// Removes the entry keyed like `value`. Returns `true` iff one was present.
    fn delete(&mut self, value: &V) -> bool;

    fn contains(&self, value: &V) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Puts every value, returning how many were actually added.
///
/// `O(k log n)` for `k` values on a balanced tree.
pub fn put_many<V, T>(tree: &mut T, values: impl IntoIterator<Item = V>) -> usize
where
    T: KeylessObt<V> + ?Sized,
{
    values.into_iter().fold(0, |added, v| added + usize::from(tree.put(v)))
}

/// Deletes every value, returning how many were actually removed.
pub fn delete_many<'a, V, T>(tree: &mut T, values: impl IntoIterator<Item = &'a V>) -> usize
where
    V: 'a,
    T: KeylessObt<V> + ?Sized,
{
    values.into_iter().fold(0, |removed, v| removed + usize::from(tree.delete(v)))
}

/// Whether at least one of `values` is contained. Stops at the first hit;
/// `false` for no values.
///
/// For a handful of values this beats a full traversal. To test most of the
/// tree, iterate it instead.
pub fn contains_any<'a, V, T>(tree: &T, values: impl IntoIterator<Item = &'a V>) -> bool
where
    V: 'a,
    T: KeylessObt<V> + ?Sized,
{
    values.into_iter().any(|v| tree.contains(v))
}

/// Whether every one of `values` is contained. Stops at the first miss;
/// `true` for no values.
pub fn contains_all<'a, V, T>(tree: &T, values: impl IntoIterator<Item = &'a V>) -> bool
where
    V: 'a,
    T: KeylessObt<V> + ?Sized,
{
    values.into_iter().all(|v| tree.contains(v))
}


#[cfg(test)]
mod proptests;
