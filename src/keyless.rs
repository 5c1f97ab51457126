use std::fmt;
use std::marker::PhantomData;

use crate::avl::Avl;
use crate::{KeylessObt, Obt};

/// A tree that stores values only, ordering them by a key derived from each
/// value with `key_fn`.
///
/// Every operation computes the key and forwards to the wrapped tree, so
/// return values and length behave exactly like the delegate's. `key_fn` must
/// be deterministic: the same value has to produce the same key on every call.
///
/// ```rust
/// use obt_rs::{Bst, Keyless};
///
/// let mut words = Keyless::new(|w: &&str| w.len());
/// assert!(words.put("abc"));
/// assert!(!words.put("xyz")); // same key as "abc"
/// assert!(words.contains(&"def"));
///
/// let mut baseline = Keyless::with_tree(Bst::new(), |n: &i64| n.abs());
/// assert!(baseline.put(-3));
/// assert!(baseline.delete(&3));
/// assert!(baseline.is_empty());
/// ```
pub struct Keyless<K, V, F, T = Avl<K, V>> {
    tree: T,
    key_fn: F,
    _marker: PhantomData<fn(&V) -> K>,
}

impl<K, V, F> Keyless<K, V, F, Avl<K, V>>
where
    K: Ord,
    F: Fn(&V) -> K,
{
    /// Creates an empty adapter over a balanced tree.
    pub fn new(key_fn: F) -> Self {
        Self::with_tree(Avl::new(), key_fn)
    }
}

impl<K, V, F, T> Keyless<K, V, F, T>
where
    F: Fn(&V) -> K,
    T: Obt<K, V>,
{
    /// Wraps `tree`, which is expected to be keyed by `key_fn` already (usually empty).
    pub fn with_tree(tree: T, key_fn: F) -> Self {
        Self {
            tree,
            key_fn,
            _marker: PhantomData,
        }
    }

    pub fn put(&mut self, value: V) -> bool {
        let key = (self.key_fn)(&value);
        self.tree.put(key, value)
    }

    pub fn delete(&mut self, value: &V) -> bool {
        self.tree.delete(&(self.key_fn)(value))
    }

    pub fn contains(&self, value: &V) -> bool {
        self.tree.contains(&(self.key_fn)(value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn into_inner(self) -> T {
        self.tree
    }
}

impl<K, V, F, T> KeylessObt<V> for Keyless<K, V, F, T>
where
    F: Fn(&V) -> K,
    T: Obt<K, V>,
{
    fn put(&mut self, value: V) -> bool {
        Keyless::put(self, value)
    }

    fn delete(&mut self, value: &V) -> bool {
        Keyless::delete(self, value)
    }

    fn contains(&self, value: &V) -> bool {
        Keyless::contains(self, value)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<K, V, F, T: fmt::Display> fmt::Display for Keyless<K, V, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

impl<K, V, F, T: fmt::Debug> fmt::Debug for Keyless<K, V, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyless").field("tree", &self.tree).finish()
    }
}
