//! Unbalanced binary search tree.
//!
//! Same contract as [`Avl`](crate::Avl) without any rebalancing, so the
//! shape depends entirely on insertion order and a sorted insertion sequence
//! degenerates into a list. Every walk is iterative for that reason.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::error::InvariantError;
use crate::Obt;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    #[inline]
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// Walks from `link` towards `key`, returning the slot that holds the
/// matching node, or the empty slot where it would be attached.
fn search_slot<'a, K, V, Q>(mut link: &'a mut Link<K, V>, key: &Q) -> &'a mut Link<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    loop {
        let ordering = match link.as_deref() {
            Some(node) => key.cmp(node.key.borrow()),
            None => return link,
        };
        link = match (ordering, link) {
            (Ordering::Less, Some(node)) => &mut node.left,
            (Ordering::Greater, Some(node)) => &mut node.right,
            (_, link) => return link,
        };
    }
}

/// Detaches the leftmost node below `link`; its right subtree takes its place.
fn pop_min<K, V>(mut link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
    while link.as_ref()?.left.is_some() {
        link = &mut link.as_mut()?.left;
    }
    let mut min = link.take()?;
    *link = min.right.take();
    Some(min)
}

/// A binary search tree with no rebalancing.
///
/// Operations cost `O(height)`: logarithmic for random insertion orders,
/// linear for sorted ones. Prefer [`Avl`](crate::Avl) unless the input is
/// known to be well shuffled.
pub struct Bst<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Bst<K, V> {
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Node<K, V>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        max
    }

    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Ord, V> Bst<K, V> {
    /// Inserts `key` unless it is already present. Returns whether it was added.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let slot = search_slot(&mut self.root, &key);
        if slot.is_some() {
            return false;
        }
        *slot = Some(Node::leaf(key, value));
        self.len += 1;
        true
    }

    /// Removes `key`. Returns whether it was present.
    ///
    /// A node with two children is replaced by its in-order successor.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let slot = search_slot(&mut self.root, key);
        let Some(mut node) = slot.take() else {
            return false;
        };
        *slot = match (node.left.take(), node.right.take()) {
            (None, right) => right,
            (left, None) => left,
            (left, mut right) => {
                if let Some(successor) = pop_min(&mut right) {
                    let Node {
                        key: promoted_key,
                        value: promoted_value,
                        ..
                    } = *successor;
                    node.key = promoted_key;
                    node.value = promoted_value;
                }
                node.left = left;
                node.right = right;
                Some(node)
            }
        };
        self.len -= 1;
        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Verifies key ordering and the element count. There is no balance to check.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut counted = 0usize;
        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            if prev.is_some_and(|p| p >= key) {
                return Err(InvariantError::Unordered { position: counted });
            }
            prev = Some(key);
            counted += 1;
        }
        if counted != self.len {
            return Err(InvariantError::CountMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(())
    }
}

impl<K, V> Drop for Bst<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for Bst<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuilds the copy by re-putting in pre-order, which reproduces the shape.
impl<K: Ord + Clone, V: Clone> Clone for Bst<K, V> {
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            copy.put(node.key.clone(), node.value.clone());
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        copy
    }
}

impl<K: Ord, V> Obt<K, V> for Bst<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        Bst::put(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        Bst::delete(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Bst::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord, V> Extend<(K, V)> for Bst<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Bst<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a Bst<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the entries in key order as `[(k1:v1)(k2:v2)]`.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for Bst<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (key, value) in self.iter() {
            write!(f, "({key}:{value})")?;
        }
        f.write_str("]")
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Bst<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
