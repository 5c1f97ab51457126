//! Height-balanced binary search tree.
//!
//! Every structural change happens on the way back up a recursive descent:
//! each call takes ownership of a subtree, rewrites it and hands back the
//! (possibly different) subtree root. Rotations are moves of boxed nodes, so
//! no two live references to the same node ever exist.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use log::trace;

use crate::error::InvariantError;
use crate::Obt;

// =============================================================================
// Node
// =============================================================================

type Link<K, V> = Option<Box<Node<K, V>>>;

const LEFT_HEAVY: isize = -2;
const RIGHT_HEAVY: isize = 2;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    /// Height of the subtree rooted here; a leaf is 1.
    height: usize,
}

/// Height of a possibly absent subtree. Absent is 0.
#[inline]
fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

impl<K, V> Node<K, V> {
    #[inline]
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    #[inline]
    fn fix_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// `height(right) - height(left)`.
    #[inline]
    fn balance(&self) -> isize {
        height(&self.right) as isize - height(&self.left) as isize
    }
}

// =============================================================================
// Rotations
// =============================================================================

/// Promotes the right child into `node`'s place.
fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    // demoted root first: its children are final
    node.fix_height();
    pivot.left = Some(node);
    pivot.fix_height();
    pivot
}

/// Promotes the left child into `node`'s place.
fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.fix_height();
    pivot.right = Some(node);
    pivot.fix_height();
    pivot
}

/// Recomputes `node`'s height from its children and restores the balance
/// invariant at `node`, assuming both children already satisfy it.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.fix_height();
    match node.balance() {
        LEFT_HEAVY => {
            if let Some(left) = node.left.take() {
                node.left = Some(if left.balance() > 0 {
                    trace!("avl: left-right rotation at height {}", node.height);
                    rotate_left(left)
                } else {
                    trace!("avl: left-left rotation at height {}", node.height);
                    left
                });
            }
            rotate_right(node)
        }
        RIGHT_HEAVY => {
            if let Some(right) = node.right.take() {
                node.right = Some(if right.balance() < 0 {
                    trace!("avl: right-left rotation at height {}", node.height);
                    rotate_right(right)
                } else {
                    trace!("avl: right-right rotation at height {}", node.height);
                    right
                });
            }
            rotate_left(node)
        }
        _ => node,
    }
}

// =============================================================================
// Recursive rewrites
// =============================================================================

fn put<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(key, value), true);
    };

    let put = match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, put) = put(node.left.take(), key, value);
            node.left = Some(left);
            put
        }
        Ordering::Greater => {
            let (right, put) = put(node.right.take(), key, value);
            node.right = Some(right);
            put
        }
        // First write wins.
        Ordering::Equal => return (node, false),
    };

    if !put {
        return (node, false);
    }
    (rebalance(node), true)
}

fn delete<K, V, Q>(link: Link<K, V>, key: &Q) -> (Link<K, V>, bool)
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Some(mut node) = link else {
        return (None, false);
    };

    let deleted = match key.cmp(node.key.borrow()) {
        Ordering::Less => {
            let (left, deleted) = delete(node.left.take(), key);
            node.left = left;
            deleted
        }
        Ordering::Greater => {
            let (right, deleted) = delete(node.right.take(), key);
            node.right = right;
            deleted
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, right) => return (right, true),
            (left, None) => return (left, true),
            (Some(left), Some(right)) => {
                // The in-order predecessor takes over this slot. Detaching it
                // walks (and rebalances) exactly the path a keyed delete of
                // the predecessor would.
                let (left, predecessor) = pop_max(left);
                let Node {
                    key: promoted_key,
                    value: promoted_value,
                    ..
                } = *predecessor;
                node.key = promoted_key;
                node.value = promoted_value;
                node.left = left;
                node.right = Some(right);
                trace!("avl: promoted predecessor into height {} node", node.height);
                true
            }
        },
    };

    if !deleted {
        return (Some(node), false);
    }
    (Some(rebalance(node)), true)
}

/// Unlinks the rightmost node of the subtree, returning the rebalanced
/// remainder and the detached node.
fn pop_max<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.right.take() {
        None => {
            let rest = node.left.take();
            (rest, node)
        }
        Some(right) => {
            let (rest, max) = pop_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
    }
}

/// Returns the computed height of `link`, checking balance and cached
/// heights bottom-up.
fn audit<K, V>(link: &Link<K, V>) -> Result<usize, InvariantError> {
    let Some(node) = link else {
        return Ok(0);
    };
    let left = audit(&node.left)?;
    let right = audit(&node.right)?;
    let computed = 1 + left.max(right);
    if node.height != computed {
        return Err(InvariantError::HeightMismatch {
            cached: node.height,
            computed,
        });
    }
    let balance = right as isize - left as isize;
    if !(-1..=1).contains(&balance) {
        return Err(InvariantError::Unbalanced { balance });
    }
    Ok(computed)
}

// =============================================================================
// Avl
// =============================================================================

/// An ordered key-value container kept height-balanced (AVL), with
/// `O(log n)` worst-case `put`, `delete` and `contains`.
///
/// The container is set-like: putting a key that is already present leaves
/// the stored value untouched and reports `false`.
///
/// ```rust
/// use obt_rs::Avl;
///
/// let mut tree = Avl::new();
/// for k in [5, 3, 8, 1, 4, 7, 9] {
///     tree.put(k, k * 10);
/// }
/// assert!(tree.contains(&4));
/// assert!(!tree.contains(&6));
/// assert_eq!(tree.len(), 7);
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
/// ```
#[derive(Clone)]
pub struct Avl<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Avl<K, V> {
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

    /// Height of the whole tree; 0 when empty.
    #[inline]
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Ord, V> Avl<K, V> {
    /// Inserts `key` unless it is already present. Returns whether it was added.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let (root, put) = put(self.root.take(), key, value);
        self.root = Some(root);
        if put {
            self.len += 1;
        }
        put
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, deleted) = delete(self.root.take(), key);
        self.root = root;
        if deleted {
            self.len -= 1;
        }
        deleted
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

    /// Verifies ordering, balance, cached heights and the element count.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        audit(&self.root)?;
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

impl<K, V> Default for Avl<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Obt<K, V> for Avl<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        Avl::put(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        Avl::delete(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Avl::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord, V> Extend<(K, V)> for Avl<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Avl<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a Avl<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the values in key order, e.g. `[1 2 3]`. Keys are not shown.
impl<K, V: fmt::Display> fmt::Display for Avl<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Avl<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// In-order iterator over an [`Avl`], driven by an explicit stack of pending
/// ancestors.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

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

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
