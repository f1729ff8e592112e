use crate::arena::{Handle, TypedArena};
use crate::entry::Entry;
use crate::red_black_tree::node::Node;
use crate::red_black_tree::tree::Tree;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::ops::{Bound, Index, RangeBounds};
use std::vec;

const DEFAULT_CHUNK_SIZE: usize = 256;

/// An ordered map implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree where every node is colored red or
/// black. The root is black, a red node never has a red child, and every path from a node down to
/// an empty position passes through the same number of black nodes. Together these bound the
/// height of the tree by `2 * log2(n + 1)`.
///
/// Nodes live in an arena and refer to their children and parent by handle, so the parent links
/// used while rebalancing never take part in ownership.
///
/// # Examples
///
/// ```
/// use rb_ordered_map::red_black_tree::RedBlackMap;
///
/// let mut map = RedBlackMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map.get(&0), Some(&1));
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// *map.get_mut(&0).unwrap() = 2;
/// assert_eq!(map.remove(&0), Some((0, 2)));
/// assert_eq!(map.remove(&1), None);
/// ```
#[derive(Clone)]
pub struct RedBlackMap<K, V> {
    tree: Tree<K, V>,
}

impl<K, V> RedBlackMap<K, V> {
    /// Constructs a new, empty `RedBlackMap<K, V>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackMap<K, V>` whose nodes are allocated `chunk_size` at a
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::with_chunk_size(4096);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackMap {
            tree: Tree::new(chunk_size),
        }
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced in place and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        self.tree.insert(key, value)
    }

    /// Removes a key-value pair from the map. If the key exists in the map, it will return the
    /// associated key-value pair. Otherwise it will return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Some((1, 1)));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).map(|entry| entry.into_pair())
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist. The key itself cannot be changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key).map(|entry| &mut entry.value)
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.size
    }

    /// Returns the capacity of the map. Nodes are allocated one per key, so this is always equal
    /// to `len`.
    pub fn capacity(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a key in the map that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor(&0), None);
    /// assert_eq!(map.floor(&2), Some(&1));
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.floor(key).map(|entry| &entry.key)
    }

    /// Returns a key in the map that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.ceil(&0), Some(&1));
    /// assert_eq!(map.ceil(&2), None);
    /// ```
    pub fn ceil<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.ceil(key).map(|entry| &entry.key)
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&K> {
        self.tree.min().map(|entry| &entry.key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&K> {
        self.tree.max().map(|entry| &entry.key)
    }

    /// Returns a vector holding a clone of every key in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(3, 'c');
    /// map.insert(1, 'a');
    /// assert_eq!(map.collect_keys(), vec![1, 3]);
    /// ```
    pub fn collect_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Returns a vector holding a clone of every value, ordered by key.
    pub fn collect_values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.values().cloned().collect()
    }

    /// Returns a vector holding a clone of every key-value pair in ascending key order.
    pub fn collect_pairs(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal. The iterator can be cloned to restart a traversal from its current position.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&3, &3)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackMapIter<'_, K, V> {
        RedBlackMapIter {
            arena: &self.tree.arena,
            current: self.tree.root,
            stack: Vec::new(),
            remaining: self.tree.size,
        }
    }

    /// Returns an iterator over the keys of the map in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(2, 'b');
    /// map.insert(1, 'a');
    /// assert_eq!(map.keys().collect::<Vec<&u32>>(), vec![&1, &2]);
    /// ```
    pub fn keys(&self) -> RedBlackMapKeys<'_, K, V> {
        RedBlackMapKeys { iter: self.iter() }
    }

    /// Returns an iterator over the values of the map, ordered by key.
    pub fn values(&self) -> RedBlackMapValues<'_, K, V> {
        RedBlackMapValues { iter: self.iter() }
    }

    /// Returns a mutable iterator over the map. The iterator will yield key-value pairs in
    /// ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    ///
    /// for (_, value) in &mut map {
    ///     *value += 1;
    /// }
    ///
    /// let mut iterator = map.iter_mut();
    /// assert_eq!(iterator.next(), Some((&1, &mut 2)));
    /// assert_eq!(iterator.next(), Some((&3, &mut 4)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter_mut(&mut self) -> RedBlackMapIterMut<'_, K, V> {
        // in-order rank of every node, listed in storage order
        let mut ranks: Vec<(Handle, usize)> = self
            .handles()
            .enumerate()
            .map(|(rank, handle)| (handle, rank))
            .collect();
        ranks.sort_unstable();

        let mut ranked = ranks
            .into_iter()
            .zip(self.tree.arena.iter_mut())
            .map(|((handle, rank), (stored, node))| {
                debug_assert_eq!(handle, stored);
                (rank, node)
            })
            .collect::<Vec<_>>();
        ranked.sort_unstable_by_key(|pair| pair.0);

        let pairs = ranked
            .into_iter()
            .map(|(_, node)| (&node.entry.key, &mut node.entry.value))
            .collect::<Vec<_>>();
        RedBlackMapIterMut {
            pairs: pairs.into_iter(),
        }
    }

    /// Returns a mutable iterator over the values of the map, ordered by key.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, value)| value)
    }

    fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        let arena = &self.tree.arena;
        let mut stack = Vec::new();
        let mut current = self.tree.root;
        std::iter::from_fn(move || {
            while let Some(handle) = current {
                stack.push(handle);
                current = arena[handle].left;
            }
            stack.pop().map(|handle| {
                current = arena[handle].right;
                handle
            })
        })
    }

    /// Returns an iterator over the key-value pairs whose keys fall within `range`, in ascending
    /// key order. A range whose start is after its end yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// for key in 0..10 {
    ///     map.insert(key, key * 10);
    /// }
    ///
    /// let keys: Vec<&u32> = map.range(3..6).map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![&3, &4, &5]);
    ///
    /// assert_eq!(map.range(8..).count(), 2);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> RedBlackMapRange<'_, K, V>
    where
        K: Borrow<Q> + Ord,
        R: RangeBounds<Q>,
        Q: Ord + ?Sized,
    {
        let arena = &self.tree.arena;
        let mut stack = self.tree.first_path(range.start_bound());
        let last = self.tree.last_within(range.end_bound());

        let is_empty = match (stack.last(), last) {
            (Some(first), Some(last)) => arena[*first].entry.key > arena[last].entry.key,
            _ => true,
        };
        if is_empty {
            stack.clear();
        }

        RedBlackMapRange { arena, stack, last }
    }

    /// Calls `visitor` on every key-value pair in ascending key order until it returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// for key in 1..=5 {
    ///     map.insert(key, ());
    /// }
    ///
    /// let mut seen = Vec::new();
    /// map.visit(|key, _| {
    ///     seen.push(*key);
    ///     *key < 3
    /// });
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    pub fn visit<F>(&self, visitor: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        visit_all(self.iter(), visitor);
    }

    /// Calls `visitor` on every key-value pair whose key is at least `start`, in ascending key
    /// order, until it returns `false`.
    pub fn visit_from<Q, F>(&self, start: &Q, visitor: F)
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> bool,
    {
        visit_all(
            self.range::<Q, _>((Bound::Included(start), Bound::<&Q>::Unbounded)),
            visitor,
        );
    }

    /// Calls `visitor` on every key-value pair whose key lies between `a` and `b` inclusive, in
    /// ascending key order, until it returns `false`. The bounds may be given in either order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_ordered_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// for key in &[5, 2, 8, 1, 7, 3] {
    ///     map.insert(*key, ());
    /// }
    ///
    /// let mut seen = Vec::new();
    /// map.visit_between(&7, &3, |key, _| {
    ///     seen.push(*key);
    ///     true
    /// });
    /// assert_eq!(seen, vec![3, 5, 7]);
    /// ```
    pub fn visit_between<Q, F>(&self, a: &Q, b: &Q, visitor: F)
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> bool,
    {
        let (start, end) = if a > b { (b, a) } else { (a, b) };
        visit_all(
            self.range::<Q, _>((Bound::Included(start), Bound::Included(end))),
            visitor,
        );
    }
}

fn visit_all<'a, K, V, I, F>(iter: I, mut visitor: F)
where
    K: 'a,
    V: 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
    F: FnMut(&K, &V) -> bool,
{
    for (key, value) in iter {
        if !visitor(key, value) {
            break;
        }
    }
}

impl<K, V> IntoIterator for RedBlackMap<K, V> {
    type IntoIter = RedBlackMapIntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        let Tree { arena, root, .. } = self.tree;
        RedBlackMapIntoIter {
            arena,
            current: root,
            stack: Vec::new(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RedBlackMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = RedBlackMapIter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RedBlackMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = RedBlackMapIterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An owning iterator for `RedBlackMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields owned entries. Each node
/// is released from the arena as it is yielded.
pub struct RedBlackMapIntoIter<K, V> {
    arena: TypedArena<Node<K, V>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<K, V> Iterator for RedBlackMapIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            let node = self.arena.free(handle);
            self.current = node.right;
            node.entry.into_pair()
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.arena.len(), Some(self.arena.len()))
    }
}

impl<K, V> ExactSizeIterator for RedBlackMapIntoIter<K, V> {}

/// An iterator for `RedBlackMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references. It
/// keeps an explicit stack of the ancestors still to be visited, so it does no work beyond the
/// elements actually pulled from it.
pub struct RedBlackMapIter<'a, K, V> {
    arena: &'a TypedArena<Node<K, V>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
    remaining: usize,
}

impl<'a, K, V> Clone for RedBlackMapIter<'a, K, V> {
    fn clone(&self) -> Self {
        RedBlackMapIter {
            arena: self.arena,
            current: self.current,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for RedBlackMapIter<'a, K, V>
where
    K: 'a,
    V: 'a,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            let node = &arena[handle];
            self.current = node.right;
            self.remaining -= 1;
            (&node.entry.key, &node.entry.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for RedBlackMapIter<'a, K, V> {}

/// An iterator over the keys of a `RedBlackMap<K, V>` in ascending order.
pub struct RedBlackMapKeys<'a, K, V> {
    iter: RedBlackMapIter<'a, K, V>,
}

impl<'a, K, V> Clone for RedBlackMapKeys<'a, K, V> {
    fn clone(&self) -> Self {
        RedBlackMapKeys {
            iter: self.iter.clone(),
        }
    }
}

impl<'a, K, V> Iterator for RedBlackMapKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for RedBlackMapKeys<'a, K, V> {}

/// An iterator over the values of a `RedBlackMap<K, V>`, ordered by key.
pub struct RedBlackMapValues<'a, K, V> {
    iter: RedBlackMapIter<'a, K, V>,
}

impl<'a, K, V> Clone for RedBlackMapValues<'a, K, V> {
    fn clone(&self) -> Self {
        RedBlackMapValues {
            iter: self.iter.clone(),
        }
    }
}

impl<'a, K, V> Iterator for RedBlackMapValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for RedBlackMapValues<'a, K, V> {}

/// A mutable iterator for `RedBlackMap<K, V>`.
///
/// This iterator yields mutable references to the values in ascending key order.
pub struct RedBlackMapIterMut<'a, K, V> {
    pairs: vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for RedBlackMapIterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

/// An iterator over a sub-range of a `RedBlackMap<K, V>`.
///
/// The traversal stack is seeded by a single descent towards the lower bound and the iterator
/// stops after yielding the last node within the upper bound.
pub struct RedBlackMapRange<'a, K, V> {
    arena: &'a TypedArena<Node<K, V>>,
    stack: Vec<Handle>,
    last: Option<Handle>,
}

impl<'a, K, V> Clone for RedBlackMapRange<'a, K, V> {
    fn clone(&self) -> Self {
        RedBlackMapRange {
            arena: self.arena,
            stack: self.stack.clone(),
            last: self.last,
        }
    }
}

impl<'a, K, V> Iterator for RedBlackMapRange<'a, K, V>
where
    K: 'a,
    V: 'a,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let handle = self.stack.pop()?;
        let node = &arena[handle];
        if Some(handle) == self.last {
            self.stack.clear();
        } else {
            let mut current = node.right;
            while let Some(child) = current {
                self.stack.push(child);
                current = arena[child].left;
            }
        }
        Some((&node.entry.key, &node.entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.stack.is_empty() {
            (0, Some(0))
        } else {
            (1, Some(self.arena.len()))
        }
    }
}

impl<K, V> Default for RedBlackMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for RedBlackMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> PartialEq for RedBlackMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &RedBlackMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for RedBlackMap<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<'a, K, V, Q> Index<&'a Q> for RedBlackMap<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        self.get(key).expect("Error: key does not exist in map.")
    }
}

impl<K, V> FromIterator<(K, V)> for RedBlackMap<K, V>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = RedBlackMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for RedBlackMap<K, V>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Serializes as a sequence of `Entry { key, value }` records in ascending key order.
impl<K, V> Serialize for RedBlackMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|(key, value)| Entry { key, value }))
    }
}

impl<'de, K, V> Deserialize<'de> for RedBlackMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry<K, V>>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(Entry::into_pair).collect())
    }
}
