use crate::arena::{Handle, TypedArena};
use crate::entry::Entry;
use crate::red_black_tree::node::{Color, Node, Side};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;
use std::ops::Bound;

/// The arena-backed red black tree shared by the map and its iterators.
#[derive(Clone)]
pub struct Tree<K, V> {
    pub arena: TypedArena<Node<K, V>>,
    pub root: Option<Handle>,
    pub size: usize,
}

impl<K, V> Tree<K, V> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
            size: 0,
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.size = 0;
    }

    fn is_red(&self, handle: Option<Handle>) -> bool {
        match handle {
            None => false,
            Some(handle) => self.arena[handle].color == Color::Red,
        }
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.arena[handle].color = color;
    }

    // precondition: `child` is a child of `parent`
    fn side_of(&self, child: Handle, parent: Handle) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Points whatever owned `old` (its parent, or the tree itself) at `new` instead.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(old, parent);
                *self.arena[parent].child_mut(side) = new;
            },
        }
    }

    /// Rotates the subtree rooted at `handle` towards `side`. The child on the opposite side takes
    /// the place of `handle`, and `handle` becomes its child on `side`.
    fn rotate(&mut self, handle: Handle, side: Side) {
        let child = self.arena[handle]
            .child(side.opposite())
            .expect("Expected rotated node to have a child on the opposite side.");
        let inner = self.arena[child].child(side);

        *self.arena[handle].child_mut(side.opposite()) = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, Some(child));

        *self.arena[child].child_mut(side) = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    pub fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.arena[handle].left {
            handle = left;
        }
        handle
    }

    pub fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.arena[handle].right {
            handle = right;
        }
        handle
    }

    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|handle| &self.arena[handle].entry)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            Some(handle) => Some(&mut self.arena[handle].entry),
            None => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &mut self.arena[handle];
            side = match key.cmp(&node.entry.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(mem::replace(&mut node.entry.value, value)),
            };
            parent = Some(handle);
            curr = node.child(side);
        }

        let handle = self.arena.allocate(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(handle),
            Some(parent) => *self.arena[parent].child_mut(side) = Some(handle),
        }
        self.size += 1;
        self.insert_fixup(handle);
        None
    }

    // `handle` is red and may have a red parent; everything else satisfies the invariants.
    fn insert_fixup(&mut self, mut handle: Handle) {
        while let Some(parent) = self.arena[handle].parent {
            if !self.is_red(Some(parent)) {
                break;
            }

            // a red parent is never the root
            let grandparent = self.arena[parent]
                .parent
                .expect("Expected red node to have a parent.");
            let side = self.side_of(parent, grandparent);
            let uncle = self.arena[grandparent].child(side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup at {:?}: red uncle, recoloring", handle);
                self.set_color(parent, Color::Black);
                if let Some(uncle) = uncle {
                    self.set_color(uncle, Color::Black);
                }
                self.set_color(grandparent, Color::Red);
                handle = grandparent;
            } else {
                let mut parent = parent;
                if self.side_of(handle, parent) != side {
                    trace!("insert fixup at {:?}: inner child, rotating parent", handle);
                    self.rotate(parent, side);
                    handle = parent;
                    parent = self.arena[handle]
                        .parent
                        .expect("Expected rotated node to have a parent.");
                }
                trace!("insert fixup at {:?}: black uncle, rotating grandparent", handle);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate(grandparent, side.opposite());
                break;
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key)?;

        // the node that is physically unlinked has at most one child
        let removed = match (self.arena[target].left, self.arena[target].right) {
            (Some(_), Some(right)) => self.leftmost(right),
            _ => target,
        };

        let color = self.arena[removed].color;
        let child = self.arena[removed].left.or(self.arena[removed].right);
        let parent = self.arena[removed].parent;
        if let Some(child) = child {
            self.arena[child].parent = parent;
        }
        self.replace_child(parent, removed, child);

        let node = self.arena.free(removed);
        let entry = if removed == target {
            node.entry
        } else {
            mem::replace(&mut self.arena[target].entry, node.entry)
        };
        self.size -= 1;

        // unlinking a red node leaves every black height unchanged
        if color == Color::Black {
            self.remove_fixup(child, parent);
        }
        Some(entry)
    }

    // The position `handle` (possibly an empty slot under `parent`) is one black node short.
    fn remove_fixup(&mut self, mut handle: Option<Handle>, mut parent: Option<Handle>) {
        while handle != self.root && !self.is_red(handle) {
            let curr_parent = parent.expect("Expected a non-root position to have a parent.");
            let side = if self.arena[curr_parent].left == handle {
                Side::Left
            } else {
                Side::Right
            };
            let mut sibling = self.arena[curr_parent]
                .child(side.opposite())
                .expect("Expected a short position to have a sibling.");

            if self.is_red(Some(sibling)) {
                trace!("remove fixup under {:?}: red sibling, rotating parent", curr_parent);
                self.set_color(sibling, Color::Black);
                self.set_color(curr_parent, Color::Red);
                self.rotate(curr_parent, side);
                sibling = self.arena[curr_parent]
                    .child(side.opposite())
                    .expect("Expected a short position to have a sibling.");
            }

            let near = self.arena[sibling].child(side);
            let far = self.arena[sibling].child(side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                trace!("remove fixup under {:?}: black nephews, recoloring", curr_parent);
                self.set_color(sibling, Color::Red);
                handle = Some(curr_parent);
                parent = self.arena[curr_parent].parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("remove fixup under {:?}: red near nephew, rotating sibling", curr_parent);
                if let Some(near) = near {
                    self.set_color(near, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.arena[curr_parent]
                    .child(side.opposite())
                    .expect("Expected a short position to have a sibling.");
            }

            trace!("remove fixup under {:?}: red far nephew, rotating parent", curr_parent);
            let parent_color = self.arena[curr_parent].color;
            self.set_color(sibling, parent_color);
            self.set_color(curr_parent, Color::Black);
            if let Some(far) = self.arena[sibling].child(side.opposite()) {
                self.set_color(far, Color::Black);
            }
            self.rotate(curr_parent, side);
            handle = self.root;
            parent = None;
        }

        if let Some(handle) = handle {
            self.set_color(handle, Color::Black);
        }
    }

    pub fn min(&self) -> Option<&Entry<K, V>> {
        self.root.map(|root| &self.arena[self.leftmost(root)].entry)
    }

    pub fn max(&self) -> Option<&Entry<K, V>> {
        self.root.map(|root| &self.arena[self.rightmost(root)].entry)
    }

    pub fn floor<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.last_within(Bound::Included(key))
            .map(|handle| &self.arena[handle].entry)
    }

    pub fn ceil<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.first_path(Bound::Included(key))
            .last()
            .map(|handle| &self.arena[*handle].entry)
    }

    /// Returns the path of nodes at which a descent towards `lower` turned left, which is exactly
    /// the stack an in-order traversal holds just before it yields the first key within `lower`.
    pub fn first_path<Q>(&self, lower: Bound<&Q>) -> Vec<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut stack = Vec::new();
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            let key = node.entry.key.borrow();
            let within = match lower {
                Bound::Included(bound) => key >= bound,
                Bound::Excluded(bound) => key > bound,
                Bound::Unbounded => true,
            };
            if within {
                stack.push(handle);
                curr = node.left;
            } else {
                curr = node.right;
            }
        }
        stack
    }

    /// Returns the node with the largest key within `upper`.
    pub fn last_within<Q>(&self, upper: Bound<&Q>) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ret = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            let key = node.entry.key.borrow();
            let within = match upper {
                Bound::Included(bound) => key <= bound,
                Bound::Excluded(bound) => key < bound,
                Bound::Unbounded => true,
            };
            if within {
                ret = Some(handle);
                curr = node.right;
            } else {
                curr = node.left;
            }
        }
        ret
    }
}

#[cfg(test)]
impl<K, V> Tree<K, V>
where
    K: Ord,
{
    /// Walks the whole tree and panics if any structural invariant is broken. Returns the black
    /// height of the root.
    pub fn check_invariants(&self) -> usize {
        if let Some(root) = self.root {
            assert_eq!(self.arena[root].color, Color::Black, "root is red");
            assert_eq!(self.arena[root].parent, None, "root has a parent");
        }
        let (count, black_height) = self.check_subtree(self.root, None, None, None);
        assert_eq!(count, self.size, "size does not match node count");
        assert_eq!(self.arena.len(), self.size, "arena holds unreachable nodes");
        black_height
    }

    fn check_subtree(
        &self,
        handle: Option<Handle>,
        parent: Option<Handle>,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> (usize, usize) {
        let handle = match handle {
            Some(handle) => handle,
            None => return (0, 0),
        };
        let node = &self.arena[handle];
        assert_eq!(node.parent, parent, "broken parent link");
        if let Some(lower) = lower {
            assert!(*lower < node.entry.key, "keys out of order");
        }
        if let Some(upper) = upper {
            assert!(node.entry.key < *upper, "keys out of order");
        }
        if node.color == Color::Red {
            assert!(!self.is_red(node.left), "red node has a red left child");
            assert!(!self.is_red(node.right), "red node has a red right child");
        }

        let key = Some(&node.entry.key);
        let (left_count, left_height) = self.check_subtree(node.left, Some(handle), lower, key);
        let (right_count, right_height) = self.check_subtree(node.right, Some(handle), key, upper);
        assert_eq!(left_height, right_height, "unequal black heights");

        let own = if node.color == Color::Black { 1 } else { 0 };
        (left_count + right_count + 1, left_height + own)
    }

    pub fn height(&self) -> usize {
        fn height<K, V>(tree: &Tree<K, V>, handle: Option<Handle>) -> usize {
            match handle {
                None => 0,
                Some(handle) => {
                    let node = &tree.arena[handle];
                    1 + height(tree, node.left).max(height(tree, node.right))
                },
            }
        }
        height(self, self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::red_black_tree::node::Color;
    use rand::{Rng, SeedableRng, XorShiftRng};

    fn keys(tree: &Tree<u32, u32>) -> Vec<u32> {
        let mut ret = Vec::new();
        let mut stack = tree.first_path::<u32>(std::ops::Bound::Unbounded);
        while let Some(handle) = stack.pop() {
            ret.push(tree.arena[handle].entry.key);
            if let Some(right) = tree.arena[handle].right {
                let mut curr = Some(right);
                while let Some(handle) = curr {
                    stack.push(handle);
                    curr = tree.arena[handle].left;
                }
            }
        }
        ret
    }

    fn build(keys: &[u32]) -> Tree<u32, u32> {
        let mut tree = Tree::new(8);
        for key in keys {
            assert_eq!(tree.insert(*key, *key), None);
            tree.check_invariants();
        }
        tree
    }

    fn color_of(tree: &Tree<u32, u32>, key: u32) -> Color {
        let handle = tree.find(&key).unwrap();
        tree.arena[handle].color
    }

    #[test]
    fn test_insert_first_is_black_root() {
        let tree = build(&[1]);
        assert_eq!(color_of(&tree, 1), Color::Black);
        assert_eq!(tree.check_invariants(), 1);
    }

    #[test]
    fn test_insert_replace_keeps_shape() {
        let mut tree = build(&[2, 1, 3]);
        let root = tree.root;
        assert_eq!(tree.insert(1, 10), Some(1));
        assert_eq!(tree.root, root);
        assert_eq!(tree.size, 3);
        assert_eq!(tree.get(&1).map(|entry| entry.value), Some(10));
        assert_eq!(color_of(&tree, 1), Color::Red);
    }

    #[test]
    fn test_insert_red_uncle_recolors() {
        let tree = build(&[2, 1, 3, 4]);
        assert_eq!(color_of(&tree, 2), Color::Black);
        assert_eq!(color_of(&tree, 1), Color::Black);
        assert_eq!(color_of(&tree, 3), Color::Black);
        assert_eq!(color_of(&tree, 4), Color::Red);
    }

    #[test]
    fn test_insert_straight_line_both_sides() {
        let ascending = build(&[1, 2, 3]);
        assert_eq!(ascending.arena[ascending.root.unwrap()].entry.key, 2);

        let descending = build(&[3, 2, 1]);
        assert_eq!(descending.arena[descending.root.unwrap()].entry.key, 2);
    }

    #[test]
    fn test_insert_zig_zag_both_sides() {
        let left_right = build(&[3, 1, 2]);
        assert_eq!(left_right.arena[left_right.root.unwrap()].entry.key, 2);
        assert_eq!(color_of(&left_right, 1), Color::Red);
        assert_eq!(color_of(&left_right, 3), Color::Red);

        let right_left = build(&[1, 3, 2]);
        assert_eq!(right_left.arena[right_left.root.unwrap()].entry.key, 2);
        assert_eq!(color_of(&right_left, 1), Color::Red);
        assert_eq!(color_of(&right_left, 3), Color::Red);
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = build(&[5, 2, 8]);
        assert!(tree.remove(&4).is_none());
        assert_eq!(tree.size, 3);
        assert_eq!(keys(&tree), vec![2, 5, 8]);
        tree.check_invariants();
    }

    #[test]
    fn test_remove_red_leaf_skips_fixup() {
        let mut tree = build(&[2, 1, 3]);
        let black_height = tree.check_invariants();
        assert_eq!(color_of(&tree, 3), Color::Red);
        assert_eq!(tree.remove(&3).map(|entry| entry.key), Some(3));
        assert_eq!(tree.check_invariants(), black_height);
        assert_eq!(color_of(&tree, 1), Color::Red);
    }

    #[test]
    fn test_remove_red_successor_skips_fixup() {
        let mut tree = build(&[5, 3, 8, 7]);
        assert_eq!(color_of(&tree, 7), Color::Red);
        let black_height = tree.check_invariants();
        let entry = tree.remove(&5).unwrap();
        assert_eq!((entry.key, entry.value), (5, 5));
        assert_eq!(tree.arena[tree.root.unwrap()].entry.key, 7);
        assert_eq!(tree.check_invariants(), black_height);
        assert_eq!(keys(&tree), vec![3, 7, 8]);
    }

    #[test]
    fn test_remove_black_leaf_left_side() {
        // the removed leaf leaves an empty slot that the fixup must treat as doubly black
        let mut tree = build(&[2, 1, 3, 4]);
        assert_eq!(color_of(&tree, 1), Color::Black);
        tree.remove(&1);
        tree.check_invariants();
        assert_eq!(keys(&tree), vec![2, 3, 4]);
        assert_eq!(tree.arena[tree.root.unwrap()].entry.key, 3);
    }

    #[test]
    fn test_remove_black_leaf_right_side() {
        let mut tree = build(&[3, 2, 4, 1]);
        assert_eq!(color_of(&tree, 4), Color::Black);
        tree.remove(&4);
        tree.check_invariants();
        assert_eq!(keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.arena[tree.root.unwrap()].entry.key, 2);
    }

    #[test]
    fn test_remove_near_nephew_both_sides() {
        let mut tree = build(&[2, 1, 4, 3]);
        tree.remove(&1);
        tree.check_invariants();
        assert_eq!(keys(&tree), vec![2, 3, 4]);

        let mut tree = build(&[3, 1, 4, 2]);
        tree.remove(&4);
        tree.check_invariants();
        assert_eq!(keys(&tree), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_black_nephews_propagates() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7, 8]);
        tree.remove(&8);
        for key in &[1, 3, 5, 7] {
            tree.remove(key);
            tree.check_invariants();
        }
        assert_eq!(keys(&tree), vec![2, 4, 6]);
    }

    #[test]
    fn test_remove_root_until_empty() {
        let mut tree = build(&[1, 2, 3, 4, 5, 6, 7]);
        while let Some(root) = tree.root {
            let key = tree.arena[root].entry.key;
            assert_eq!(tree.remove(&key).map(|entry| entry.key), Some(key));
            tree.check_invariants();
        }
        assert_eq!(tree.size, 0);
        assert_eq!(tree.arena.len(), 0);
    }

    #[test]
    fn test_floor_ceil() {
        let tree = build(&[10, 20, 30]);
        assert_eq!(tree.floor(&5).map(|entry| entry.key), None);
        assert_eq!(tree.floor(&25).map(|entry| entry.key), Some(20));
        assert_eq!(tree.floor(&30).map(|entry| entry.key), Some(30));
        assert_eq!(tree.ceil(&5).map(|entry| entry.key), Some(10));
        assert_eq!(tree.ceil(&25).map(|entry| entry.key), Some(30));
        assert_eq!(tree.ceil(&35).map(|entry| entry.key), None);
    }

    #[test]
    fn test_random_operations_hold_invariants() {
        let mut rng: XorShiftRng = SeedableRng::from_seed([1, 2, 3, 4]);
        let mut tree = Tree::new(64);
        let mut expected = std::collections::BTreeMap::new();

        for _ in 0..5_000 {
            let key = rng.gen_range(0, 500);
            if rng.gen::<bool>() {
                assert_eq!(tree.insert(key, key + 1), expected.insert(key, key + 1));
            } else {
                assert_eq!(
                    tree.remove(&key).map(|entry| entry.value),
                    expected.remove(&key),
                );
            }
            tree.check_invariants();
        }
        assert_eq!(keys(&tree), expected.keys().cloned().collect::<Vec<u32>>());
    }

    #[test]
    fn test_stress_height_bound() {
        let mut rng: XorShiftRng = SeedableRng::from_seed([7, 7, 7, 7]);
        let mut keys: Vec<u32> = (0..10_000).collect();
        rng.shuffle(&mut keys);

        let bound = |n: usize| 2.0 * ((n + 1) as f64).log2();

        let mut tree = Tree::new(1024);
        for key in &keys {
            tree.insert(*key, *key);
            tree.check_invariants();
            assert!(tree.height() as f64 <= bound(tree.size));
        }

        rng.shuffle(&mut keys);
        for key in &keys[..5_000] {
            assert!(tree.remove(key).is_some());
            tree.check_invariants();
            assert!(tree.height() as f64 <= bound(tree.size));
        }
        assert_eq!(tree.size, 5_000);
    }
}
