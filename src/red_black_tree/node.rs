use crate::arena::Handle;
use crate::entry::Entry;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// An enum naming one of the two children of a node.
///
/// Every rebalancing case has a mirror image; the algorithms are written once against a `Side`
/// and its `opposite`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A struct representing an internal node of a red black tree.
///
/// `left` and `right` are the owning edges of the tree. `parent` only navigates upwards and is
/// `None` for the root.
#[derive(Clone)]
pub struct Node<K, V> {
    pub entry: Entry<K, V>,
    pub color: Color,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Node {
            entry: Entry { key, value },
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut Option<Handle> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}
