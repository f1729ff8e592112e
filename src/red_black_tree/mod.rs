//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.
//!
//! Nodes are stored in an arena with parent links, and both rebalancing passes walk back up the
//! tree through those links instead of recursing.

mod map;
mod node;
mod tree;

pub use self::map::{
    RedBlackMap, RedBlackMapIntoIter, RedBlackMapIter, RedBlackMapIterMut, RedBlackMapKeys,
    RedBlackMapRange, RedBlackMapValues,
};
