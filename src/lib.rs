//! An ordered map backed by a red black tree.
//!
//! # Examples
//!
//! ```
//! use rb_ordered_map::red_black_tree::RedBlackMap;
//!
//! let mut map = RedBlackMap::new();
//! for key in &[5, 2, 8, 1, 7, 3] {
//!     map.insert(*key, key * 10);
//! }
//! map.remove(&2);
//!
//! assert_eq!(map.collect_keys(), vec![1, 3, 5, 7, 8]);
//! assert_eq!(map.range(3..=7).count(), 3);
//! ```

#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;

mod arena;
mod entry;
pub mod red_black_tree;

pub use crate::red_black_tree::RedBlackMap;
