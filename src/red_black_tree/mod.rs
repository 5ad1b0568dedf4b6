//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions. Trees can also be split around a key,
//! joined around a separating key and merged with each other.

mod check;
mod graphviz;
mod join;
mod node;
mod serialize;
mod set;
mod tree;

pub use self::node::{Color, Direction};
pub use self::set::{RedBlackSet, RedBlackSetIntoIter, RedBlackSetIter};
