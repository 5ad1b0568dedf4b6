//! A red black tree set with join-based split, join, and union.
//!
//! Nodes of a tree live in a `TypedArena` owned by the tree and refer to each other by arena
//! entries. Merging two trees moves the nodes of the smaller tree into the arena of the larger
//! one and then combines them with the join-based union, so only the parts of the trees whose
//! black heights differ are rebuilt.

pub mod arena;
pub mod config;
pub mod error;
pub mod red_black_tree;
