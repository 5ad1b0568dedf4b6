use crate::arena::{Entry, TypedArena};
use crate::error::{fatal, InvariantViolation};
use serde_derive::{Deserialize, Serialize};

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

/// An enum representing one of the two child positions of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }
}

/// A possibly absent node. An absent node counts as a black leaf.
pub type Link = Option<Entry>;

/// The arena that owns every node of a single tree.
pub type Pool<T> = TypedArena<Node<T>>;

/// A struct representing an internal node of a red black tree.
pub struct Node<T> {
    pub value: T,
    pub color: Color,
    pub parent: Link,
    children: [Link; 2],
}

impl<T> Node<T> {
    pub fn new(value: T) -> Self {
        Node {
            value,
            color: Color::Red,
            parent: None,
            children: [None, None],
        }
    }

    pub fn child(&self, dir: Direction) -> Link {
        self.children[dir.index()]
    }

    pub fn child_mut(&mut self, dir: Direction) -> &mut Link {
        &mut self.children[dir.index()]
    }

    pub fn left(&self) -> Link {
        self.child(Direction::Left)
    }

    pub fn right(&self) -> Link {
        self.child(Direction::Right)
    }

    /// Returns which child of the node `child` is.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of the node.
    pub fn side_of(&self, child: Entry) -> Direction {
        if self.left() == Some(child) {
            Direction::Left
        } else if self.right() == Some(child) {
            Direction::Right
        } else {
            fatal(InvariantViolation::ParentLink)
        }
    }
}

pub fn is_red<T>(pool: &Pool<T>, link: Link) -> bool {
    match link {
        None => false,
        Some(entry) => pool[entry].color == Color::Red,
    }
}

pub fn is_black<T>(pool: &Pool<T>, link: Link) -> bool {
    !is_red(pool, link)
}

/// Sets the `dir` child of `parent` to `child` and points `child` back at `parent`.
pub fn attach<T>(pool: &mut Pool<T>, parent: Entry, dir: Direction, child: Link) {
    *pool[parent].child_mut(dir) = child;
    if let Some(child) = child {
        pool[child].parent = Some(parent);
    }
}

/// Clears the parent link of a subtree root so it can be handled as a standalone tree.
pub fn detach<T>(pool: &mut Pool<T>, link: Link) -> Link {
    if let Some(entry) = link {
        pool[entry].parent = None;
    }
    link
}
