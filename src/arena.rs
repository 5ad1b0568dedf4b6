//! Index-addressed storage for tree nodes.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A struct representing an entry to `TypedArena<T>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    index: usize,
}

impl Entry {
    /// Returns the position of the entry inside its arena. Positions are stable for as long as
    /// the entry is allocated.
    pub fn index(self) -> usize {
        self.index
    }
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Entry>),
}

/// An allocator for a single type of object that hands out copyable indices instead of
/// references.
///
/// Every object is owned by the arena and is dropped with it. Freed blocks are threaded onto an
/// intrusive free list and reused by later allocations, so entries stay small and stable while
/// objects come and go. The underlying container is a `Vec` and no unsafe code is used.
///
/// # Examples
///
/// ```
/// use red_black_join::arena::TypedArena;
///
/// let mut arena = TypedArena::new();
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct TypedArena<T> {
    head: Option<Entry>,
    blocks: Vec<Block<T>>,
    len: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_entry(&self, entry: Entry) -> bool {
        entry.index < self.blocks.len()
    }

    /// Constructs a new, empty `TypedArena<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new();
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new, empty `TypedArena<T>` with room for `capacity` objects before it needs
    /// to grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::with_capacity(1024);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        TypedArena {
            head: None,
            blocks: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Allocates an object in the arena and returns its entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Entry {
        self.len += 1;
        match self.head.take() {
            None => {
                self.blocks.push(Block::Occupied(value));
                Entry {
                    index: self.blocks.len() - 1,
                }
            },
            Some(entry) => {
                let vacant_block =
                    mem::replace(&mut self.blocks[entry.index], Block::Occupied(value));
                match vacant_block {
                    Block::Vacant(next_entry) => {
                        self.head = next_entry;
                        entry
                    },
                    Block::Occupied(_) => panic!("Error: free list points at an occupied block."),
                }
            },
        }
    }

    /// Deallocates an object in the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if entry corresponds to an invalid or vacant block.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// ```
    pub fn free(&mut self, entry: Entry) -> T {
        if !self.is_valid_entry(entry) {
            panic!("Error: attempting to free invalid block.");
        }
        if let Block::Vacant(_) = self.blocks[entry.index] {
            panic!("Error: attempting to free vacant block.");
        }
        let next_entry = self.head.replace(entry);
        match mem::replace(&mut self.blocks[entry.index], Block::Vacant(next_entry)) {
            Block::Occupied(value) => {
                self.len -= 1;
                value
            },
            Block::Vacant(_) => panic!("Error: attempting to free vacant block."),
        }
    }

    /// Returns an immutable reference to an object in the arena. Returns `None` if the entry
    /// does not correspond to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// arena.free(x);
    /// assert_eq!(arena.get(x), None);
    /// ```
    pub fn get(&self, entry: Entry) -> Option<&T> {
        match self.blocks.get(entry.index) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the arena. Returns `None` if the entry does
    /// not correspond to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// *arena.get_mut(x).unwrap() = 1;
    /// assert_eq!(arena[x], 1);
    /// ```
    pub fn get_mut(&mut self, entry: Entry) -> Option<&mut T> {
        match self.blocks.get_mut(entry.index) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns mutable references to two distinct objects at once. Returns `None` if the entries
    /// are equal or either one does not correspond to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    /// use std::mem;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// let y = arena.allocate(1);
    /// if let Some((a, b)) = arena.get_pair_mut(x, y) {
    ///     mem::swap(a, b);
    /// }
    /// assert_eq!((arena[x], arena[y]), (1, 0));
    /// assert!(arena.get_pair_mut(x, x).is_none());
    /// ```
    pub fn get_pair_mut(&mut self, first: Entry, second: Entry) -> Option<(&mut T, &mut T)> {
        if first == second || !self.is_valid_entry(first) || !self.is_valid_entry(second) {
            return None;
        }
        let (low, high) = if first.index < second.index {
            (first.index, second.index)
        } else {
            (second.index, first.index)
        };
        let (head, tail) = self.blocks.split_at_mut(high);
        match (&mut head[low], &mut tail[0]) {
            (Block::Occupied(low_value), Block::Occupied(high_value)) => {
                if first.index < second.index {
                    Some((low_value, high_value))
                } else {
                    Some((high_value, low_value))
                }
            },
            _ => None,
        }
    }

    /// Returns the number of allocated objects.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// arena.allocate(0);
    /// assert_eq!(arena.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no objects are allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new();
    /// assert!(arena.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every object in the arena. All previously returned entries become invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// arena.clear();
    /// assert_eq!(arena.get(x), None);
    /// ```
    pub fn clear(&mut self) {
        self.head = None;
        self.blocks.clear();
        self.len = 0;
    }
}

impl<T> Default for TypedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(entry).expect("Error: entry out of bounds.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(entry).expect("Error: entry out of bounds.")
    }
}
