use crate::arena::Entry;
use crate::config::{DuplicatePolicy, TreeConfig};
use crate::error::{Error, InvariantViolation, Result};
use crate::red_black_tree::join::{self, Pivot, Split};
use crate::red_black_tree::node::{Color, Direction, Link, Node, Pool};
use crate::red_black_tree::{check, graphviz, tree};
use log::debug;
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::ops::Add;
use std::result;

/// An ordered set implemented using a red black tree that supports join-based splitting and
/// union.
///
/// A red black tree is a self-balancing binary search tree where every node is colored red or
/// black, no red node has a red child, and every path from a node down to an absent child passes
/// through the same number of black nodes. Besides the usual insertions and removals, two trees
/// can be merged, a tree can be split around a key, and two trees can be joined around a key.
/// These operations rebuild only the part of the trees whose black heights differ instead of
/// reinserting every value.
///
/// By default equal values are all kept, so the set behaves as a multiset. A `TreeConfig` can
/// make the set reject or replace duplicates instead.
///
/// # Examples
///
/// ```
/// use red_black_join::red_black_tree::RedBlackSet;
///
/// let mut set = RedBlackSet::new();
/// set.insert(0);
/// set.insert(3);
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.ceil(&2), Some(&3));
///
/// assert_eq!(set.remove(&0), Some(0));
/// assert_eq!(set.remove(&1), None);
/// ```
pub struct RedBlackSet<T> {
    pool: Pool<T>,
    root: Link,
    len: usize,
    config: TreeConfig,
}

impl<T> RedBlackSet<T> {
    /// Constructs a new, empty `RedBlackSet<T>` that allows duplicate values.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Constructs a new, empty `RedBlackSet<T>` with a specific configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::config::{DuplicatePolicy, TreeConfig};
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> =
    ///     RedBlackSet::with_config(TreeConfig::new().duplicates(DuplicatePolicy::Replace));
    /// assert_eq!(set.config().duplicates, DuplicatePolicy::Replace);
    /// ```
    pub fn with_config(config: TreeConfig) -> Self {
        RedBlackSet {
            pool: Pool::with_capacity(config.capacity),
            root: None,
            len: 0,
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    fn empty_like(&self) -> Self {
        RedBlackSet {
            pool: Pool::new(),
            root: None,
            len: 0,
            config: self.config.clone(),
        }
    }

    // Leaves an empty tree with the same configuration in place of `self`.
    fn take(&mut self) -> Self {
        let empty = self.empty_like();
        mem::replace(self, empty)
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root {
            self.pool[root].color = Color::Black;
        }
    }

    // Moves the nodes of another tree into this tree's arena, relocating whichever of the two
    // trees is smaller. Returns the roots of this tree and the other tree, in that order. The
    // root link of `self` is left empty.
    fn absorb(
        &mut self,
        mut donor_pool: Pool<T>,
        donor_root: Link,
        donor_len: usize,
    ) -> (Link, Link) {
        let root = self.root.take();
        if donor_len > self.len {
            let (moved, _) = join::transplant(&mut donor_pool, &mut self.pool, root, None);
            self.pool = donor_pool;
            (moved, donor_root)
        } else {
            let (moved, _) = join::transplant(&mut self.pool, &mut donor_pool, donor_root, None);
            (root, moved)
        }
    }

    fn has_adjacent_duplicates(&self) -> bool
    where
        T: Ord,
    {
        let mut iter = self.iter();
        let mut prev = match iter.next() {
            Some(value) => value,
            None => return false,
        };
        for value in iter {
            if prev == value {
                return true;
            }
            prev = value;
        }
        false
    }

    // Rebuilds a tree about to be moved into `self` so that it holds no equal values when `self`
    // does not allow duplicates. Under `Reject` the first equal value in order survives, under
    // `Replace` the last one.
    fn conform(&self, donor: Self) -> Self
    where
        T: Ord,
    {
        let policy = self.config.duplicates;
        if policy == DuplicatePolicy::Allow || !donor.has_adjacent_duplicates() {
            return donor;
        }
        debug!("removing duplicates from a tree of {} values", donor.len);
        let mut conformed = RedBlackSet::with_config(TreeConfig::new().duplicates(policy));
        conformed.extend(donor);
        conformed
    }

    /// Inserts a value into the set.
    ///
    /// With `DuplicatePolicy::Allow` this always inserts and returns `None`. With
    /// `DuplicatePolicy::Reject`, a value equal to one already in the set is handed back
    /// without modifying the set. With `DuplicatePolicy::Replace`, the stored equal value is
    /// replaced and returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.insert(1), None);
    /// assert_eq!(set.insert(1), None);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T) -> Option<T>
    where
        T: Ord,
    {
        let policy = self.config.duplicates;
        if policy != DuplicatePolicy::Allow {
            if let Some(entry) = tree::search(&self.pool, self.root, &value) {
                if policy == DuplicatePolicy::Reject {
                    return Some(value);
                }
                return Some(mem::replace(&mut self.pool[entry].value, value));
            }
        }

        tree::insert(&mut self.pool, &mut self.root, value);
        self.len += 1;
        None
    }

    /// Removes a value from the set. If the value exists in the set, it will return the
    /// removed value. Otherwise it will return `None` and leave the set untouched. When the set
    /// holds several equal values, the last of them in order is removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), Some(1));
    /// assert_eq!(set.remove(&1), None);
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let ret = tree::remove(&mut self.pool, &mut self.root, key);
        if ret.is_some() {
            self.len -= 1;
        }
        ret
    }

    /// Checks if a value exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns a reference to the stored value equal to `key`, or `None` if there is none. When
    /// the set holds several equal values, the last of them in order is returned.
    pub fn get<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::search(&self.pool, self.root, key).map(|entry| &self.pool[entry].value)
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the set, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing a tree of {} values", self.len);
        self.pool.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns a value in the set that is less than or equal to a particular key. Returns `None`
    /// if such a value does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::floor(&self.pool, self.root, key)
    }

    /// Returns a value in the set that is greater than or equal to a particular key. Returns
    /// `None` if such a value does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::ceil(&self.pool, self.root, key)
    }

    /// Returns the minimum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.root
            .map(|root| &self.pool[tree::extreme(&self.pool, root, Direction::Left)].value)
    }

    /// Returns the maximum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.root
            .map(|root| &self.pool[tree::extreme(&self.pool, root, Direction::Right)].value)
    }

    /// Returns the number of black nodes on any path from the root to an absent child.
    pub fn black_height(&self) -> usize {
        join::black_height(&self.pool, self.root)
    }

    /// Returns every value of the set paired with the color of its node, in pre-order.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::{Color, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(10);
    /// set.insert(20);
    /// set.insert(30);
    /// assert_eq!(
    ///     set.preorder(),
    ///     vec![(&20, Color::Black), (&10, Color::Red), (&30, Color::Red)],
    /// );
    /// ```
    pub fn preorder(&self) -> Vec<(&T, Color)> {
        let mut ret = Vec::with_capacity(self.len);
        let mut stack: Vec<Entry> = self.root.into_iter().collect();
        while let Some(entry) = stack.pop() {
            let node = &self.pool[entry];
            ret.push((&node.value, node.color));
            stack.extend(node.right());
            stack.extend(node.left());
        }
        ret
    }

    /// Returns an iterator over the set. The iterator will yield values using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackSetIter<'_, T> {
        RedBlackSetIter {
            pool: &self.pool,
            front: self.root.map(|root| tree::extreme(&self.pool, root, Direction::Left)),
            back: self.root.map(|root| tree::extreme(&self.pool, root, Direction::Right)),
            remaining: self.len,
        }
    }

    /// Checks the red black tree invariants, the ordering of the values, the parent links and
    /// the stored length. Returns the first violation found.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (0..100).collect();
    /// assert_eq!(set.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> result::Result<(), InvariantViolation>
    where
        T: Ord,
    {
        check::validate(&self.pool, self.root, self.len)
    }

    /// Returns a DOT description of the tree for rendering with Graphviz. Nodes are filled red or
    /// gray according to their color and named after their position in the tree's arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(42);
    /// assert_eq!(
    ///     set.to_graphviz(),
    ///     "digraph {\nrankdir = TB\n\
    ///      \t\tnode_0 [shape = Mrecord label = \"42\", fillcolor = Gray, style=filled]\n}\n",
    /// );
    /// ```
    pub fn to_graphviz(&self) -> String
    where
        T: fmt::Display,
    {
        graphviz::render(&self.pool, self.root)
    }

    /// Moves every value of `other` into the set, leaving `other` empty. Equal values are
    /// resolved with the duplicate policy of `self`: all are kept with `Allow`, the value already
    /// in `self` is kept with `Reject`, and the value from `other` is kept with `Replace`.
    ///
    /// Merging a set with itself is rejected by the borrow checker:
    ///
    /// ```compile_fail
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set: RedBlackSet<u32> = RedBlackSet::new();
    /// set.merge(&mut set);
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut n: RedBlackSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// let mut m: RedBlackSet<u32> = vec![15, 25, 5].into_iter().collect();
    /// n.merge(&mut m);
    ///
    /// assert_eq!(n.len(), 6);
    /// assert!(m.is_empty());
    /// assert_eq!(
    ///     n.iter().collect::<Vec<&u32>>(),
    ///     vec![&5, &10, &15, &20, &25, &30],
    /// );
    /// ```
    pub fn merge(&mut self, other: &mut Self)
    where
        T: Ord,
    {
        let RedBlackSet {
            pool: donor_pool,
            root: donor_root,
            len: donor_len,
            ..
        } = self.conform(other.take());
        if donor_len == 0 {
            return;
        }
        debug!("merging a tree of {} values into a tree of {} values", donor_len, self.len);

        let (left, right) = self.absorb(donor_pool, donor_root, donor_len);
        let (root, discarded) = join::unite(&mut self.pool, left, right, self.config.duplicates);
        if discarded > 0 {
            debug!("discarded {} duplicate values while merging", discarded);
        }

        self.root = root;
        self.len = self.len + donor_len - discarded;
        self.blacken_root();
    }

    /// Returns the union of two sets. Equal values are resolved with the duplicate policy of
    /// `left`. The `+` operator is implemented to take the union of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let n: RedBlackSet<u32> = vec![1, 2].into_iter().collect();
    /// let m: RedBlackSet<u32> = vec![2, 3].into_iter().collect();
    ///
    /// let union = RedBlackSet::union(n, m);
    /// assert_eq!(union.iter().collect::<Vec<&u32>>(), vec![&1, &2, &2, &3]);
    /// ```
    pub fn union(mut left: Self, mut right: Self) -> Self
    where
        T: Ord,
    {
        left.merge(&mut right);
        left
    }

    /// Splits the set around `key`. Returns a set with every value less than `key`, one value
    /// equal to `key` if the set holds any, and a set with every remaining value. Both sets keep
    /// the configuration of the original set.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (0..10).collect();
    /// let (left, middle, right) = set.split(&4);
    ///
    /// assert_eq!(left.iter().collect::<Vec<&u32>>(), vec![&0, &1, &2, &3]);
    /// assert_eq!(middle, Some(4));
    /// assert_eq!(right.iter().collect::<Vec<&u32>>(), vec![&5, &6, &7, &8, &9]);
    /// ```
    pub fn split(mut self, key: &T) -> (Self, Option<T>, Self)
    where
        T: Ord,
    {
        debug!("splitting a tree of {} values", self.len);
        let root = self.root.take();
        let Split { left, right, .. } = join::split(&mut self.pool, root, Pivot::Key(key), false);

        let mut upper = self.empty_like();
        let (upper_root, upper_len) =
            join::transplant(&mut upper.pool, &mut self.pool, right, None);
        upper.root = upper_root;
        upper.len = upper_len;
        upper.blacken_root();

        self.root = left;
        self.len -= upper_len;
        self.blacken_root();

        let mut matched = None;
        if let Some(root) = upper.root {
            let min = tree::extreme(&upper.pool, root, Direction::Left);
            if upper.pool[min].value == *key {
                matched = Some(tree::unlink(&mut upper.pool, &mut upper.root, min));
                upper.len -= 1;
            }
        }
        (self, matched, upper)
    }

    /// Joins `right` onto the end of the set with `key` in between, leaving `right` empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfOrder` and leaves both sets untouched unless every value of the set
    /// is less than `key` and `key` is less than every value of `right`. Equality is accepted
    /// when the set allows duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_join::error::Error;
    /// use red_black_join::red_black_tree::RedBlackSet;
    ///
    /// let mut n: RedBlackSet<u32> = vec![1, 2].into_iter().collect();
    /// let mut m: RedBlackSet<u32> = vec![4, 5].into_iter().collect();
    ///
    /// assert_eq!(n.join(3, &mut m), Ok(()));
    /// assert_eq!(n.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3, &4, &5]);
    /// assert!(m.is_empty());
    ///
    /// let mut o: RedBlackSet<u32> = vec![0].into_iter().collect();
    /// assert_eq!(n.join(6, &mut o), Err(Error::OutOfOrder));
    /// ```
    pub fn join(&mut self, key: T, right: &mut Self) -> Result<()>
    where
        T: Ord,
    {
        let strict = self.config.duplicates != DuplicatePolicy::Allow;
        let ordered = |lower: &T, upper: &T| lower < upper || (!strict && lower == upper);
        let below = self.max().map_or(true, |max| ordered(max, &key));
        let above = right.min().map_or(true, |min| ordered(&key, min));
        if !below || !above {
            return Err(Error::OutOfOrder);
        }
        debug!("joining trees of {} and {} values", self.len, right.len);

        let RedBlackSet {
            pool: donor_pool,
            root: donor_root,
            len: donor_len,
            ..
        } = self.conform(right.take());
        let (left_root, right_root) = self.absorb(donor_pool, donor_root, donor_len);
        let separator = self.pool.allocate(Node::new(key));
        self.root = Some(join::join(&mut self.pool, left_root, separator, right_root));
        self.len += donor_len + 1;
        self.blacken_root();
        Ok(())
    }
}

impl<T> Default for RedBlackSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RedBlackSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> PartialEq for RedBlackSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T> Eq for RedBlackSet<T> where T: Eq {}

impl<T> Extend<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> FromIterator<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = RedBlackSet::new();
        set.extend(iter);
        set
    }
}

impl<T> Add for RedBlackSet<T>
where
    T: Ord,
{
    type Output = RedBlackSet<T>;

    fn add(self, other: RedBlackSet<T>) -> RedBlackSet<T> {
        Self::union(self, other)
    }
}

impl<T> IntoIterator for RedBlackSet<T> {
    type IntoIter = RedBlackSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        let mut iter = RedBlackSetIntoIter {
            pool: self.pool,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }
}

impl<'a, T> IntoIterator for &'a RedBlackSet<T>
where
    T: 'a,
{
    type IntoIter = RedBlackSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields owned values.
pub struct RedBlackSetIntoIter<T> {
    pool: Pool<T>,
    stack: Vec<Entry>,
}

impl<T> RedBlackSetIntoIter<T> {
    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(entry) = link {
            self.stack.push(entry);
            link = self.pool[entry].left();
        }
    }
}

impl<T> Iterator for RedBlackSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        let node = self.pool.free(entry);
        let right = node.right();
        self.push_left_spine(right);
        Some(node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pool.len(), Some(self.pool.len()))
    }
}

/// An iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references. It
/// can also be consumed from the back.
pub struct RedBlackSetIter<'a, T> {
    pool: &'a Pool<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, T> Iterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pool = self.pool;
        let entry = self.front?;
        self.front = tree::neighbor(pool, entry, Direction::Right);
        self.remaining -= 1;
        Some(&pool[entry].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pool = self.pool;
        let entry = self.back?;
        self.back = tree::neighbor(pool, entry, Direction::Left);
        self.remaining -= 1;
        Some(&pool[entry].value)
    }
}

impl<'a, T> ExactSizeIterator for RedBlackSetIter<'a, T> where T: 'a {}

#[cfg(test)]
mod tests {
    use super::RedBlackSet;
    use crate::config::{DuplicatePolicy, TreeConfig};
    use crate::error::Error;
    use crate::red_black_tree::Color;
    use std::cmp::Ordering;

    const B: Color = Color::Black;
    const R: Color = Color::Red;

    fn from_values(values: &[u32]) -> RedBlackSet<u32> {
        values.iter().cloned().collect()
    }

    fn preorder(set: &RedBlackSet<u32>) -> Vec<(u32, Color)> {
        set.preorder()
            .into_iter()
            .map(|(value, color)| (*value, color))
            .collect()
    }

    #[derive(Debug)]
    struct Keyed(u32, &'static str);

    impl PartialEq for Keyed {
        fn eq(&self, other: &Keyed) -> bool {
            self.0 == other.0
        }
    }

    impl Eq for Keyed {}

    impl PartialOrd for Keyed {
        fn partial_cmp(&self, other: &Keyed) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Keyed {
        fn cmp(&self, other: &Keyed) -> Ordering {
            self.0.cmp(&other.0)
        }
    }

    fn keyed_set(policy: DuplicatePolicy, values: Vec<Keyed>) -> RedBlackSet<Keyed> {
        let mut set = RedBlackSet::with_config(TreeConfig::new().duplicates(policy));
        set.extend(values);
        set
    }

    #[test]
    fn test_len_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.len(), 0);
        assert_eq!(set.preorder(), vec![]);
    }

    #[test]
    fn test_is_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut set = RedBlackSet::new();
        assert_eq!(set.insert(42), None);
        assert!(set.contains(&42));
        assert_eq!(preorder(&set), vec![(42, B)]);
    }

    #[test]
    fn test_insert_increasing_order() {
        let set = from_values(&[1, 2, 3, 4, 5]);
        assert_eq!(preorder(&set), vec![(2, B), (1, B), (4, B), (3, R), (5, R)]);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_insert_decreasing_order() {
        let set = from_values(&[5, 4, 3, 2, 1]);
        assert_eq!(preorder(&set), vec![(4, B), (2, B), (1, R), (3, R), (5, B)]);
    }

    #[test]
    fn test_insert_random_order() {
        let set = from_values(&[10, 20, 30, 15]);
        assert_eq!(preorder(&set), vec![(20, B), (10, B), (15, R), (30, B)]);
    }

    #[test]
    fn test_insert_with_rotations() {
        let set = from_values(&[10, 20, 30]);
        assert_eq!(preorder(&set), vec![(20, B), (10, R), (30, R)]);
    }

    #[test]
    fn test_insert_duplicates() {
        let set = from_values(&[10, 10]);
        assert_eq!(preorder(&set), vec![(10, B), (10, R)]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_large_number() {
        let set: RedBlackSet<u32> = (1..=100).collect();
        assert_eq!(set.len(), 100);
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_insert_reject() {
        let mut set = keyed_set(DuplicatePolicy::Reject, vec![Keyed(1, "a")]);
        let rejected = set.insert(Keyed(1, "b")).unwrap();
        assert_eq!(rejected.1, "b");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&Keyed(1, "")).unwrap().1, "a");
    }

    #[test]
    fn test_insert_replace() {
        let mut set = keyed_set(DuplicatePolicy::Replace, vec![Keyed(1, "a")]);
        let replaced = set.insert(Keyed(1, "b")).unwrap();
        assert_eq!(replaced.1, "a");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&Keyed(1, "")).unwrap().1, "b");
    }

    #[test]
    fn test_remove() {
        let mut set = from_values(&[10, 20, 30]);
        assert_eq!(set.remove(&20), Some(20));
        assert_eq!(preorder(&set), vec![(30, B), (10, R)]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&20));
    }

    #[test]
    fn test_remove_absent() {
        let mut set = from_values(&[5, 1, 9, 3, 7]);
        let before = preorder(&set);
        assert_eq!(set.remove(&4), None);
        assert_eq!(preorder(&set), before);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_remove_duplicate() {
        let mut set = from_values(&[2, 1, 2, 3, 2]);
        assert_eq!(set.remove(&2), Some(2));
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &2, &2, &3]);
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_min_max() {
        let set = from_values(&[1, 3, 5]);
        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_floor_ceil() {
        let set = from_values(&[1, 3, 5]);

        assert_eq!(set.floor(&0), None);
        assert_eq!(set.floor(&2), Some(&1));
        assert_eq!(set.floor(&4), Some(&3));
        assert_eq!(set.floor(&6), Some(&5));

        assert_eq!(set.ceil(&0), Some(&1));
        assert_eq!(set.ceil(&2), Some(&3));
        assert_eq!(set.ceil(&4), Some(&5));
        assert_eq!(set.ceil(&6), None);
    }

    #[test]
    fn test_clear() {
        let mut set = from_values(&[1, 2, 3]);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.min(), None);
        set.insert(4);
        assert_eq!(preorder(&set), vec![(4, B)]);
    }

    #[test]
    fn test_merge() {
        let mut set = from_values(&[10, 20, 30]);
        let mut other = from_values(&[15, 25, 5]);
        set.merge(&mut other);

        assert_eq!(set.len(), 6);
        assert_eq!(
            preorder(&set),
            vec![(15, B), (5, B), (10, R), (25, B), (20, R), (30, R)],
        );
        assert!(other.is_empty());
        assert_eq!(other.validate(), Ok(()));
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_merge_empty() {
        let mut set = from_values(&[1, 2, 3]);
        let before = preorder(&set);
        let mut other = RedBlackSet::new();
        set.merge(&mut other);
        assert_eq!(preorder(&set), before);

        let mut empty = RedBlackSet::new();
        empty.merge(&mut set);
        assert_eq!(preorder(&empty), before);
        assert!(set.is_empty());
    }

    #[test]
    fn test_merge_larger_donor() {
        let mut set = from_values(&[50]);
        let mut other: RedBlackSet<u32> = (0..40).collect();
        set.merge(&mut other);
        assert_eq!(set.len(), 41);
        assert_eq!(set.validate(), Ok(()));
        assert_eq!(set.max(), Some(&50));

        // the donor is still usable
        other.insert(7);
        assert_eq!(other.len(), 1);
        assert_eq!(other.validate(), Ok(()));
    }

    #[test]
    fn test_merge_reject() {
        let mut set = keyed_set(DuplicatePolicy::Reject, vec![Keyed(1, "a"), Keyed(2, "a")]);
        let mut other = keyed_set(DuplicatePolicy::Allow, vec![Keyed(2, "b"), Keyed(3, "b")]);
        set.merge(&mut other);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(&Keyed(2, "")).unwrap().1, "a");
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_merge_replace() {
        let mut set = keyed_set(DuplicatePolicy::Replace, vec![Keyed(1, "a"), Keyed(2, "a")]);
        let mut other = keyed_set(DuplicatePolicy::Allow, vec![Keyed(2, "b"), Keyed(3, "b")]);
        set.merge(&mut other);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(&Keyed(2, "")).unwrap().1, "b");
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_merge_reject_removes_donor_duplicates() {
        let config = TreeConfig::new().duplicates(DuplicatePolicy::Reject);
        let mut set = RedBlackSet::with_config(config);
        set.insert(1);
        let mut other = from_values(&[2, 2]);
        set.merge(&mut other);

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &2]);
        assert_eq!(set.validate(), Ok(()));
        assert!(other.is_empty());
    }

    #[test]
    fn test_merge_replace_keeps_last_donor_duplicate() {
        let mut set = keyed_set(DuplicatePolicy::Replace, vec![Keyed(2, "a")]);
        let mut other = keyed_set(
            DuplicatePolicy::Allow,
            vec![Keyed(1, "b"), Keyed(2, "b"), Keyed(2, "c"), Keyed(1, "c")],
        );
        set.merge(&mut other);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&Keyed(1, "")).unwrap().1, "c");
        assert_eq!(set.get(&Keyed(2, "")).unwrap().1, "c");
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_join_reject_removes_right_duplicates() {
        let config = TreeConfig::new().duplicates(DuplicatePolicy::Reject);
        let mut left = RedBlackSet::with_config(config);
        left.insert(1);
        let mut right = from_values(&[3, 3, 4, 4, 4]);
        assert_eq!(left.join(2, &mut right), Ok(()));

        assert_eq!(left.len(), 4);
        assert_eq!(left.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3, &4]);
        assert_eq!(left.validate(), Ok(()));
        assert!(right.is_empty());
    }

    #[test]
    fn test_merge_allow_keeps_donor_duplicates() {
        let mut set = from_values(&[1]);
        let mut other = from_values(&[2, 2]);
        set.merge(&mut other);
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &2, &2]);
    }

    #[test]
    fn test_union() {
        let union = from_values(&[1, 3, 5]) + from_values(&[2, 3, 4]);
        assert_eq!(
            union.iter().collect::<Vec<&u32>>(),
            vec![&1, &2, &3, &3, &4, &5],
        );
        assert_eq!(union.len(), 6);
    }

    #[test]
    fn test_split() {
        let set: RedBlackSet<u32> = (0..32).collect();
        let (left, middle, right) = set.split(&10);
        assert_eq!(middle, Some(10));
        assert_eq!(left.iter().cloned().collect::<Vec<u32>>(), (0..10).collect::<Vec<u32>>());
        assert_eq!(right.iter().cloned().collect::<Vec<u32>>(), (11..32).collect::<Vec<u32>>());
        assert_eq!(left.validate(), Ok(()));
        assert_eq!(right.validate(), Ok(()));
    }

    #[test]
    fn test_split_absent_key() {
        let set = from_values(&[10, 20, 30]);
        let (left, middle, right) = set.split(&25);
        assert_eq!(middle, None);
        assert_eq!(left.iter().collect::<Vec<&u32>>(), vec![&10, &20]);
        assert_eq!(right.iter().collect::<Vec<&u32>>(), vec![&30]);
    }

    #[test]
    fn test_split_duplicates() {
        let set = from_values(&[2, 1, 2, 3, 2]);
        let (left, middle, right) = set.split(&2);
        assert_eq!(left.iter().collect::<Vec<&u32>>(), vec![&1]);
        assert_eq!(middle, Some(2));
        assert_eq!(right.iter().collect::<Vec<&u32>>(), vec![&2, &2, &3]);
        assert_eq!(right.validate(), Ok(()));
    }

    #[test]
    fn test_split_join() {
        let set: RedBlackSet<u32> = (0..100).map(|i| (i * 7) % 100).collect();
        let (mut left, middle, mut right) = set.split(&42);
        assert_eq!(left.join(middle.unwrap(), &mut right), Ok(()));
        assert_eq!(left.len(), 100);
        assert_eq!(left.validate(), Ok(()));
        assert_eq!(right.validate(), Ok(()));
        assert_eq!(left.iter().cloned().collect::<Vec<u32>>(), (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn test_join_out_of_order() {
        let mut left = from_values(&[1, 5]);
        let mut right = from_values(&[3]);
        assert_eq!(left.join(4, &mut right), Err(Error::OutOfOrder));
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 1);

        let mut right = from_values(&[3]);
        assert_eq!(left.join(2, &mut right), Err(Error::OutOfOrder));
    }

    #[test]
    fn test_join_equal_separator() {
        let mut left = from_values(&[1, 2]);
        let mut right = from_values(&[2, 3]);
        assert_eq!(left.join(2, &mut right), Ok(()));
        assert_eq!(left.iter().collect::<Vec<&u32>>(), vec![&1, &2, &2, &2, &3]);

        let config = TreeConfig::new().duplicates(DuplicatePolicy::Reject);
        let mut left = RedBlackSet::with_config(config.clone());
        left.extend(vec![1, 2]);
        let mut right = RedBlackSet::with_config(config);
        right.extend(vec![3]);
        assert_eq!(left.join(2, &mut right), Err(Error::OutOfOrder));
    }

    #[test]
    fn test_join_empty() {
        let mut left = RedBlackSet::new();
        let mut right = RedBlackSet::new();
        assert_eq!(left.join(1, &mut right), Ok(()));
        assert_eq!(preorder(&left), vec![(1, B)]);
    }

    #[test]
    fn test_into_iter() {
        let set = from_values(&[1, 5, 3]);
        assert_eq!(set.into_iter().collect::<Vec<u32>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_iter() {
        let set = from_values(&[1, 5, 3]);
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
        assert_eq!(set.iter().len(), 3);
    }

    #[test]
    fn test_iter_rev() {
        let set = from_values(&[1, 5, 3, 4]);
        assert_eq!(set.iter().rev().collect::<Vec<&u32>>(), vec![&5, &4, &3, &1]);

        let mut iter = set.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_debug() {
        let set = from_values(&[2, 1]);
        assert_eq!(format!("{:?}", set), "{1, 2}");
    }

    #[test]
    fn test_black_height() {
        assert_eq!(from_values(&[]).black_height(), 0);
        assert_eq!(from_values(&[1, 2, 3, 4, 5]).black_height(), 2);
    }
}
