use crate::arena::Entry;
use crate::config::DuplicatePolicy;
use crate::error::{fatal, InvariantViolation};
use crate::red_black_tree::node::{
    attach, detach, is_black, is_red, Color, Direction, Link, Node, Pool,
};
use crate::red_black_tree::tree;
use log::trace;
use std::cmp::Ordering;
use std::mem;

/// The key a subtree is split around: either the value of a node that lives in the same arena
/// but outside the subtree, or a borrowed key.
pub enum Pivot<'a, T> {
    Node(Entry),
    Key(&'a T),
}

impl<'a, T> Clone for Pivot<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Pivot<'a, T> {}

/// The result of splitting a subtree.
pub struct Split {
    /// Every node less than the pivot.
    pub left: Link,
    /// The node equal to the pivot, if one was extracted.
    pub matched: Link,
    /// Every other node greater than or equal to the pivot.
    pub right: Link,
}

fn compare<T>(pool: &Pool<T>, entry: Entry, pivot: Pivot<'_, T>) -> Ordering
where
    T: Ord,
{
    match pivot {
        Pivot::Node(pivot) => pool[entry].value.cmp(&pool[pivot].value),
        Pivot::Key(key) => pool[entry].value.cmp(key),
    }
}

/// Returns the number of black nodes on the left-most path from `link` to an absent child,
/// counting `link` itself.
pub fn black_height<T>(pool: &Pool<T>, link: Link) -> usize {
    let mut ret = 0;
    let mut curr = link;
    while let Some(entry) = curr {
        if pool[entry].color == Color::Black {
            ret += 1;
        }
        curr = pool[entry].left().or_else(|| pool[entry].right());
    }
    ret
}

// Walks down the `dir` spine of the taller tree until it reaches a black subtree as tall as the
// shorter tree, hangs the separator there, and repairs red-red violations on the way back up.
fn join_spine<T>(
    pool: &mut Pool<T>,
    tall: Link,
    tall_height: usize,
    separator: Entry,
    short: Link,
    short_height: usize,
    dir: Direction,
) -> Entry {
    if is_black(pool, tall) && tall_height == short_height {
        attach(pool, separator, dir.opposite(), tall);
        attach(pool, separator, dir, short);
        pool[separator].color = Color::Red;
        pool[separator].parent = None;
        return separator;
    }

    let tall = match tall {
        Some(tall) => tall,
        None => fatal(InvariantViolation::MissingChild(dir)),
    };
    let child_height = match pool[tall].color {
        Color::Black => tall_height - 1,
        Color::Red => tall_height,
    };
    let spine = pool[tall].child(dir);
    let spine = detach(pool, spine);
    let joined = join_spine(pool, spine, child_height, separator, short, short_height, dir);
    attach(pool, tall, dir, Some(joined));
    pool[tall].parent = None;

    if pool[tall].color == Color::Black && is_red(pool, Some(joined)) {
        let outer = pool[joined]
            .child(dir)
            .filter(|&outer| pool[outer].color == Color::Red);
        if let Some(outer) = outer {
            pool[outer].color = Color::Black;
            return tree::rotate(pool, tall, dir.opposite());
        }
    }
    tall
}

/// Joins `left` and `right` around `separator` when `left` has the larger black height, by
/// descending the right spine of `left`.
pub fn join_right<T>(
    pool: &mut Pool<T>,
    left: Link,
    left_height: usize,
    separator: Entry,
    right: Link,
    right_height: usize,
) -> Entry {
    join_spine(pool, left, left_height, separator, right, right_height, Direction::Right)
}

/// Joins `left` and `right` around `separator` when `right` has the larger black height, by
/// descending the left spine of `right`.
pub fn join_left<T>(
    pool: &mut Pool<T>,
    left: Link,
    left_height: usize,
    separator: Entry,
    right: Link,
    right_height: usize,
) -> Entry {
    join_spine(pool, right, right_height, separator, left, left_height, Direction::Left)
}

/// Combines two red-black trees and a separator into one red-black tree, where every value of
/// `left` is ordered before the separator and every value of `right` after it. Only the spine
/// of the taller tree down to the height of the shorter one is visited.
///
/// The returned root has no parent and may be red.
pub fn join<T>(pool: &mut Pool<T>, left: Link, separator: Entry, right: Link) -> Entry {
    let left_height = black_height(pool, left);
    let right_height = black_height(pool, right);
    trace!("joining subtrees of black heights {} and {}", left_height, right_height);

    let (root, dir) = match left_height.cmp(&right_height) {
        Ordering::Greater => (
            join_right(pool, left, left_height, separator, right, right_height),
            Direction::Right,
        ),
        Ordering::Less => (
            join_left(pool, left, left_height, separator, right, right_height),
            Direction::Left,
        ),
        Ordering::Equal => {
            attach(pool, separator, Direction::Left, left);
            attach(pool, separator, Direction::Right, right);
            pool[separator].parent = None;
            pool[separator].color = if is_black(pool, left) && is_black(pool, right) {
                Color::Red
            } else {
                Color::Black
            };
            return separator;
        },
    };

    if is_red(pool, Some(root)) && is_red(pool, pool[root].child(dir)) {
        pool[root].color = Color::Black;
    }
    root
}

/// Partitions the subtree at `link` around `pivot`, reusing its nodes as join separators. When
/// `extract` is set, the first node found equal to the pivot is taken out of both halves and
/// returned as `matched`; otherwise equal nodes go to the right half.
pub fn split<T>(pool: &mut Pool<T>, link: Link, pivot: Pivot<'_, T>, extract: bool) -> Split
where
    T: Ord,
{
    let entry = match link {
        Some(entry) => entry,
        None => {
            return Split {
                left: None,
                matched: None,
                right: None,
            }
        },
    };

    let (left, right) = (pool[entry].left(), pool[entry].right());
    let left = detach(pool, left);
    let right = detach(pool, right);
    pool[entry].parent = None;

    match compare(pool, entry, pivot) {
        Ordering::Equal if extract => {
            *pool[entry].child_mut(Direction::Left) = None;
            *pool[entry].child_mut(Direction::Right) = None;
            Split {
                left,
                matched: Some(entry),
                right,
            }
        },
        Ordering::Less => {
            let Split {
                left: lower,
                matched,
                right: upper,
            } = split(pool, right, pivot, extract);
            Split {
                left: Some(join(pool, left, entry, lower)),
                matched,
                right: upper,
            }
        },
        _ => {
            let Split {
                left: lower,
                matched,
                right: upper,
            } = split(pool, left, pivot, extract);
            Split {
                left: lower,
                matched,
                right: Some(join(pool, upper, entry, right)),
            }
        },
    }
}

/// Computes the union of the subtrees `left` and `right`, which live in the same arena. The root
/// of `right` is used as the pivot at every level.
///
/// Under `DuplicatePolicy::Allow` every node is kept. Otherwise a node of `left` equal to a
/// node of `right` is discarded; `Reject` keeps the value from `left`, `Replace` the value from
/// `right`. Returns the new root and the number of discarded nodes.
pub fn unite<T>(
    pool: &mut Pool<T>,
    left: Link,
    right: Link,
    policy: DuplicatePolicy,
) -> (Link, usize)
where
    T: Ord,
{
    let pivot = match right {
        Some(pivot) => pivot,
        None => return (left, 0),
    };
    if left.is_none() {
        return (right, 0);
    }

    let (right_left, right_right) = (pool[pivot].left(), pool[pivot].right());
    let right_left = detach(pool, right_left);
    let right_right = detach(pool, right_right);

    let extract = policy != DuplicatePolicy::Allow;
    let Split {
        left: lower,
        matched,
        right: upper,
    } = split(pool, left, Pivot::Node(pivot), extract);

    let mut discarded = 0;
    if let Some(matched) = matched {
        if policy == DuplicatePolicy::Reject {
            if let Some((matched_node, pivot_node)) = pool.get_pair_mut(matched, pivot) {
                mem::swap(&mut matched_node.value, &mut pivot_node.value);
            }
        }
        pool.free(matched);
        discarded += 1;
    }

    let (new_left, left_discarded) = unite(pool, lower, right_left, policy);
    let (new_right, right_discarded) = unite(pool, upper, right_right, policy);
    let root = join(pool, new_left, pivot, new_right);
    (Some(root), discarded + left_discarded + right_discarded)
}

/// Moves the subtree at `link` out of `donor` and into `pool`, keeping its shape and colors.
/// Returns the new root, attached below `parent`, and the number of nodes moved.
pub fn transplant<T>(
    pool: &mut Pool<T>,
    donor: &mut Pool<T>,
    link: Link,
    parent: Link,
) -> (Link, usize) {
    let entry = match link {
        Some(entry) => entry,
        None => return (None, 0),
    };

    let donor_node = donor.free(entry);
    let (left, right) = (donor_node.left(), donor_node.right());
    let color = donor_node.color;
    let mut node = Node::new(donor_node.value);
    node.parent = parent;
    node.color = color;
    let new_entry = pool.allocate(node);

    let (new_left, left_len) = transplant(pool, donor, left, Some(new_entry));
    let (new_right, right_len) = transplant(pool, donor, right, Some(new_entry));
    *pool[new_entry].child_mut(Direction::Left) = new_left;
    *pool[new_entry].child_mut(Direction::Right) = new_right;
    (Some(new_entry), left_len + right_len + 1)
}
