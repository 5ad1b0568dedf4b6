use crate::arena::Entry;
use crate::error::{fatal, InvariantViolation};
use crate::red_black_tree::node::{attach, is_black, is_red, Color, Direction, Link, Node, Pool};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

fn expect_child<T>(pool: &Pool<T>, entry: Entry, dir: Direction) -> Entry {
    match pool[entry].child(dir) {
        Some(child) => child,
        None => fatal(InvariantViolation::MissingChild(dir)),
    }
}

/// Rotates the subtree rooted at `entry` in direction `dir`: the child opposite `dir` takes the
/// place of `entry`, which becomes that child's `dir` child. Returns the promoted node.
///
/// The parent of `entry`, if any, is relinked to the promoted node. A caller holding a root link
/// must update it when the promoted node ends up without a parent.
pub fn rotate<T>(pool: &mut Pool<T>, entry: Entry, dir: Direction) -> Entry {
    let promoted = expect_child(pool, entry, dir.opposite());
    let parent = pool[entry].parent;
    let inner = pool[promoted].child(dir);

    attach(pool, entry, dir.opposite(), inner);
    attach(pool, promoted, dir, Some(entry));
    pool[promoted].parent = parent;

    if let Some(parent) = parent {
        let side = pool[parent].side_of(entry);
        *pool[parent].child_mut(side) = Some(promoted);
    }

    promoted
}

fn rotate_root<T>(pool: &mut Pool<T>, root: &mut Link, entry: Entry, dir: Direction) -> Entry {
    let promoted = rotate(pool, entry, dir);
    if pool[promoted].parent.is_none() {
        *root = Some(promoted);
    }
    promoted
}

fn fix_insert<T>(pool: &mut Pool<T>, root: &mut Link, mut entry: Entry) {
    while let Some(parent) = pool[entry].parent {
        if pool[entry].color == Color::Black || pool[parent].color == Color::Black {
            break;
        }
        // a red parent is never the root
        let grandparent = match pool[parent].parent {
            Some(grandparent) => grandparent,
            None => break,
        };

        let parent_dir = pool[grandparent].side_of(parent);
        let uncle = pool[grandparent]
            .child(parent_dir.opposite())
            .filter(|&uncle| pool[uncle].color == Color::Red);

        if let Some(uncle) = uncle {
            pool[grandparent].color = Color::Red;
            pool[parent].color = Color::Black;
            pool[uncle].color = Color::Black;
            entry = grandparent;
            continue;
        }

        let mut parent = parent;
        if pool[parent].side_of(entry) != parent_dir {
            rotate_root(pool, root, parent, parent_dir);
            parent = entry;
        }
        rotate_root(pool, root, grandparent, parent_dir.opposite());
        pool[parent].color = Color::Black;
        pool[grandparent].color = Color::Red;
        break;
    }

    if let Some(root) = *root {
        pool[root].color = Color::Black;
    }
}

/// Inserts `value` as a red leaf, placing it after any equal values, and rebalances. Returns the
/// entry of the new node.
pub fn insert<T>(pool: &mut Pool<T>, root: &mut Link, value: T) -> Entry
where
    T: Ord,
{
    let new_entry = pool.allocate(Node::new(value));

    let mut parent = None;
    let mut dir = Direction::Left;
    let mut curr = *root;
    while let Some(entry) = curr {
        parent = Some(entry);
        dir = if pool[new_entry].value < pool[entry].value {
            Direction::Left
        } else {
            Direction::Right
        };
        curr = pool[entry].child(dir);
    }

    match parent {
        Some(parent) => attach(pool, parent, dir, Some(new_entry)),
        None => *root = Some(new_entry),
    }

    fix_insert(pool, root, new_entry);
    new_entry
}

/// Returns the deepest node whose value equals `key`. When the tree holds several equal values
/// this is the last of them in order.
pub fn search<T, V>(pool: &Pool<T>, root: Link, key: &V) -> Link
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = root;
    let mut ret = None;
    while let Some(entry) = curr {
        let node = &pool[entry];
        curr = match key.cmp(node.value.borrow()) {
            Ordering::Less => node.left(),
            Ordering::Equal => {
                ret = Some(entry);
                node.right()
            },
            Ordering::Greater => node.right(),
        };
    }
    ret
}

/// Follows `dir` children from `entry` until there are none left.
pub fn extreme<T>(pool: &Pool<T>, mut entry: Entry, dir: Direction) -> Entry {
    while let Some(child) = pool[entry].child(dir) {
        entry = child;
    }
    entry
}

/// Returns the in-order successor of `entry` for `Direction::Right` and the in-order predecessor
/// for `Direction::Left`.
pub fn neighbor<T>(pool: &Pool<T>, entry: Entry, dir: Direction) -> Link {
    if let Some(child) = pool[entry].child(dir) {
        return Some(extreme(pool, child, dir.opposite()));
    }
    let mut curr = entry;
    while let Some(parent) = pool[curr].parent {
        if pool[parent].side_of(curr) != dir {
            return Some(parent);
        }
        curr = parent;
    }
    None
}

pub fn floor<'a, T, V>(pool: &'a Pool<T>, root: Link, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = root;
    let mut ret = None;
    while let Some(entry) = curr {
        let node = &pool[entry];
        curr = match key.cmp(node.value.borrow()) {
            Ordering::Less => node.left(),
            _ => {
                ret = Some(&node.value);
                node.right()
            },
        };
    }
    ret
}

pub fn ceil<'a, T, V>(pool: &'a Pool<T>, root: Link, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = root;
    let mut ret = None;
    while let Some(entry) = curr {
        let node = &pool[entry];
        curr = match key.cmp(node.value.borrow()) {
            Ordering::Greater => node.right(),
            _ => {
                ret = Some(&node.value);
                node.left()
            },
        };
    }
    ret
}

fn swap_values<T>(pool: &mut Pool<T>, first: Entry, second: Entry) {
    if let Some((first_node, second_node)) = pool.get_pair_mut(first, second) {
        mem::swap(&mut first_node.value, &mut second_node.value);
    }
}

/// Returns the node that has to be spliced out to remove the value currently held by `entry`.
/// A node with two children trades values with its in-order successor, which is returned
/// instead.
pub fn prepare_node_to_delete<T>(pool: &mut Pool<T>, entry: Entry) -> Entry {
    match (pool[entry].left(), pool[entry].right()) {
        (Some(_), Some(right)) => {
            let successor = extreme(pool, right, Direction::Left);
            swap_values(pool, entry, successor);
            successor
        },
        _ => entry,
    }
}

/// Finds the deepest node equal to `key` and prepares it for deletion. Returns `None` if no such
/// node exists, in which case the tree is untouched.
pub fn bst_prepare_to_delete<T, V>(pool: &mut Pool<T>, root: Link, key: &V) -> Link
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    search(pool, root, key).map(|entry| prepare_node_to_delete(pool, entry))
}

fn delete_fixup<T>(pool: &mut Pool<T>, root: &mut Link, mut curr: Link, mut parent: Link) {
    while curr != *root && is_black(pool, curr) {
        let parent_entry = match parent {
            Some(parent_entry) => parent_entry,
            None => break,
        };
        let dir = if pool[parent_entry].left() == curr {
            Direction::Left
        } else {
            Direction::Right
        };

        let mut sibling = expect_child(pool, parent_entry, dir.opposite());
        if pool[sibling].color == Color::Red {
            pool[sibling].color = Color::Black;
            pool[parent_entry].color = Color::Red;
            rotate_root(pool, root, parent_entry, dir);
            sibling = expect_child(pool, parent_entry, dir.opposite());
        }

        if is_black(pool, pool[sibling].left()) && is_black(pool, pool[sibling].right()) {
            pool[sibling].color = Color::Red;
            curr = Some(parent_entry);
            parent = pool[parent_entry].parent;
            continue;
        }

        if is_black(pool, pool[sibling].child(dir.opposite())) {
            let near = expect_child(pool, sibling, dir);
            pool[near].color = Color::Black;
            pool[sibling].color = Color::Red;
            rotate_root(pool, root, sibling, dir.opposite());
            sibling = expect_child(pool, parent_entry, dir.opposite());
        }

        pool[sibling].color = pool[parent_entry].color;
        pool[parent_entry].color = Color::Black;
        if let Some(far) = pool[sibling].child(dir.opposite()) {
            pool[far].color = Color::Black;
        }
        rotate_root(pool, root, parent_entry, dir);
        curr = *root;
        break;
    }

    if let Some(entry) = curr {
        pool[entry].color = Color::Black;
    }
}

/// Splices out a node with at most one child, rebalances, and returns its value.
pub fn unlink<T>(pool: &mut Pool<T>, root: &mut Link, entry: Entry) -> T {
    let parent = pool[entry].parent;
    let child = pool[entry].left().or_else(|| pool[entry].right());

    match parent {
        Some(parent) => {
            let side = pool[parent].side_of(entry);
            attach(pool, parent, side, child);
        },
        None => {
            *root = child;
            if let Some(child) = child {
                pool[child].parent = None;
            }
        },
    }

    let node = pool.free(entry);
    if node.color == Color::Black {
        delete_fixup(pool, root, child, parent);
    }
    node.value
}

/// Removes the deepest value equal to `key`. Returns `None` and leaves the tree untouched if the
/// value is absent.
pub fn remove<T, V>(pool: &mut Pool<T>, root: &mut Link, key: &V) -> Option<T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    bst_prepare_to_delete(pool, *root, key).map(|entry| unlink(pool, root, entry))
}
