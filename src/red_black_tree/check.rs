use crate::error::InvariantViolation;
use crate::red_black_tree::node::{is_red, Color, Direction, Link, Pool};

fn check_subtree<'a, T>(
    pool: &'a Pool<T>,
    link: Link,
    last: &mut Option<&'a T>,
    count: &mut usize,
) -> Result<usize, InvariantViolation>
where
    T: Ord,
{
    let entry = match link {
        Some(entry) => entry,
        None => return Ok(0),
    };
    let node = &pool[entry];
    *count += 1;

    for &dir in &[Direction::Left, Direction::Right] {
        if let Some(child) = node.child(dir) {
            if pool[child].parent != Some(entry) {
                return Err(InvariantViolation::ParentLink);
            }
            if node.color == Color::Red && pool[child].color == Color::Red {
                return Err(InvariantViolation::ConsecutiveRed);
            }
        }
    }

    let left_height = check_subtree(pool, node.left(), last, count)?;
    if let Some(prev) = *last {
        if *prev > node.value {
            return Err(InvariantViolation::Ordering);
        }
    }
    *last = Some(&node.value);
    let right_height = check_subtree(pool, node.right(), last, count)?;

    if left_height != right_height {
        return Err(InvariantViolation::BlackHeight);
    }
    match node.color {
        Color::Black => Ok(left_height + 1),
        Color::Red => Ok(left_height),
    }
}

/// Checks every red-black invariant of the tree rooted at `root`, which is expected to hold
/// `len` nodes.
pub fn validate<T>(pool: &Pool<T>, root: Link, len: usize) -> Result<(), InvariantViolation>
where
    T: Ord,
{
    if let Some(entry) = root {
        if pool[entry].parent.is_some() {
            return Err(InvariantViolation::ParentLink);
        }
    }
    if is_red(pool, root) {
        return Err(InvariantViolation::RedRoot);
    }

    let mut count = 0;
    check_subtree(pool, root, &mut None, &mut count)?;
    if count != len {
        return Err(InvariantViolation::Length {
            expected: len,
            actual: count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::error::InvariantViolation;
    use crate::red_black_tree::node::{attach, Color, Direction, Node, Pool};

    fn black(pool: &mut Pool<u32>, value: u32) -> crate::arena::Entry {
        let entry = pool.allocate(Node::new(value));
        pool[entry].color = Color::Black;
        entry
    }

    #[test]
    fn test_empty() {
        let pool: Pool<u32> = Pool::new();
        assert_eq!(validate(&pool, None, 0), Ok(()));
    }

    #[test]
    fn test_red_root() {
        let mut pool = Pool::new();
        let root = pool.allocate(Node::new(1));
        assert_eq!(validate(&pool, Some(root), 1), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_consecutive_red() {
        let mut pool = Pool::new();
        let root = black(&mut pool, 2);
        let left = pool.allocate(Node::new(1));
        let right = black(&mut pool, 3);
        let grandchild = pool.allocate(Node::new(0));
        attach(&mut pool, root, Direction::Left, Some(left));
        attach(&mut pool, root, Direction::Right, Some(right));
        pool[right].color = Color::Red;
        attach(&mut pool, left, Direction::Left, Some(grandchild));
        assert_eq!(
            validate(&pool, Some(root), 4),
            Err(InvariantViolation::ConsecutiveRed),
        );
    }

    #[test]
    fn test_black_height() {
        let mut pool = Pool::new();
        let root = black(&mut pool, 2);
        let left = black(&mut pool, 1);
        attach(&mut pool, root, Direction::Left, Some(left));
        assert_eq!(validate(&pool, Some(root), 2), Err(InvariantViolation::BlackHeight));
    }

    #[test]
    fn test_ordering() {
        let mut pool = Pool::new();
        let root = black(&mut pool, 2);
        let left = pool.allocate(Node::new(3));
        attach(&mut pool, root, Direction::Left, Some(left));
        assert_eq!(validate(&pool, Some(root), 2), Err(InvariantViolation::Ordering));
    }

    #[test]
    fn test_parent_link() {
        let mut pool = Pool::new();
        let root = black(&mut pool, 2);
        let left = pool.allocate(Node::new(1));
        attach(&mut pool, root, Direction::Left, Some(left));
        pool[left].parent = None;
        assert_eq!(validate(&pool, Some(root), 2), Err(InvariantViolation::ParentLink));
    }

    #[test]
    fn test_length() {
        let mut pool = Pool::new();
        let root = black(&mut pool, 2);
        assert_eq!(
            validate(&pool, Some(root), 3),
            Err(InvariantViolation::Length {
                expected: 3,
                actual: 1,
            }),
        );
    }
}
