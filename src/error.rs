use crate::red_black_tree::Direction;
use log::error;
use std::error;
use std::fmt;
use std::result;

/// Recoverable errors returned by tree operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The separator passed to a join does not lie between the two trees being joined.
    OutOfOrder,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfOrder => write!(f, "separator does not lie between the joined trees"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// A broken red-black tree invariant or internal precondition.
///
/// `RedBlackSet::validate` reports these for inspection. Internally they are never recovered
/// from: hitting one while rebalancing aborts the operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// A red node has a red child.
    ConsecutiveRed,
    /// Two paths from the same node reach absent children through different numbers of black
    /// nodes.
    BlackHeight,
    /// An in-order traversal is not sorted.
    Ordering,
    /// A child does not point back at its parent, or the root has a parent.
    ParentLink,
    /// The stored length differs from the number of reachable nodes.
    Length { expected: usize, actual: usize },
    /// A rotation or fixup required a child that is absent.
    MissingChild(Direction),
}

impl error::Error for InvariantViolation {}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::RedRoot => write!(f, "root is red"),
            InvariantViolation::ConsecutiveRed => write!(f, "red node has a red child"),
            InvariantViolation::BlackHeight => write!(f, "black heights differ"),
            InvariantViolation::Ordering => write!(f, "keys are out of order"),
            InvariantViolation::ParentLink => write!(f, "parent link is inconsistent"),
            InvariantViolation::Length { expected, actual } => {
                write!(f, "expected {} nodes, found {}", expected, actual)
            },
            InvariantViolation::MissingChild(dir) => write!(f, "expected {:?} child to exist", dir),
        }
    }
}

pub(crate) fn fatal(violation: InvariantViolation) -> ! {
    error!("{}", violation);
    panic!("Error: {}.", violation);
}
