//! Construction-time settings for a tree.

use serde_derive::{Deserialize, Serialize};

/// How a tree treats a value that compares equal to one it already holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Keep every copy. Equal values are placed after the existing ones, so the tree behaves as
    /// a multiset.
    Allow,
    /// Keep the value already in the tree and hand the new one back.
    Reject,
    /// Store the new value in place of the existing one and hand the old one back.
    Replace,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Allow
    }
}

/// Settings a `RedBlackSet<T>` is created with.
///
/// The configuration travels with the tree: both halves of a split keep it, and a merge uses the
/// configuration of the tree being merged into.
///
/// # Examples
///
/// ```
/// use red_black_join::config::{DuplicatePolicy, TreeConfig};
/// use red_black_join::red_black_tree::RedBlackSet;
///
/// let config = TreeConfig::new().duplicates(DuplicatePolicy::Reject).capacity(64);
/// let mut set = RedBlackSet::with_config(config);
/// assert_eq!(set.insert(1), None);
/// assert_eq!(set.insert(1), Some(1));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub duplicates: DuplicatePolicy,
    /// Number of nodes to reserve room for up front.
    pub capacity: usize,
}

impl TreeConfig {
    /// Constructs the default configuration: duplicates allowed, no reserved capacity.
    pub fn new() -> Self {
        TreeConfig {
            duplicates: DuplicatePolicy::default(),
            capacity: 0,
        }
    }

    pub fn duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{DuplicatePolicy, TreeConfig};
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    fn test_default() {
        let config = TreeConfig::default();
        assert_eq!(config.duplicates, DuplicatePolicy::Allow);
        assert_eq!(config.capacity, 0);
    }

    #[test]
    fn test_builder() {
        let config = TreeConfig::new().duplicates(DuplicatePolicy::Replace).capacity(8);
        assert_eq!(config.duplicates, DuplicatePolicy::Replace);
        assert_eq!(config.capacity, 8);
    }

    #[test]
    fn test_serde_tokens() {
        let config = TreeConfig::new().duplicates(DuplicatePolicy::Reject).capacity(16);
        assert_tokens(
            &config,
            &[
                Token::Struct { name: "TreeConfig", len: 2 },
                Token::Str("duplicates"),
                Token::UnitVariant { name: "DuplicatePolicy", variant: "Reject" },
                Token::Str("capacity"),
                Token::U64(16),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_partial() {
        assert_de_tokens(
            &TreeConfig::new().capacity(4),
            &[
                Token::Struct { name: "TreeConfig", len: 1 },
                Token::Str("capacity"),
                Token::U64(4),
                Token::StructEnd,
            ],
        );
    }
}
