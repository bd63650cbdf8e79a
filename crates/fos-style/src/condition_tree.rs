//! Condition Tree
//!
//! Nested `@media` / `@supports` blocks collected across every definition
//! in a compilation unit. A node is keyed by its full path from the root;
//! registering at an existing path appends to that node, so identical
//! conditions authored in unrelated definitions end up in one at-rule.
//! Siblings keep first-registration order.

use crate::Rule;
use indexmap::IndexMap;
use std::fmt;

/// Conditional at-rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Media,
    Supports,
}

impl ConditionKind {
    /// At-keyword without the `@`
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Supports => "supports",
        }
    }
}

/// One step of a condition path.
///
/// Queries compare textually; `(a) and (b)` and `(b) and (a)` are
/// different conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub kind: ConditionKind,
    pub query: String,
}

impl Condition {
    pub fn media(query: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::Media,
            query: query.into(),
        }
    }

    pub fn supports(query: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::Supports,
            query: query.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {}", self.kind.keyword(), self.query)
    }
}

/// Condition tree node
#[derive(Debug, Clone)]
pub struct ConditionNode {
    pub condition: Condition,
    /// Merged rules, in registration order
    pub rules: Vec<Rule>,
    /// Nested conditions, in first-registration order
    pub children: IndexMap<Condition, ConditionNode>,
}

impl ConditionNode {
    fn new(condition: Condition) -> Self {
        Self {
            condition,
            rules: Vec::new(),
            children: IndexMap::new(),
        }
    }

    /// True when neither this node nor any descendant has declarations
    pub fn is_empty(&self) -> bool {
        self.rules.iter().all(|rule| rule.declarations.is_empty())
            && self.children.values().all(ConditionNode::is_empty)
    }
}

/// Accumulated conditional rules for one compilation unit
#[derive(Debug, Default)]
pub struct ConditionTree {
    roots: IndexMap<Condition, ConditionNode>,
}

impl ConditionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `rules` to the node at `path`, creating missing nodes.
    ///
    /// An empty path has no node to attach to and is ignored.
    pub fn register(&mut self, path: &[Condition], rules: Vec<Rule>) {
        let Some((first, rest)) = path.split_first() else {
            tracing::warn!("Ignoring {} rules registered without a condition", rules.len());
            return;
        };

        let mut node = self
            .roots
            .entry(first.clone())
            .or_insert_with(|| ConditionNode::new(first.clone()));
        for condition in rest {
            node = node
                .children
                .entry(condition.clone())
                .or_insert_with(|| ConditionNode::new(condition.clone()));
        }

        tracing::trace!(
            "Registered {} rules at depth {} under {}",
            rules.len(),
            path.len(),
            node.condition
        );
        node.rules.extend(rules);
    }

    /// Top-level nodes in first-registration order
    pub fn roots(&self) -> impl Iterator<Item = &ConditionNode> {
        self.roots.values()
    }

    /// Node at an exact path
    pub fn find(&self, path: &[Condition]) -> Option<&ConditionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(first)?;
        for condition in rest {
            node = node.children.get(condition)?;
        }
        Some(node)
    }

    /// Total node count
    pub fn len(&self) -> usize {
        fn count(node: &ConditionNode) -> usize {
            1 + node.children.values().map(count).sum::<usize>()
        }
        self.roots.values().map(count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Declaration, Rule};

    fn rule(selector: &str, property: &str, value: &str) -> Rule {
        Rule {
            selector: selector.to_string(),
            declarations: vec![Declaration::property(property, value)],
        }
    }

    #[test]
    fn test_identical_paths_merge() {
        let mut tree = ConditionTree::new();
        let path = [Condition::media("screen and (min-width: 768px)")];

        tree.register(&path, vec![rule(".a", "padding", "10px")]);
        tree.register(&path, vec![rule(".b", "padding", "10px")]);

        assert_eq!(tree.len(), 1);
        let node = tree.find(&path).unwrap();
        let selectors: Vec<&str> = node.rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, [".a", ".b"]);
    }

    #[test]
    fn test_sibling_order_is_first_registration() {
        let mut tree = ConditionTree::new();
        let wide = [Condition::media("(min-width: 1024px)")];
        let narrow = [Condition::media("(max-width: 600px)")];

        tree.register(&wide, vec![rule(".a", "color", "red")]);
        tree.register(&narrow, vec![rule(".a", "color", "blue")]);
        tree.register(&wide, vec![rule(".b", "color", "green")]);

        let order: Vec<&str> = tree.roots().map(|n| n.condition.query.as_str()).collect();
        assert_eq!(order, ["(min-width: 1024px)", "(max-width: 600px)"]);
    }

    #[test]
    fn test_kind_is_part_of_key() {
        let mut tree = ConditionTree::new();
        tree.register(&[Condition::media("print")], vec![]);
        tree.register(&[Condition::supports("print")], vec![]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_nested_paths() {
        let mut tree = ConditionTree::new();
        let outer = Condition::supports("(display: grid)");
        let inner = Condition::media("screen");

        tree.register(&[outer.clone(), inner.clone()], vec![rule(".a", "display", "grid")]);
        tree.register(&[inner.clone()], vec![rule(".a", "display", "block")]);

        assert_eq!(tree.len(), 3);
        assert!(tree.find(&[outer.clone()]).unwrap().rules.is_empty());
        assert_eq!(tree.find(&[outer, inner]).unwrap().rules.len(), 1);
    }

    #[test]
    fn test_textual_identity_only() {
        let mut tree = ConditionTree::new();
        tree.register(&[Condition::media("(min-width: 1px) and (hover)")], vec![]);
        tree.register(&[Condition::media("(hover) and (min-width: 1px)")], vec![]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_empty_path_ignored() {
        let mut tree = ConditionTree::new();
        tree.register(&[], vec![rule(".a", "color", "red")]);
        assert!(tree.is_empty());
    }
}
