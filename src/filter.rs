//! Node predicates for descendant queries.

use std::collections::HashSet;

use crate::node::{Node, NodeId};

/// Predicate deciding whether a node is part of a query result.
pub trait NodeFilter: Send + Sync {
    fn accept(&self, node: &Node) -> bool;
}

impl<F> NodeFilter for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn accept(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Default filter, accepts every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl NodeFilter for AcceptAll {
    fn accept(&self, _node: &Node) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeafOnly;

impl NodeFilter for LeafOnly {
    fn accept(&self, node: &Node) -> bool {
        node.is_leaf()
    }
}

/// Rejects a fixed set of ids.
#[derive(Debug, Clone, Default)]
pub struct ExcludeIds(HashSet<NodeId>);

impl ExcludeIds {
    pub fn new(ids: impl IntoIterator<Item = NodeId>) -> Self {
        Self(ids.into_iter().collect())
    }
}

impl NodeFilter for ExcludeIds {
    fn accept(&self, node: &Node) -> bool {
        !self.0.contains(&node.id())
    }
}
