//! Read-only navigation over a [`Tree`].
//!
//! Every query resolves ids through the store one lookup at a time. Absence of a
//! node, a broken link or an unresolvable child is never an error: it shows up as
//! `None` or is skipped. Queries that perform several lookups are not atomic with
//! respect to concurrent mutation; take a [`Tree::subtree`] snapshot first when a
//! consistent view across calls is needed.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{instrument, trace};

use crate::filter::{AcceptAll, NodeFilter};
use crate::node::{Node, NodeId};
use crate::tree::Tree;

impl Tree {
    pub fn get_node(&self, id: NodeId) -> Option<Arc<Node>> {
        self.store().get(id)
    }

    /// Parent of `id`; None for the root or when either lookup fails.
    pub fn get_parent_node(&self, id: NodeId) -> Option<Arc<Node>> {
        let node = self.get_node(id)?;
        self.get_node(node.parent_id()?)
    }

    pub fn get_root_node(&self) -> Option<Arc<Node>> {
        self.get_node(self.root_id()?)
    }

    /// Children of `id` in sibling order, skipping ids that no longer resolve.
    ///
    /// None when `id` itself does not resolve.
    #[instrument(level = "trace", skip(self))]
    pub fn get_child_nodes(&self, id: NodeId) -> Option<Vec<Arc<Node>>> {
        let node = self.get_node(id)?;
        Some(self.resolve_all(node.child_ids()))
    }

    /// The other children of `id`'s parent, in sibling order.
    ///
    /// None for the root, or when the node or its parent cannot be resolved.
    #[instrument(level = "trace", skip(self))]
    pub fn get_sibling_nodes(&self, id: NodeId) -> Option<Vec<Arc<Node>>> {
        if self.root_id() == Some(id) {
            return None;
        }
        let parent = self.get_parent_node(id)?;
        let siblings = parent
            .child_ids()
            .iter()
            .filter(|&&child_id| child_id != id)
            .filter_map(|&child_id| self.get_node(child_id))
            .collect();
        Some(siblings)
    }

    /// Leaves of the whole tree, or of the subtree below `id` when given.
    ///
    /// Without `id` the order follows store enumeration and is not stable; with
    /// `id` it is depth-first order. An unresolvable `id` yields no leaves.
    #[instrument(level = "debug", skip(self))]
    pub fn get_leaf_nodes(&self, id: Option<NodeId>) -> Vec<Arc<Node>> {
        match id {
            None => self.store().collect_where(Node::is_leaf),
            Some(id) => self
                .depth_first_traversal(id)
                .filter_map(|nid| self.get_node(nid))
                .filter(|node| node.is_leaf())
                .collect(),
        }
    }

    pub fn get_all_nodes(&self) -> Vec<Arc<Node>> {
        let mut nodes = Vec::with_capacity(self.len());
        self.store().iterate(|_, node| {
            nodes.push(Arc::clone(node));
            ControlFlow::Continue(())
        });
        nodes
    }

    /// `id` and all of its descendants accepted by `filter` (default: all).
    ///
    /// Scans a [`Tree::subtree`] snapshot, so the result is internally consistent.
    /// None when `id` does not resolve.
    #[instrument(level = "debug", skip(self, filter))]
    pub fn get_descendant_nodes(
        &self,
        id: NodeId,
        filter: Option<&dyn NodeFilter>,
    ) -> Option<Vec<Arc<Node>>> {
        let subtree = self.subtree(id)?;
        let filter = filter.unwrap_or(&AcceptAll);
        Some(subtree.store().collect_where(|node| filter.accept(node)))
    }

    /// Ancestor of `id` whose absolute depth equals `level`.
    ///
    /// `level == 0` is a shortcut for the direct parent. Otherwise the ancestor
    /// must be strictly shallower than `id`; the walk goes upward from the parent,
    /// recomputing each ancestor's depth, and gives up at depth 0 or on a broken link.
    #[instrument(level = "trace", skip(self))]
    pub fn get_ancestor_node(&self, id: NodeId, level: usize) -> Option<Arc<Node>> {
        if self.root_id() == Some(id) {
            return None;
        }
        let node = self.get_node(id)?;
        let mut ancestor = self.get_node(node.parent_id()?)?;

        if level == 0 {
            return Some(ancestor);
        }

        let descendant_level = self.level(id)?;
        if level >= descendant_level {
            trace!(id, level, descendant_level, "no ancestor at requested level");
            return None;
        }

        let mut ancestor_level = self.level(ancestor.id())?;
        loop {
            if ancestor_level == level {
                return Some(ancestor);
            }
            if ancestor_level == 0 {
                return None;
            }
            ancestor = self.get_node(ancestor.parent_id()?)?;
            ancestor_level = self.level(ancestor.id())?;
        }
    }

    fn resolve_all(&self, ids: &[NodeId]) -> Vec<Arc<Node>> {
        ids.iter().filter_map(|&id| self.get_node(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::LeafOnly;

    fn ids(nodes: &[Arc<Node>]) -> Vec<NodeId> {
        let mut ids: Vec<_> = nodes.iter().map(|n| n.id()).collect();
        ids.sort();
        ids
    }

    // 1
    // ├── 2
    // │   └── 4
    // └── 3
    fn sample() -> Tree {
        let tree = Tree::with_root(1);
        tree.add_node(2, 1).unwrap();
        tree.add_node(3, 1).unwrap();
        tree.add_node(4, 2).unwrap();
        tree
    }

    #[test]
    fn given_root_when_getting_parent_then_none() {
        let tree = sample();
        assert!(tree.get_parent_node(1).is_none());
        assert_eq!(tree.get_parent_node(4).map(|n| n.id()), Some(2));
        assert_eq!(tree.get_root_node().map(|n| n.id()), Some(1));
    }

    #[test]
    fn given_unknown_id_when_navigating_then_absent() {
        let tree = sample();
        assert!(tree.get_node(99).is_none());
        assert!(tree.get_parent_node(99).is_none());
        assert!(tree.get_child_nodes(99).is_none());
        assert!(tree.get_sibling_nodes(99).is_none());
        assert!(tree.get_descendant_nodes(99, None).is_none());
        assert!(tree.get_ancestor_node(99, 0).is_none());
        assert!(tree.get_leaf_nodes(Some(99)).is_empty());
    }

    #[test]
    fn given_node_when_getting_siblings_then_excludes_itself() {
        let tree = sample();
        assert_eq!(ids(&tree.get_sibling_nodes(2).unwrap()), vec![3]);
        assert_eq!(ids(&tree.get_sibling_nodes(4).unwrap()), Vec::<NodeId>::new());
        assert!(tree.get_sibling_nodes(1).is_none());
    }

    #[test]
    fn given_id_when_getting_leaves_then_restricted_to_subtree() {
        let tree = sample();
        assert_eq!(ids(&tree.get_leaf_nodes(None)), vec![3, 4]);
        assert_eq!(ids(&tree.get_leaf_nodes(Some(2))), vec![4]);
    }

    #[test]
    fn given_filter_when_getting_descendants_then_applies_it() {
        let tree = sample();
        assert_eq!(ids(&tree.get_descendant_nodes(2, None).unwrap()), vec![2, 4]);
        assert_eq!(ids(&tree.get_descendant_nodes(1, Some(&LeafOnly)).unwrap()), vec![3, 4]);

        let over_two = |node: &Node| node.id() > 2;
        assert_eq!(ids(&tree.get_descendant_nodes(1, Some(&over_two)).unwrap()), vec![3, 4]);
    }

    #[test]
    fn given_deep_node_when_getting_ancestor_then_matches_absolute_level() {
        let tree = sample();
        tree.add_node(5, 4).unwrap();

        assert_eq!(tree.get_ancestor_node(5, 0).map(|n| n.id()), Some(4));
        assert_eq!(tree.get_ancestor_node(5, 1).map(|n| n.id()), Some(2));
        assert_eq!(tree.get_ancestor_node(5, 2).map(|n| n.id()), Some(4));
        assert!(tree.get_ancestor_node(5, 3).is_none());
        assert!(tree.get_ancestor_node(1, 0).is_none());
    }
}
