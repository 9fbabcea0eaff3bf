use std::fmt;

use serde::Serialize;

/// Caller-assigned identity of a tree node.
pub type NodeId = i64;

/// Tree node linked to its neighbours by id only.
///
/// A node never holds references to other nodes; parent and children are
/// resolved through the [`NodeStore`](crate::store::NodeStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Immutable identity
    id: NodeId,
    /// Parent id, None for the root
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<NodeId>,
    /// Child ids in sibling order
    child_ids: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            parent_id,
            child_ids: Vec::new(),
        }
    }

    pub fn root(id: NodeId) -> Self {
        Self::new(id, None)
    }

    /// Builds a node with a prepared child list, e.g. when copying a node into a snapshot.
    pub fn with_children(id: NodeId, parent_id: Option<NodeId>, child_ids: Vec<NodeId>) -> Self {
        Self {
            id,
            parent_id,
            child_ids,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }

    pub fn is_leaf(&self) -> bool {
        self.child_ids.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub(crate) fn push_child(&mut self, child_id: NodeId) {
        if !self.child_ids.contains(&child_id) {
            self.child_ids.push(child_id);
        }
    }

    pub(crate) fn remove_child(&mut self, child_id: NodeId) {
        self.child_ids.retain(|&id| id != child_id);
    }

    pub(crate) fn set_parent(&mut self, parent_id: Option<NodeId>) {
        self.parent_id = parent_id;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_node_when_no_children_then_is_leaf() {
        let node = Node::new(2, Some(1));
        assert!(node.is_leaf());
        assert!(!node.is_root());
        assert_eq!(node.parent_id(), Some(1));
    }

    #[test]
    fn given_node_when_pushing_children_then_keeps_insertion_order_without_duplicates() {
        let mut node = Node::root(1);
        node.push_child(3);
        node.push_child(2);
        node.push_child(3);

        assert_eq!(node.child_ids(), &[3, 2]);
        assert!(!node.is_leaf());
    }

    #[test]
    fn given_node_with_children_when_removing_child_then_order_of_rest_is_kept() {
        let mut node = Node::with_children(1, None, vec![2, 3, 4]);
        node.remove_child(3);
        assert_eq!(node.child_ids(), &[2, 4]);
    }

    #[test]
    fn given_node_when_serializing_then_writes_links() {
        let node = Node::with_children(2, Some(1), vec![3, 4]);

        let rendered = toml::to_string(&node).unwrap();

        assert!(rendered.contains("id = 2"));
        assert!(rendered.contains("parent_id = 1"));
        assert!(rendered.contains("child_ids = [3, 4]"));
    }

    #[test]
    fn given_root_when_serializing_then_parent_is_omitted() {
        let rendered = toml::to_string(&Node::root(1)).unwrap();
        assert!(!rendered.contains("parent_id"));
    }
}
