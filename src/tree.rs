//! The tree handle: a root id plus a shared [`NodeStore`].
//!
//! Cloning a [`Tree`] yields another handle onto the same store and root, so a
//! tree can be handed to any number of threads. Navigation lives in
//! [`navigate`](crate::navigate), traversal in [`traverse`](crate::traverse).

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId};
use crate::store::NodeStore;

#[derive(Debug, Clone, Default)]
pub struct Tree {
    /// Id of the root node, None for empty trees
    root_id: Arc<RwLock<Option<NodeId>>>,
    /// Node storage shared by every clone of this tree
    nodes: Arc<NodeStore>,
    /// Upper bound for parent-link walks and levels descended by traversals
    max_depth: Option<usize>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(id: NodeId) -> Self {
        let tree = Self::new();
        tree.nodes.insert(Node::root(id));
        *tree.root_id.write() = Some(id);
        tree
    }

    /// Wraps an existing store. The root is whatever `root_id` says, the store is not checked.
    pub fn with_store(store: Arc<NodeStore>, root_id: Option<NodeId>) -> Self {
        Self {
            root_id: Arc::new(RwLock::new(root_id)),
            nodes: store,
            max_depth: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            root_id: Arc::new(RwLock::new(None)),
            nodes: Arc::new(NodeStore::with_shards(settings.shard_count)),
            max_depth: settings.max_depth,
        }
    }

    pub fn root_id(&self) -> Option<NodeId> {
        *self.root_id.read()
    }

    pub fn store(&self) -> &Arc<NodeStore> {
        &self.nodes
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maximum number of parent links any walk may follow before giving up.
    pub(crate) fn walk_limit(&self) -> usize {
        self.max_depth.unwrap_or_else(|| self.nodes.len())
    }

    /// Same configuration, fresh store. Used for subtree snapshots.
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            root_id: Arc::new(RwLock::new(None)),
            nodes: Arc::new(NodeStore::with_shards(self.nodes.shard_count())),
            max_depth: self.max_depth,
        }
    }

    pub(crate) fn set_root_id(&self, id: Option<NodeId>) {
        *self.root_id.write() = id;
    }

    #[instrument(level = "debug", skip(self))]
    pub fn set_root(&self, id: NodeId) -> TreeResult<Arc<Node>> {
        let mut root = self.root_id.write();
        if let Some(existing) = *root {
            return Err(TreeError::RootAlreadySet(existing));
        }
        if !self.nodes.insert_new(Node::root(id)) {
            return Err(TreeError::DuplicateNode(id));
        }
        *root = Some(id);
        self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Inserts a new leaf under `parent_id`, appended after the existing siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&self, id: NodeId, parent_id: NodeId) -> TreeResult<Arc<Node>> {
        if !self.nodes.contains(parent_id) {
            return Err(TreeError::ParentNotFound(parent_id));
        }
        if !self.nodes.insert_new(Node::new(id, Some(parent_id))) {
            return Err(TreeError::DuplicateNode(id));
        }
        if !self.nodes.update(parent_id, |parent| parent.push_child(id)) {
            // parent removed concurrently between the two steps
            self.nodes.remove(id);
            return Err(TreeError::ParentNotFound(parent_id));
        }
        self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Removes `id` and everything below it. Returns the removed ids in depth-first order.
    ///
    /// Children are read from each node as it leaves the store, so a child linked
    /// concurrently before its parent went away is swept along with it. A child
    /// linked after that fails in [`Tree::add_node`] and is rolled back there.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let node = self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))?;
        if let Some(parent_id) = node.parent_id() {
            self.nodes.update(parent_id, |parent| parent.remove_child(id));
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            let Some(gone) = self.nodes.remove(nid) else {
                continue;
            };
            removed.push(nid);
            stack.extend(gone.child_ids().iter().rev());
        }
        if removed.is_empty() {
            // removed concurrently between lookup and sweep
            return Err(TreeError::NodeNotFound(id));
        }
        if self.root_id() == Some(id) {
            self.set_root_id(None);
        }
        debug!(id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Re-parents `id` (with its subtree) under `new_parent_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&self, id: NodeId, new_parent_id: NodeId) -> TreeResult<()> {
        let node = self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))?;
        let old_parent_id = node.parent_id().ok_or(TreeError::CannotMoveRoot(id))?;
        if !self.nodes.contains(new_parent_id) {
            return Err(TreeError::ParentNotFound(new_parent_id));
        }
        if self.is_descendant(new_parent_id, id) {
            return Err(TreeError::CycleDetected(new_parent_id));
        }
        if old_parent_id == new_parent_id {
            return Ok(());
        }

        self.nodes.update(old_parent_id, |parent| parent.remove_child(id));
        self.nodes
            .update(id, |node| node.set_parent(Some(new_parent_id)));
        self.nodes
            .update(new_parent_id, |parent| parent.push_child(id));
        Ok(())
    }

    /// True when `id` lies in the subtree of `ancestor_id`, following parent links upward.
    fn is_descendant(&self, id: NodeId, ancestor_id: NodeId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.nodes.len() {
            match current {
                Some(nid) if nid == ancestor_id => return true,
                Some(nid) => current = self.nodes.get(nid).and_then(|node| node.parent_id()),
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        // 1
        // ├── 2
        // │   └── 4
        // └── 3
        let tree = Tree::with_root(1);
        tree.add_node(2, 1).unwrap();
        tree.add_node(3, 1).unwrap();
        tree.add_node(4, 2).unwrap();
        tree
    }

    #[test]
    fn given_empty_tree_when_setting_root_then_root_is_resolvable() {
        let tree = Tree::new();
        assert!(tree.root_id().is_none());

        tree.set_root(10).unwrap();

        assert_eq!(tree.root_id(), Some(10));
        assert!(matches!(tree.set_root(11), Err(TreeError::RootAlreadySet(10))));
    }

    #[test]
    fn given_tree_when_adding_node_then_parent_lists_child_in_order() {
        let tree = sample();
        assert_eq!(tree.store().get(1).unwrap().child_ids(), &[2, 3]);
        assert_eq!(tree.store().get(4).unwrap().parent_id(), Some(2));
    }

    #[test]
    fn given_missing_parent_when_adding_node_then_errors() {
        let tree = sample();
        assert!(matches!(tree.add_node(5, 99), Err(TreeError::ParentNotFound(99))));
        assert!(matches!(tree.add_node(4, 1), Err(TreeError::DuplicateNode(4))));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn given_inner_node_when_removing_then_subtree_is_gone_and_parent_unlinked() {
        let tree = sample();

        let removed = tree.remove_node(2).unwrap();

        assert_eq!(removed, vec![2, 4]);
        assert_eq!(tree.store().get(1).unwrap().child_ids(), &[3]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_root_when_removing_then_tree_is_empty() {
        let tree = sample();
        tree.remove_node(1).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root_id().is_none());
    }

    #[test]
    fn given_node_when_moving_then_links_follow() {
        let tree = sample();

        tree.move_node(4, 3).unwrap();

        assert!(tree.store().get(2).unwrap().is_leaf());
        assert_eq!(tree.store().get(3).unwrap().child_ids(), &[4]);
        assert_eq!(tree.store().get(4).unwrap().parent_id(), Some(3));
    }

    #[test]
    fn given_descendant_as_new_parent_when_moving_then_detects_cycle() {
        let tree = sample();
        assert!(matches!(tree.move_node(2, 4), Err(TreeError::CycleDetected(4))));
        assert!(matches!(tree.move_node(1, 3), Err(TreeError::CannotMoveRoot(1))));
    }

    #[test]
    fn given_depth_cap_when_moving_under_deep_descendant_then_detects_cycle() {
        let tree = Tree::from_settings(&Settings {
            shard_count: 2,
            max_depth: Some(1),
        });
        tree.set_root(1).unwrap();
        for (id, parent) in [(2, 1), (3, 2), (4, 3), (5, 4)] {
            tree.add_node(id, parent).unwrap();
        }

        assert!(matches!(tree.move_node(2, 5), Err(TreeError::CycleDetected(5))));
        assert_eq!(tree.remove_node(2).unwrap(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn given_prefilled_store_when_wrapping_then_tree_uses_it() {
        let store = Arc::new(NodeStore::with_shards(2));
        store.insert(Node::with_children(1, None, vec![2]));
        store.insert(Node::new(2, Some(1)));

        let tree = Tree::with_store(Arc::clone(&store), Some(1));
        assert_eq!(tree.len(), 2);

        store.clear();
        assert!(tree.is_empty());
    }

    #[test]
    fn given_clone_when_mutating_original_then_clone_sees_change() {
        let tree = sample();
        let handle = tree.clone();

        tree.add_node(5, 3).unwrap();

        assert!(handle.store().contains(5));
    }
}
