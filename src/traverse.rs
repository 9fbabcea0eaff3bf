//! Traversal engine: levels, lazy depth-first/post-order/breadth-first walks and
//! subtree snapshots.
//!
//! All iterators borrow the store and resolve ids on the fly, so a traversal
//! running next to concurrent mutation sees each node as it is when reached.
//! Every iterator keeps a visited set and yields an id at most once, which keeps
//! malformed parent/child data from looping forever. When the tree carries a
//! `max_depth`, walks descend at most that many levels below their start node.

use std::collections::{HashSet, VecDeque};

use tracing::{instrument, trace};

use crate::node::NodeId;
use crate::store::NodeStore;
use crate::tree::Tree;

impl Tree {
    /// Absolute depth of `id` (root = 0).
    ///
    /// The walk ends at the tree's root id or at a node without parent. None when
    /// `id` does not resolve, when a parent link breaks before either is reached,
    /// or when the walk exceeds the configured bound (cyclic data).
    #[instrument(level = "trace", skip(self))]
    pub fn level(&self, id: NodeId) -> Option<usize> {
        let root_id = self.root_id();
        let limit = self.walk_limit();
        let mut node = self.store().get(id)?;
        let mut depth = 0;

        while Some(node.id()) != root_id {
            let Some(parent_id) = node.parent_id() else {
                break;
            };
            if depth >= limit {
                trace!(id, depth, "level walk exceeded bound");
                return None;
            }
            node = self.store().get(parent_id)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Pre-order ids below and including `id`, children in sibling order.
    ///
    /// Each call starts a fresh walk. Yields nothing when `id` does not resolve.
    pub fn depth_first_traversal(&self, id: NodeId) -> DepthFirstIter<'_> {
        DepthFirstIter::new(self.store(), id, self.max_depth())
    }

    /// Post-order ids: every child subtree before its parent.
    pub fn post_order_traversal(&self, id: NodeId) -> PostOrderIter<'_> {
        PostOrderIter::new(self.store(), id, self.max_depth())
    }

    /// Level-order ids starting at `id`.
    pub fn breadth_first_traversal(&self, id: NodeId) -> BreadthFirstIter<'_> {
        BreadthFirstIter::new(self.store(), id, self.max_depth())
    }

    /// Independent copy of `id` and its descendants, rooted at `id`.
    ///
    /// Later mutations of either tree are not reflected in the other.
    #[instrument(level = "debug", skip(self))]
    pub fn subtree(&self, id: NodeId) -> Option<Tree> {
        if !self.store().contains(id) {
            return None;
        }
        let snapshot = self.empty_like();
        for nid in self.depth_first_traversal(id) {
            if let Some(node) = self.store().get(nid) {
                snapshot.store().insert((*node).clone());
            }
        }
        if !snapshot.store().contains(id) {
            // removed concurrently before it was copied
            return None;
        }
        snapshot.set_root_id(Some(id));
        Some(snapshot)
    }

    /// Number of levels in the tree, 0 when there is no resolvable root.
    ///
    /// With `max_depth` set, at most `max_depth + 1`.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        let Some(root) = self.root_id() else {
            return 0;
        };
        if !self.store().contains(root) {
            return 0;
        }

        let mut levels = 0;
        let mut visited = HashSet::new();
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.store().get(id) else {
                continue;
            };
            levels = levels.max(depth);
            if within(self.max_depth(), depth - 1) {
                for &child in node.child_ids() {
                    stack.push((child, depth + 1));
                }
            }
        }
        levels
    }
}

/// True when a node `depth` levels below the start may still be expanded.
fn within(max_depth: Option<usize>, depth: usize) -> bool {
    max_depth.map_or(true, |max| depth < max)
}

pub struct DepthFirstIter<'a> {
    store: &'a NodeStore,
    /// Pending ids with their depth below the start
    stack: Vec<(NodeId, usize)>,
    visited: HashSet<NodeId>,
    max_depth: Option<usize>,
}

impl<'a> DepthFirstIter<'a> {
    fn new(store: &'a NodeStore, start: NodeId, max_depth: Option<usize>) -> Self {
        Self {
            store,
            stack: vec![(start, 0)],
            visited: HashSet::new(),
            max_depth,
        }
    }
}

impl Iterator for DepthFirstIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.store.get(id) else {
                continue;
            };
            if within(self.max_depth, depth) {
                // reverse push keeps left-to-right order
                let visited = &self.visited;
                self.stack.extend(
                    node.child_ids()
                        .iter()
                        .rev()
                        .filter(|c| !visited.contains(*c))
                        .map(|&c| (c, depth + 1)),
                );
            }
            return Some(id);
        }
        None
    }
}

pub struct PostOrderIter<'a> {
    store: &'a NodeStore,
    /// (id, depth below the start, children already pushed)
    stack: Vec<(NodeId, usize, bool)>,
    visited: HashSet<NodeId>,
    max_depth: Option<usize>,
}

impl<'a> PostOrderIter<'a> {
    fn new(store: &'a NodeStore, start: NodeId, max_depth: Option<usize>) -> Self {
        Self {
            store,
            stack: vec![(start, 0, false)],
            visited: HashSet::new(),
            max_depth,
        }
    }
}

impl Iterator for PostOrderIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth, expanded)) = self.stack.pop() {
            if expanded {
                return Some(id);
            }
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.store.get(id) else {
                continue;
            };
            self.stack.push((id, depth, true));
            if !within(self.max_depth, depth) {
                continue;
            }
            for &child in node.child_ids().iter().rev() {
                if !self.visited.contains(&child) {
                    self.stack.push((child, depth + 1, false));
                }
            }
        }
        None
    }
}

pub struct BreadthFirstIter<'a> {
    store: &'a NodeStore,
    queue: VecDeque<(NodeId, usize)>,
    visited: HashSet<NodeId>,
    max_depth: Option<usize>,
}

impl<'a> BreadthFirstIter<'a> {
    fn new(store: &'a NodeStore, start: NodeId, max_depth: Option<usize>) -> Self {
        Self {
            store,
            queue: VecDeque::from([(start, 0)]),
            visited: HashSet::new(),
            max_depth,
        }
    }
}

impl Iterator for BreadthFirstIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.queue.pop_front() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.store.get(id) else {
                continue;
            };
            if within(self.max_depth, depth) {
                let visited = &self.visited;
                self.queue.extend(
                    node.child_ids()
                        .iter()
                        .filter(|c| !visited.contains(*c))
                        .map(|&c| (c, depth + 1)),
                );
            }
            return Some(id);
        }
        None
    }
}
