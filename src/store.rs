//! Concurrent id -> node mapping shared by a tree and all of its clones.
//!
//! The map is split into power-of-two shards, each behind a `parking_lot::RwLock`.
//! Readers only take shared locks, so concurrent `get` calls never block each other.
//! Nodes are stored as `Arc<Node>` and replaced wholesale on update: a reader always
//! sees either the old or the new version of a node, never a partial one.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{instrument, trace};

use crate::node::{Node, NodeId};

pub const DEFAULT_SHARD_COUNT: usize = 16;

// Fibonacci hashing spreads sequential ids over the shards.
const HASH_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

type Shard = RwLock<HashMap<NodeId, Arc<Node>>>;

#[derive(Debug)]
pub struct NodeStore {
    shards: Box<[Shard]>,
    mask: usize,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    /// Creates a store with `shard_count` shards, rounded up to the next power of two.
    pub fn with_shards(shard_count: usize) -> Self {
        let count = shard_count.max(1).next_power_of_two();
        let shards = (0..count)
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            mask: count - 1,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, id: NodeId) -> &Shard {
        let hash = (id as u64).wrapping_mul(HASH_MULTIPLIER);
        &self.shards[(hash >> 32) as usize & self.mask]
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.shard(id).read().get(&id).cloned()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.shard(id).read().contains_key(&id)
    }

    /// Inserts or replaces the node stored under its id, returning the previous value.
    #[instrument(level = "trace", skip(self, node), fields(id = node.id()))]
    pub fn insert(&self, node: Node) -> Option<Arc<Node>> {
        let id = node.id();
        self.shard(id).write().insert(id, Arc::new(node))
    }

    /// Inserts the node only when its id is vacant. Returns false when the id is taken.
    pub fn insert_new(&self, node: Node) -> bool {
        let id = node.id();
        let mut shard = self.shard(id).write();
        if shard.contains_key(&id) {
            return false;
        }
        shard.insert(id, Arc::new(node));
        true
    }

    #[instrument(level = "trace", skip(self))]
    pub fn remove(&self, id: NodeId) -> Option<Arc<Node>> {
        self.shard(id).write().remove(&id)
    }

    /// Applies `f` to a copy of the node and swaps the copy in under the shard write lock.
    ///
    /// Returns false when `id` is absent. Readers holding the previous `Arc` keep
    /// seeing the previous version.
    pub fn update<F>(&self, id: NodeId, f: F) -> bool
    where
        F: FnOnce(&mut Node),
    {
        let mut shard = self.shard(id).write();
        match shard.get_mut(&id) {
            Some(entry) => {
                f(Arc::make_mut(entry));
                true
            }
            None => {
                trace!(id, "update skipped, node absent");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }

    /// Visits every stored node until the visitor breaks.
    ///
    /// Each shard is snapshotted before its nodes are visited, so the visitor may
    /// call back into the store. Entries inserted or removed in other shards while
    /// iterating may or may not be observed.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Arc<Node>) -> ControlFlow<()>,
    {
        for shard in self.shards.iter() {
            let snapshot: Vec<(NodeId, Arc<Node>)> = shard
                .read()
                .iter()
                .map(|(id, node)| (*id, Arc::clone(node)))
                .collect();
            for (id, node) in &snapshot {
                if visit(*id, node).is_break() {
                    return;
                }
            }
        }
    }

    /// Collects all nodes accepted by `pred`, scanning shards in parallel.
    ///
    /// Result order is unspecified.
    pub fn collect_where<P>(&self, pred: P) -> Vec<Arc<Node>>
    where
        P: Fn(&Node) -> bool + Send + Sync,
    {
        self.shards
            .par_iter()
            .flat_map_iter(|shard| {
                shard
                    .read()
                    .values()
                    .filter(|node| pred(node))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len());
        self.iterate(|id, _| {
            ids.push(id);
            ControlFlow::Continue(())
        });
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_shard_count_when_creating_then_rounds_up_to_power_of_two() {
        assert_eq!(NodeStore::with_shards(0).shard_count(), 1);
        assert_eq!(NodeStore::with_shards(5).shard_count(), 8);
        assert_eq!(NodeStore::with_shards(16).shard_count(), 16);
    }

    #[test]
    fn given_empty_store_when_getting_then_returns_none() {
        let store = NodeStore::new();
        assert!(store.get(42).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn given_node_when_inserting_twice_then_replaces_and_returns_previous() {
        let store = NodeStore::new();
        assert!(store.insert(Node::root(1)).is_none());

        let previous = store.insert(Node::with_children(1, None, vec![2]));

        assert_eq!(previous.map(|n| n.is_leaf()), Some(true));
        assert_eq!(store.get(1).map(|n| n.child_ids().to_vec()), Some(vec![2]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn given_taken_id_when_insert_new_then_refuses() {
        let store = NodeStore::new();
        assert!(store.insert_new(Node::root(1)));
        assert!(!store.insert_new(Node::new(1, Some(7))));
        assert_eq!(store.get(1).and_then(|n| n.parent_id()), None);
    }

    #[test]
    fn given_held_reference_when_updating_then_old_version_is_unchanged() {
        let store = NodeStore::new();
        store.insert(Node::root(1));
        let before = store.get(1).unwrap();

        assert!(store.update(1, |node| node.push_child(2)));

        assert!(before.is_leaf());
        assert_eq!(store.get(1).unwrap().child_ids(), &[2]);
        assert!(!store.update(99, |node| node.push_child(2)));
    }

    #[test]
    fn given_many_nodes_when_iterating_with_break_then_stops_early() {
        let store = NodeStore::with_shards(4);
        for id in 0..100 {
            store.insert(Node::new(id, Some(-1)));
        }

        let mut seen = 0;
        store.iterate(|_, _| {
            seen += 1;
            if seen == 10 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(seen, 10);
        assert_eq!(store.ids().len(), 100);
    }

    #[test]
    fn given_visitor_calling_back_into_store_when_iterating_then_does_not_deadlock() {
        let store = NodeStore::with_shards(1);
        store.insert(Node::root(1));
        store.insert(Node::new(2, Some(1)));

        store.iterate(|id, _| {
            store.remove(id);
            ControlFlow::Continue(())
        });

        assert!(store.is_empty());
    }

    #[test]
    fn given_predicate_when_collecting_then_returns_matching_nodes() {
        let store = NodeStore::new();
        for id in 0..20 {
            store.insert(Node::new(id, Some(-1)));
        }

        let mut even: Vec<_> = store
            .collect_where(|node| node.id() % 2 == 0)
            .iter()
            .map(|n| n.id())
            .collect();
        even.sort();

        assert_eq!(even, (0..20).step_by(2).collect::<Vec<_>>());
    }
}
