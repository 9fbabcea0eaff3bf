//! Tree builder for TOML tree descriptions.
//!
//! A description lists nodes with their parent ids:
//!
//! ```toml
//! root = 1
//!
//! [[nodes]]
//! id = 1
//!
//! [[nodes]]
//! id = 2
//! parent = 1
//! ```
//!
//! Entries may appear in any order; siblings keep the order of the file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{TreeError, TreeResult};
use crate::node::NodeId;
use crate::tree::Tree;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeEntry {
    pub id: NodeId,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TreeDescription {
    /// Explicit root, otherwise the single entry without parent
    #[serde(default)]
    pub root: Option<NodeId>,
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
}

impl TreeDescription {
    pub fn parse(content: &str, path: &Path) -> TreeResult<Self> {
        toml::from_str(content).map_err(|e| TreeError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Constructs trees from descriptions.
pub struct TreeBuilder {
    template: Tree,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            template: Tree::new(),
        }
    }

    /// Builds into trees shaped like `template` (shard count, depth bound).
    pub fn with_template(template: Tree) -> Self {
        Self { template }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn from_file(&self, path: &Path) -> TreeResult<Tree> {
        let content = std::fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
        let description = TreeDescription::parse(&content, path)?;
        self.build(&description)
    }

    #[instrument(level = "debug", skip(self, description), fields(nodes = description.nodes.len()))]
    pub fn build(&self, description: &TreeDescription) -> TreeResult<Tree> {
        let root = Self::find_root(description)?;

        // parent -> children, in declaration order
        let mut relationships: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut seen = HashSet::new();
        for entry in &description.nodes {
            if !seen.insert(entry.id) {
                return Err(TreeError::DuplicateNode(entry.id));
            }
            if let Some(parent) = entry.parent.filter(|_| entry.id != root) {
                relationships.entry(parent).or_default().push(entry.id);
            }
        }
        for entry in &description.nodes {
            if let Some(parent) = entry.parent.filter(|_| entry.id != root) {
                if !seen.contains(&parent) {
                    return Err(TreeError::ParentNotFound(parent));
                }
            }
        }

        let tree = self.template.empty_like();
        tree.set_root(root)?;

        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if let Some(children) = relationships.get(&current) {
                for &child in children {
                    tree.add_node(child, current)?;
                }
                stack.extend(children.iter().rev());
            }
        }

        // entries not reachable from the root hang off a parent cycle
        if let Some(orphan) = description
            .nodes
            .iter()
            .map(|entry| entry.id)
            .find(|id| !tree.store().contains(*id))
        {
            return Err(TreeError::CycleDetected(orphan));
        }

        debug!(root, count = tree.len(), "tree built");
        Ok(tree)
    }

    fn find_root(description: &TreeDescription) -> TreeResult<NodeId> {
        if let Some(root) = description.root {
            if !description.nodes.iter().any(|entry| entry.id == root) {
                return Err(TreeError::NodeNotFound(root));
            }
            let extra: Vec<NodeId> = description
                .nodes
                .iter()
                .filter(|entry| entry.parent.is_none() && entry.id != root)
                .map(|entry| entry.id)
                .collect();
            if !extra.is_empty() {
                return Err(TreeError::MultipleRoots(
                    std::iter::once(root).chain(extra).collect(),
                ));
            }
            return Ok(root);
        }
        let roots: Vec<NodeId> = description
            .nodes
            .iter()
            .filter(|entry| entry.parent.is_none())
            .map(|entry| entry.id)
            .collect();
        match roots.as_slice() {
            [] => Err(TreeError::MissingRoot),
            [root] => Ok(*root),
            _ => Err(TreeError::MultipleRoots(roots)),
        }
    }
}
