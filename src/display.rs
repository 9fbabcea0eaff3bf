use std::collections::HashSet;

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::node::NodeId;
use crate::tree::Tree;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> TermTree<String>;
}

impl TreeDisplay for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        let Some(root) = self.get_root_node() else {
            return TermTree::new("Empty tree".to_string());
        };

        fn build_tree(
            tree: &Tree,
            node_id: NodeId,
            parent_tree: &mut TermTree<String>,
            visited: &mut HashSet<NodeId>,
        ) {
            if let Some(children) = tree.get_child_nodes(node_id) {
                for child in children {
                    if !visited.insert(child.id()) {
                        continue;
                    }
                    let mut child_tree = TermTree::new(child.to_string());
                    build_tree(tree, child.id(), &mut child_tree, visited);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut rendered = TermTree::new(root.to_string());
        let mut visited = HashSet::from([root.id()]);
        build_tree(self, root.id(), &mut rendered, &mut visited);
        rendered
    }
}
