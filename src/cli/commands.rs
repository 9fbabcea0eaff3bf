//! Command dispatch for the mbtree binary

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::context::AppContext;
use crate::display::TreeDisplay;
use crate::filter::{AcceptAll, LeafOnly, NodeFilter};
use crate::node::{Node, NodeId};
use crate::tree::Tree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".into()));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let context = AppContext::load(cli.config.as_deref())?;
    match command {
        Commands::Show { file, from } => _show(&context, file, *from),
        Commands::Children { file, id } => {
            let tree = context.load_tree(file)?;
            let children = tree.get_child_nodes(*id).ok_or(CliError::UnknownNode(*id))?;
            print_nodes(&children);
            Ok(())
        }
        Commands::Siblings { file, id } => _siblings(&context, file, *id),
        Commands::Parent { file, id } => {
            let tree = context.load_tree(file)?;
            require_node(&tree, *id)?;
            match tree.get_parent_node(*id) {
                Some(parent) => output::node(&parent),
                None => output::warning(&format!("node {} has no parent", id)),
            }
            Ok(())
        }
        Commands::Ancestor { file, id, level } => _ancestor(&context, file, *id, *level),
        Commands::Level { file, id } => {
            let tree = context.load_tree(file)?;
            let level = tree.level(*id).ok_or(CliError::UnknownNode(*id))?;
            output::info(&level);
            Ok(())
        }
        Commands::Leaves { file, id } => {
            let tree = context.load_tree(file)?;
            if let Some(id) = id {
                require_node(&tree, *id)?;
            }
            print_nodes(&sorted(tree.get_leaf_nodes(*id)));
            Ok(())
        }
        Commands::Descendants {
            file,
            id,
            leaves_only,
        } => {
            let tree = context.load_tree(file)?;
            let filter: &dyn NodeFilter = if *leaves_only { &LeafOnly } else { &AcceptAll };
            let nodes = tree
                .get_descendant_nodes(*id, Some(filter))
                .ok_or(CliError::UnknownNode(*id))?;
            print_nodes(&sorted(nodes));
            Ok(())
        }
        Commands::Dfs { file, id } => {
            let tree = context.load_tree(file)?;
            let start = id.or(tree.root_id()).ok_or(CliError::Usage("tree is empty".into()))?;
            require_node(&tree, start)?;
            for nid in tree.depth_first_traversal(start) {
                output::info(&nid);
            }
            Ok(())
        }
        Commands::Config => {
            output::info(&context.settings.to_toml()?);
            Ok(())
        }
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(context))]
fn _show(context: &AppContext, file: &Path, from: Option<NodeId>) -> CliResult<()> {
    let tree = context.load_tree(file)?;
    let tree = match from {
        Some(id) => tree.subtree(id).ok_or(CliError::UnknownNode(id))?,
        None => tree,
    };
    debug!(nodes = tree.len(), height = tree.height(), "showing tree");
    output::header(&format!("{} ({} nodes)", file.display(), tree.len()));
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(context))]
fn _siblings(context: &AppContext, file: &Path, id: NodeId) -> CliResult<()> {
    let tree = context.load_tree(file)?;
    require_node(&tree, id)?;
    match tree.get_sibling_nodes(id) {
        Some(siblings) => print_nodes(&siblings),
        None => output::warning(&format!("node {} has no siblings", id)),
    }
    Ok(())
}

#[instrument(skip(context))]
fn _ancestor(context: &AppContext, file: &Path, id: NodeId, level: usize) -> CliResult<()> {
    let tree = context.load_tree(file)?;
    require_node(&tree, id)?;
    match tree.get_ancestor_node(id, level) {
        Some(ancestor) => output::node(&ancestor),
        None => output::warning(&format!("node {} has no ancestor at level {}", id, level)),
    }
    Ok(())
}

fn require_node(tree: &Tree, id: NodeId) -> CliResult<()> {
    if tree.get_node(id).is_none() {
        return Err(CliError::UnknownNode(id));
    }
    Ok(())
}

fn sorted(mut nodes: Vec<Arc<Node>>) -> Vec<Arc<Node>> {
    nodes.sort_by_key(|node| node.id());
    nodes
}

fn print_nodes(nodes: &[Arc<Node>]) {
    for node in nodes {
        output::node(node);
    }
}
