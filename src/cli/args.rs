//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::node::NodeId;

/// Inspect multi-branch trees described in TOML files
#[derive(Parser, Debug)]
#[command(name = "mbtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Explicit config file, layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as tree
    Show {
        /// Tree description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Render only the subtree below this node
        #[arg(long)]
        from: Option<NodeId>,
    },

    /// List children of a node
    Children {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
    },

    /// List siblings of a node
    Siblings {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
    },

    /// Show parent of a node
    Parent {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
    },

    /// Show ancestor of a node at an absolute level (0 = direct parent)
    Ancestor {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
        level: usize,
    },

    /// Show level (depth from root) of a node
    Level {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
    },

    /// List leaf nodes, optionally below a node
    Leaves {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Restrict to the subtree of this node
        id: Option<NodeId>,
    },

    /// List a node and its descendants
    Descendants {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: NodeId,
        /// Only leaves
        #[arg(long)]
        leaves_only: bool,
    },

    /// Depth-first (pre-order) ids starting at a node
    Dfs {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Start node, default root
        id: Option<NodeId>,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
