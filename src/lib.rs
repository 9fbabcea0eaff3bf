//! # mbtree
//!
//! Concurrent in-memory multi-branch (N-ary) tree.
//!
//! Nodes carry integer ids and link to their parent and children by id only;
//! all links are resolved through a sharded, lock-protected [`NodeStore`].
//! A [`Tree`] is a cheap handle (root id plus shared store) that can be cloned
//! into any number of threads. It offers:
//! - navigation: root, parent, children, siblings, ancestor at a level, leaves
//! - traversal: lazy depth-first, post-order and breadth-first walks
//! - [`Tree::subtree`] snapshots for a consistent view across several queries
//!
//! Navigation never fails with an error. A missing id, a broken link or a
//! child that no longer resolves yields `None` or is skipped.
//!
//! ```rust
//! use mbtree::Tree;
//!
//! let tree = Tree::with_root(1);
//! tree.add_node(2, 1).unwrap();
//! tree.add_node(3, 1).unwrap();
//! tree.add_node(4, 2).unwrap();
//!
//! assert_eq!(tree.level(4), Some(2));
//! assert_eq!(tree.get_ancestor_node(4, 1).map(|n| n.id()), Some(2));
//! let siblings = tree.get_sibling_nodes(2).unwrap();
//! assert_eq!(siblings[0].id(), 3);
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod exitcode;
pub mod filter;
mod navigate;
pub mod node;
pub mod store;
pub mod traverse;
pub mod tree;
pub mod util;

pub use builder::{NodeEntry, TreeBuilder, TreeDescription};
pub use config::Settings;
pub use context::AppContext;
pub use display::TreeDisplay;
pub use error::{TreeError, TreeResult};
pub use filter::{AcceptAll, ExcludeIds, LeafOnly, NodeFilter};
pub use node::{Node, NodeId};
pub use store::NodeStore;
pub use traverse::{BreadthFirstIter, DepthFirstIter, PostOrderIter};
pub use tree::Tree;
