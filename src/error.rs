//! Errors for tree mutation, tree descriptions and configuration.
//!
//! Navigation queries never produce these: absence there is `None` or an empty `Vec`.

use std::path::PathBuf;
use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("parent node not found: {0}")]
    ParentNotFound(NodeId),

    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("tree already has root: {0}")]
    RootAlreadySet(NodeId),

    #[error("root node cannot be moved: {0}")]
    CannotMoveRoot(NodeId),

    #[error("cycle detected in tree hierarchy at node: {0}")]
    CycleDetected(NodeId),

    #[error("tree description has no root")]
    MissingRoot,

    #[error("tree description has multiple roots: {0:?}")]
    MultipleRoots(Vec<NodeId>),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tree description in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("config error: {message}")]
    Config { message: String },
}

impl TreeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
