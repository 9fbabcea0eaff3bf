//! CLI-level errors (wraps tree errors)

use thiserror::Error;

use crate::error::TreeError;
use crate::node::NodeId;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("no node {0} in tree")]
    UnknownNode(NodeId),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::UnknownNode(_) => crate::exitcode::DATAERR,
            CliError::Tree(e) => match e {
                TreeError::Io { .. } => crate::exitcode::NOINPUT,
                TreeError::Config { .. } => crate::exitcode::CONFIG,
                TreeError::Parse { .. }
                | TreeError::NodeNotFound(_)
                | TreeError::MissingRoot
                | TreeError::MultipleRoots(_)
                | TreeError::DuplicateNode(_)
                | TreeError::ParentNotFound(_)
                | TreeError::CycleDetected(_) => crate::exitcode::DATAERR,
                _ => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_errors_when_mapping_then_uses_sysexits_codes() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), exitcode::USAGE);
        assert_eq!(CliError::UnknownNode(3).exit_code(), exitcode::DATAERR);
        assert_eq!(CliError::from(TreeError::MissingRoot).exit_code(), exitcode::DATAERR);
        assert_eq!(CliError::from(TreeError::NodeNotFound(9)).exit_code(), exitcode::DATAERR);
        assert_eq!(
            CliError::from(TreeError::Config { message: "bad".into() }).exit_code(),
            exitcode::CONFIG
        );
    }
}
