// Error types
// Every failure an invocation can hit, for both the query and the supervisor paths

use std::io;
use thiserror::Error;

/// The errors that end an invocation
///
/// All of them map to exit status 1. Only the message differs, so each
/// variant's Display text is exactly what the operator sees after "Error: "
/// (except `Usage`, which is printed bare).
#[derive(Debug, Error)]
pub enum GateError {
    /// A required positional argument was missing
    #[error("Usage: {program} [-readonly] [-json] <db_path> <sql>")]
    Usage { program: String },

    /// The database file could not be opened read-only
    #[error("unable to open database \"{path}\": {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The statement failed to compile
    #[error("{0}")]
    Prepare(#[source] rusqlite::Error),

    /// The row stream ended with something other than normal completion
    #[error("{0}")]
    Execution(#[source] rusqlite::Error),

    /// Writing results to the output stream failed
    #[error("failed to write query output: {0}")]
    Output(#[from] io::Error),

    /// The supervisor configuration was rejected before launch
    #[error("invalid supervisor configuration: {0}")]
    Config(String),

    /// The child process could not be created
    #[error("failed to launch child process: {0}")]
    Launch(#[source] io::Error),
}

impl GateError {
    /// Usage errors carry their own formatting; everything else gets the
    /// "Error: " prefix
    pub fn is_usage(&self) -> bool {
        matches!(self, GateError::Usage { .. })
    }
}
