// trustgate - the trusted entry point for privileged work on this host
// It either supervises a background task or runs a single read-only SQLite query.
// Unix only: the supervisor is built directly on fork/exec and POSIX signals.

pub mod command;
pub mod error;
pub mod output;
pub mod query;
pub mod supervisor;

// Re-export commonly used types for convenience
pub use command::Command;
pub use error::GateError;
pub use output::{Cell, OutputFormat};
pub use query::{QueryExecutor, QueryRequest};
pub use supervisor::{ChildExit, Supervisor, SupervisorConfig};

/// Send `tracing` diagnostics to stderr, filtered by `TRUSTGATE_LOG`
/// (default: warnings only, so normal runs stay quiet)
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TRUSTGATE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A second init (tests, embedding) is harmless, so the error is ignored
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
