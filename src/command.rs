// Top-level commands
// The binary decides once, at startup, which of its jobs to do

use crate::error::GateError;
use crate::query::{self, QueryRequest};
use crate::supervisor::{Supervisor, SupervisorConfig};
use std::io::{self, Write};
use std::process::ExitCode;

/// Name used in the query-mode usage line of the dual-mode binary
pub const QUERY_PROGRAM: &str = "trustgate query";

/// What this invocation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch and watch the configured child
    Supervise(SupervisorConfig),
    /// Run one read-only statement
    Query(QueryRequest),
    /// Print the compiled-in supervisor configuration
    ShowConfig(SupervisorConfig),
}

impl Command {
    /// Build a query command from raw query-mode arguments
    pub fn query<I, S>(program: &str, args: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        QueryRequest::from_args(program, args).map(Command::Query)
    }

    /// Carry out the command, writing results to stdout
    ///
    /// Returns the exit code on success. Errors still need reporting by the
    /// caller and always mean exit status 1.
    pub fn dispatch(self) -> Result<ExitCode, GateError> {
        match self {
            Command::Supervise(config) => {
                let exit = Supervisor::new(config).run()?;
                Ok(ExitCode::from(exit.exit_code()))
            }
            Command::Query(request) => {
                let stdout = io::stdout();
                let out = io::BufWriter::new(stdout.lock());
                query::run(&request, out)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::ShowConfig(config) => {
                let json = serde_json::to_string_pretty(&config)
                    .map_err(|err| GateError::Output(err.into()))?;
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", json)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Print an error the way operators expect to see it
pub fn report(err: &GateError) {
    if err.is_usage() {
        eprintln!("{}", err);
    } else {
        eprintln!("Error: {}", err);
    }
}
