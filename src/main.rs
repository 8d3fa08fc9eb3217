// Main entry point for the trustgate binary
// Supervises the background task by default; `query` runs one read-only statement

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser as ClapParser, Subcommand};
use std::process::ExitCode;
use trustgate::command::{report, QUERY_PROGRAM};
use trustgate::{Command, GateError, SupervisorConfig};

/// trustgate - supervise the privileged background task or read a database
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Run one read-only SQL statement: [-readonly] [-json] <db_path> <sql>
    Query {
        /// Flags and positional values, interpreted in order
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the compiled-in supervisor configuration as JSON
    Config,
}

fn main() -> ExitCode {
    trustgate::init_tracing();

    match run() {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<GateError>() {
                Some(gate) => report(gate),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let command = parse_command()?;
    Ok(command.dispatch()?)
}

/// Decide, once, what this invocation does
fn parse_command() -> Result<Command> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // Help and version still behave as usual
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        // Anything unrecognized falls back to supervising
        Err(_) => Args { mode: None },
    };

    let command = match args.mode {
        Some(Mode::Query { args }) => Command::query(QUERY_PROGRAM, args)?,
        Some(Mode::Config) => Command::ShowConfig(SupervisorConfig::compiled_in()),
        None => Command::Supervise(SupervisorConfig::compiled_in()),
    };
    Ok(command)
}
