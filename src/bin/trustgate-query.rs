// Single-purpose query binary
// Drop-in for `sqlite3 -readonly [-json] <db> <sql>` when only reads are needed

use anyhow::Result;
use clap::Parser as ClapParser;
use std::process::ExitCode;
use trustgate::command::report;
use trustgate::{Command, GateError};

/// Run one read-only SQL statement against a SQLite database
#[derive(ClapParser)]
#[command(version, about, long_about = None)]
struct Args {
    /// [-readonly] [-json] <db_path> <sql>
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
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
    let args = Args::parse();

    // The usage line names the program the way it was invoked
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "trustgate-query".to_string());

    let command = Command::query(&program, args.args)?;
    Ok(command.dispatch()?)
}
