// Query request parsing
// Turns the raw query-mode arguments into a validated request

use crate::error::GateError;
use crate::output::OutputFormat;

/// A single read-only query to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub database_path: String,
    /// Passed to the engine verbatim; never parsed or checked here
    pub statement: String,
    pub output_format: OutputFormat,
}

impl QueryRequest {
    /// Parse `[-readonly] [-json] <db_path> <sql>`
    ///
    /// Flags may sit anywhere. The first two other tokens are the database
    /// path and the statement, in that order; anything after them is
    /// ignored. `-readonly` is accepted and does nothing, since the
    /// database is always opened read-only.
    ///
    /// `program` is only used to build the usage message.
    pub fn from_args<I, S>(program: &str, args: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output_format = OutputFormat::Text;
        let mut database_path: Option<String> = None;
        let mut statement: Option<String> = None;

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "-readonly" => continue,
                "-json" => output_format = OutputFormat::Json,
                _ if database_path.is_none() => database_path = Some(arg.to_string()),
                _ if statement.is_none() => statement = Some(arg.to_string()),
                _ => {}
            }
        }

        match (database_path, statement) {
            (Some(database_path), Some(statement))
                if !database_path.is_empty() && !statement.is_empty() =>
            {
                Ok(Self {
                    database_path,
                    statement,
                    output_format,
                })
            }
            _ => Err(GateError::Usage {
                program: program.to_string(),
            }),
        }
    }
}
