// Query Executor
// Opens a database read-only, runs one statement and streams its rows
// into a row writer

use super::request::QueryRequest;
use crate::error::GateError;
use crate::output::{Cell, JsonWriter, OutputFormat, RowWriter, TextWriter};
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Batch, Connection, OpenFlags, Statement};
use std::io::Write;
use tracing::debug;

/// A read-only connection to one database file
///
/// The connection (and any statement prepared from it) is released when
/// this value is dropped, on success and error paths alike.
pub struct QueryExecutor {
    connection: Connection,
}

impl QueryExecutor {
    /// Open `path` strictly read-only
    ///
    /// Fails if the file is missing, unreadable or not a database.
    /// The file is never created.
    pub fn open(path: &str) -> Result<Self, GateError> {
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| GateError::Open {
                path: path.to_string(),
                source,
            })?;
        debug!(path, "opened database read-only");

        Ok(Self { connection })
    }

    /// Run `sql` and write every row in `format` to `out`
    ///
    /// Returns the number of rows written. If the engine fails halfway,
    /// the rows already written stay written (and JSON output is still
    /// closed), then the engine's error is returned.
    pub fn execute<W: Write>(
        &self,
        sql: &str,
        format: OutputFormat,
        out: W,
    ) -> Result<u64, GateError> {
        match format {
            OutputFormat::Text => self.execute_into(sql, &mut TextWriter::new(out)),
            OutputFormat::Json => self.execute_into(sql, &mut JsonWriter::new(out)),
        }
    }

    /// Run the first statement of `sql`, feeding the rows to any `RowWriter`
    ///
    /// Anything after the first complete statement is ignored, and SQL
    /// holding no statement at all yields an empty result.
    pub fn execute_into<R: RowWriter>(&self, sql: &str, writer: &mut R) -> Result<u64, GateError> {
        let mut batch = Batch::new(&self.connection, sql);
        let Some(mut statement) = batch.next().map_err(GateError::Prepare)? else {
            debug!("no statement to run");
            writer.begin()?;
            writer.finish()?;
            return Ok(0);
        };

        // The result shape is fixed once the statement is compiled
        let columns = column_names(&statement)?;
        debug!(columns = columns.len(), "prepared statement");

        writer.begin()?;
        let streamed = stream_rows(&mut statement, &columns, writer);
        // Close the output even if the stream broke off; the engine's error
        // outranks a failure to close
        let finished = writer.finish();
        let rows = streamed?;
        finished?;

        debug!(rows, "statement completed");
        Ok(rows)
    }
}

fn column_names(statement: &Statement<'_>) -> Result<Vec<String>, GateError> {
    (0..statement.column_count())
        .map(|i| {
            statement
                .column_name(i)
                .map(str::to_string)
                .map_err(GateError::Prepare)
        })
        .collect()
}

/// Step through the rows, holding only the current one
fn stream_rows<R: RowWriter>(
    statement: &mut Statement<'_>,
    columns: &[String],
    writer: &mut R,
) -> Result<u64, GateError> {
    let mut rows = statement.query([]).map_err(GateError::Execution)?;
    let mut count = 0u64;

    while let Some(row) = rows.next().map_err(GateError::Execution)? {
        writer.begin_row()?;
        for (i, name) in columns.iter().enumerate() {
            let value = row.get_ref(i).map_err(GateError::Execution)?;
            writer.cell(i, name, Cell::from(value))?;
        }
        writer.end_row()?;
        count += 1;
    }

    Ok(count)
}

/// Run a parsed request end to end, writing results to `out`
pub fn run<W: Write>(request: &QueryRequest, out: W) -> Result<u64, GateError> {
    let executor = QueryExecutor::open(&request.database_path)?;
    executor.execute(&request.statement, request.output_format, out)
}
