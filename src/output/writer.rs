// Row writers
// Stream rows out one cell at a time, so no row is ever buffered whole

use super::escape::write_json_string;
use super::number::{engine_text, C_GENERAL};
use super::Cell;
use std::io::{self, Write};

/// Something that can receive a result set, one row and one cell at a time
///
/// Callers drive it in this order:
/// `begin`, then for every row `begin_row`, `cell`..., `end_row`,
/// and finally `finish`. `finish` must be called even when the row stream
/// ended in an error, so the output is closed off properly.
pub trait RowWriter {
    fn begin(&mut self) -> io::Result<()>;
    fn begin_row(&mut self) -> io::Result<()>;
    /// `index` is the column position, `name` the column's result name
    fn cell(&mut self, index: usize, name: &str, cell: Cell<'_>) -> io::Result<()>;
    fn end_row(&mut self) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;
}

/// Pipe-delimited text, one line per row
pub struct TextWriter<W: Write> {
    out: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowWriter for TextWriter<W> {
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn begin_row(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn cell(&mut self, index: usize, _name: &str, cell: Cell<'_>) -> io::Result<()> {
        if index > 0 {
            self.out.write_all(b"|")?;
        }
        match cell {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(self.out, "{}", i),
            Cell::Float(f) => self.out.write_all(engine_text(f).as_bytes()),
            Cell::Text(bytes) => self.out.write_all(bytes),
        }
    }

    fn end_row(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// A single JSON array of row objects
pub struct JsonWriter<W: Write> {
    out: W,
    /// Whether a row object has already been written (decides the comma)
    wrote_row: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_row: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowWriter for JsonWriter<W> {
    fn begin(&mut self) -> io::Result<()> {
        self.out.write_all(b"[")
    }

    fn begin_row(&mut self) -> io::Result<()> {
        if self.wrote_row {
            self.out.write_all(b",")?;
        }
        self.wrote_row = true;
        self.out.write_all(b"{")
    }

    fn cell(&mut self, index: usize, name: &str, cell: Cell<'_>) -> io::Result<()> {
        if index > 0 {
            self.out.write_all(b",")?;
        }
        // Duplicate column names are written as-is
        write_json_string(&mut self.out, Some(name.as_bytes()))?;
        self.out.write_all(b":")?;
        match cell {
            Cell::Null => self.out.write_all(b"null"),
            Cell::Integer(i) => write!(self.out, "{}", i),
            Cell::Float(f) => self.out.write_all(C_GENERAL.format(f).as_bytes()),
            Cell::Text(bytes) => write_json_string(&mut self.out, Some(bytes)),
        }
    }

    fn end_row(&mut self) -> io::Result<()> {
        self.out.write_all(b"}")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.write_all(b"]\n")?;
        self.out.flush()
    }
}
