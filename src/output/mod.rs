// Output module - renders result cells as text or JSON
// Nothing here touches the database; cells arrive already typed

pub mod escape;
pub mod number;
pub mod writer;

use rusqlite::types::ValueRef;

pub use escape::write_json_string;
pub use writer::{JsonWriter, RowWriter, TextWriter};

/// The two encodings a query can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `a|b|c` lines, no header
    #[default]
    Text,
    /// One JSON array of row objects
    Json,
}

/// A single result cell, tagged with its runtime type
///
/// Borrowed straight from the current row; it never outlives the step
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Null,
    Integer(i64),
    Float(f64),
    /// Text and blob values both land here, as raw bytes
    Text(&'a [u8]),
}

impl<'a> From<ValueRef<'a>> for Cell<'a> {
    fn from(value: ValueRef<'a>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Float(f),
            // Blobs go through the text path, same as the engine's text accessor
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Cell::Text(c_string(bytes)),
        }
    }
}

/// Cut at the first NUL, the way a C string accessor would see the bytes
fn c_string(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_value_ref() {
        assert_eq!(Cell::from(ValueRef::Null), Cell::Null);
        assert_eq!(Cell::from(ValueRef::Integer(42)), Cell::Integer(42));
        assert_eq!(Cell::from(ValueRef::Real(1.5)), Cell::Float(1.5));
        assert_eq!(Cell::from(ValueRef::Text(b"abc")), Cell::Text(b"abc"));
    }

    #[test]
    fn test_blob_cells_use_text_path() {
        assert_eq!(Cell::from(ValueRef::Blob(b"\x01\x02")), Cell::Text(b"\x01\x02"));
    }

    #[test]
    fn test_embedded_nul_truncates() {
        assert_eq!(Cell::from(ValueRef::Text(b"ab\0cd")), Cell::Text(b"ab"));
        assert_eq!(Cell::from(ValueRef::Blob(b"\0rest")), Cell::Text(b""));
    }

    #[test]
    fn test_default_format_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
