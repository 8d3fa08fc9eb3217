// JSON string escaping
// Turns arbitrary bytes into a quoted JSON string literal

use std::io::{self, Write};

/// Write `text` as a JSON string literal, quotes included
///
/// Escapes `"`, `\`, newline, carriage return and tab with their short
/// forms; every other byte below 0x20 becomes `\u00XX` (lowercase hex).
/// All remaining bytes are copied untouched, so UTF-8 is not validated:
/// invalid input yields invalid JSON rather than a silent replacement.
///
/// `None` renders as `""`, never as `null`.
pub fn write_json_string<W: Write>(out: &mut W, text: Option<&[u8]>) -> io::Result<()> {
    out.write_all(b"\"")?;

    if let Some(bytes) = text {
        // Copy runs of plain bytes in one call instead of byte by byte
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let short: &[u8] = match byte {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x00..=0x1f => &[],
                _ => continue,
            };

            out.write_all(&bytes[start..i])?;
            if short.is_empty() {
                write!(out, "\\u{:04x}", byte)?;
            } else {
                out.write_all(short)?;
            }
            start = i + 1;
        }
        out.write_all(&bytes[start..])?;
    }

    out.write_all(b"\"")
}
