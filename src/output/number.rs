// Floating-point rendering
// C's "%g" for JSON cells, the engine's own conversion for text cells

use rusqlite::ffi;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

/// A `%g`-style conversion: `precision` significant digits, fixed or
/// exponent notation (whichever `%g` picks), trailing zeros removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneralFormat {
    precision: usize,
    infinity: &'static str,
    nan: &'static str,
}

/// C's plain `%g`, used for JSON float cells
pub const C_GENERAL: GeneralFormat = GeneralFormat {
    precision: 6,
    infinity: "inf",
    nan: "nan",
};

impl GeneralFormat {
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return self.nan.to_string();
        }
        if value.is_infinite() {
            let sign = if value < 0.0 { "-" } else { "" };
            return format!("{}{}", sign, self.infinity);
        }

        let precision = self.precision.max(1);

        // Let the exponent form do the rounding: %g decides on the exponent
        // of the value *after* rounding to `precision` digits
        let scientific = format!("{:.*e}", precision - 1, value);
        let Some((mantissa, exponent)) = scientific.split_once('e') else {
            return scientific;
        };
        let exponent: i32 = exponent.parse().unwrap_or(0);

        if exponent < -4 || exponent >= precision as i32 {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!(
                "{}e{}{:02}",
                trim(mantissa),
                sign,
                exponent.unsigned_abs()
            )
        } else {
            let decimals = (precision as i32 - 1 - exponent) as usize;
            trim(&format!("{:.*}", decimals, value))
        }
    }
}

/// Drop trailing fractional zeros and a dangling point
fn trim(digits: &str) -> String {
    if !digits.contains('.') {
        return digits.to_string();
    }
    let trimmed = digits.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}

/// Render a REAL exactly as SQLite coerces it to text
///
/// Hands the value to the engine's own printf with the format string its
/// REAL-to-TEXT conversion uses, so rounding, `-0.0` and the non-finite
/// spellings all come from the engine itself.
pub fn engine_text(value: f64) -> String {
    // Sign, 15 digits, point and a three-digit exponent fit with room to spare
    let mut buf = [0 as c_char; 48];
    unsafe {
        ffi::sqlite3_snprintf(
            buf.len() as c_int,
            buf.as_mut_ptr(),
            b"%!.15g\0".as_ptr().cast(),
            value,
        );
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_c_general_fixed_range() {
        assert_eq!(C_GENERAL.format(0.5), "0.5");
        assert_eq!(C_GENERAL.format(2.0), "2");
        assert_eq!(C_GENERAL.format(-2.5), "-2.5");
        assert_eq!(C_GENERAL.format(0.0), "0");
        assert_eq!(C_GENERAL.format(100000.0), "100000");
        assert_eq!(C_GENERAL.format(0.0001), "0.0001");
        assert_eq!(C_GENERAL.format(3.14159265), "3.14159");
    }

    #[test]
    fn test_c_general_exponent_range() {
        assert_eq!(C_GENERAL.format(1000000.0), "1e+06");
        assert_eq!(C_GENERAL.format(0.00001), "1e-05");
        assert_eq!(C_GENERAL.format(123456789.0), "1.23457e+08");
        assert_eq!(C_GENERAL.format(1e100), "1e+100");
        assert_eq!(C_GENERAL.format(-1.5e-7), "-1.5e-07");
    }

    #[test]
    fn test_c_general_rounding_can_bump_exponent() {
        // Rounds to 1.00000e6, so it switches to exponent form
        assert_eq!(C_GENERAL.format(999999.7), "1e+06");
        assert_eq!(C_GENERAL.format(999999.4), "999999");
    }

    #[test]
    fn test_c_general_non_finite() {
        assert_eq!(C_GENERAL.format(f64::INFINITY), "inf");
        assert_eq!(C_GENERAL.format(f64::NEG_INFINITY), "-inf");
        assert_eq!(C_GENERAL.format(f64::NAN), "nan");
    }

    #[test]
    fn test_engine_text_keeps_a_fractional_digit() {
        assert_eq!(engine_text(1.0), "1.0");
        assert_eq!(engine_text(0.0), "0.0");
        assert_eq!(engine_text(100.0), "100.0");
        assert_eq!(engine_text(0.1), "0.1");
        assert_eq!(engine_text(-0.25), "-0.25");
        assert_eq!(engine_text(3.14159265358979), "3.14159265358979");
    }

    /// What the engine itself produces for `CAST(value AS TEXT)`
    fn cast_to_text(conn: &Connection, value: f64) -> String {
        conn.query_row("SELECT CAST(?1 AS TEXT)", [value], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_engine_text_matches_cast_at_rounding_edges() {
        let conn = Connection::open_in_memory().unwrap();
        let edges = [
            -3.559813741049805e204,
            2.215603731797175e-91,
            -0.0,
            1e20,
            123456789012345678.0,
            0.1 + 0.2,
            f64::MAX,
            f64::MIN_POSITIVE,
            5e-324,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ];
        for value in edges {
            assert_eq!(engine_text(value), cast_to_text(&conn, value), "value {:e}", value);
        }
        assert_eq!(engine_text(-3.559813741049805e204), "-3.55981374104981e+204");
        assert_eq!(engine_text(2.215603731797175e-91), "2.21560373179717e-91");
    }

    #[test]
    fn test_engine_text_matches_cast_over_sweep() {
        let conn = Connection::open_in_memory().unwrap();

        // Deterministic xorshift over raw bit patterns covers every exponent
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut checked = 0;
        while checked < 20_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let value = f64::from_bits(state);
            if value.is_nan() {
                continue;
            }
            assert_eq!(engine_text(value), cast_to_text(&conn, value), "value {:e}", value);
            checked += 1;
        }
    }
}
