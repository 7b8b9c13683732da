//! Numeric codec for DL/T 645 data fields
//!
//! Converts operator-entered hex strings and measurement values into the
//! fixed-width, low-byte-first sequences carried in the data field. Every
//! conversion is total: malformed input is padded, clamped or defaulted,
//! never rejected. Business validation is left to the caller.

use regex::Regex;

/// Default width of a voltage, current or error field
pub const DEFAULT_FLOAT_WIDTH: usize = 3;

/// Width of an active or reactive power field
pub const POWER_FIELD_WIDTH: usize = 4;

static NON_HEX: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"[^0-9A-Fa-f]").expect("static pattern is valid"));

/// Convert a hex string to bytes, lowest-order byte first
///
/// Non-hex characters are stripped, then the digits are left-padded with
/// `'0'` to `total_bytes * 2` (or to the next even length when no width is
/// given). Byte pairs are read most significant first and the result is
/// reversed. When the digits exceed the requested width, only the leading
/// `total_bytes` pairs are kept.
///
/// # Arguments
///
/// * `hex` - Operator input, e.g. `"12 34 56"` or `"0x123456"`
/// * `total_bytes` - Fixed output width. `None` or `Some(0)` derives the
///   width from the digits
///
/// # Returns
///
/// An empty vector for empty or whitespace-only input. The caller decides
/// which default applies (broadcast address, zeroed password).
pub fn hex_to_little_endian(hex: &str, total_bytes: Option<usize>) -> Vec<u8> {
    if hex.trim().is_empty() {
        return Vec::new();
    }

    let digits = NON_HEX.replace_all(hex, "");
    let total = total_bytes
        .filter(|&n| n > 0)
        .unwrap_or_else(|| digits.len().div_ceil(2));
    let padded = format!("{:0>width$}", digits, width = total * 2);

    let mut bytes: Vec<u8> = padded
        .as_bytes()
        .chunks(2)
        .take(total)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect();
    bytes.reverse();
    bytes
}

/// Convert a measurement value to a signed fixed-width integer, lowest byte first
///
/// The value is rounded half-to-even, `byte_count` is clamped into `[1, 4]`
/// and the integer is clamped into the two's complement range of that
/// width before it is encoded.
pub fn float_to_little_endian(value: f32, byte_count: usize) -> Vec<u8> {
    let width = byte_count.clamp(1, 4);
    let bits = 8 * width as u32;
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;

    // `as` saturates on overflow and maps NaN to zero
    let rounded = value.round_ties_even() as i64;
    let clamped = rounded.clamp(min, max);

    clamped.to_le_bytes()[..width].to_vec()
}

/// Render bytes as space separated upper-case hex, e.g. `"68 AA 16"`
pub fn to_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}
