//! Number formatting and text decoding helpers.

use std::borrow::Cow;

/// Round `value` to `precision` decimal places, halves away from zero.
///
/// f64 carries no more than 15 reliable decimal places, so larger
/// precisions are clamped.
pub fn to_fixed(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    (value * factor).round() / factor
}

/// Format a number the way a browser stringifies it: shortest form,
/// no trailing zeros, no exponent for ordinary magnitudes.
///
/// ```
/// use scoperem::util::format_number;
///
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(0.15625), "0.15625");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    value.to_string()
}

/// Decode style sheet bytes to a string.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the `@charset` label at the top of the sheet
/// 3. Falls back to Windows-1252
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_css(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(label) = charset_label(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label)
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the label from a leading `@charset "...";` rule.
fn charset_label(bytes: &[u8]) -> Option<&[u8]> {
    let rest = bytes.strip_prefix(b"@charset \"")?;
    let end = memchr::memchr(b'"', rest)?;
    Some(&rest[..end])
}
