/*!
 * Argument Parsing
 * Hexadecimal number parsing for command arguments
 */

/// Split `s` into its hex value and the unparsed remainder
///
/// Skips leading whitespace and an optional `0x`/`0X`. Saturates at
/// `u64::MAX`. Returns `None` for the value when no digit was found.
fn scan_hex(s: &str) -> (Option<u64>, bool, &str) {
    let s = s.trim_start();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_hexdigit()))
        .unwrap_or(s);

    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());
    if end == 0 {
        return (None, false, digits);
    }

    let mut value: u64 = 0;
    let mut overflow = false;
    for c in digits[..end].chars() {
        let d = c.to_digit(16).unwrap_or(0) as u64;
        match value.checked_mul(16).and_then(|v| v.checked_add(d)) {
            Some(v) => value = v,
            None => {
                overflow = true;
                value = u64::MAX;
            }
        }
    }
    (Some(value), overflow, &digits[end..])
}

/// Parse like C `strtoull(s, NULL, 16)`: stops at the first non-hex character, 0 when none
pub fn parse_hex_lenient(s: &str) -> u64 {
    scan_hex(s).0.unwrap_or(0)
}

/// Parse a hex number that must consume the whole token
pub fn parse_hex_strict(s: &str) -> Option<u64> {
    match scan_hex(s) {
        (Some(value), false, "") => Some(value),
        _ => None,
    }
}
