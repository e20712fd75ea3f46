//! Numeric literal validation.
//!
//! Only plain ASCII decimal forms are accepted: an optional sign, digits, and
//! for floating point values at most one `.`. Exponents and locale separators
//! are rejected.

/// Checks that the string is made only of ascii digits
pub fn is_pure_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Checks that the string is an integer with an optional leading sign
pub fn is_signed_integer(s: &str) -> bool {
    is_pure_integer(strip_sign(s))
}

/// Checks that the string is a decimal number with an optional leading sign
/// and at most one decimal point
pub fn is_floating_point(s: &str) -> bool {
    let unsigned = strip_sign(s);
    let mut digits = 0_usize;
    let mut dots = 0_usize;
    for b in unsigned.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Parses an integer literal, if it passes [`is_signed_integer`] and fits in an `i64`
pub fn parse_int(s: &str) -> Option<i64> {
    if is_signed_integer(s) {
        s.parse().ok()
    } else {
        None
    }
}

/// Parses a float literal, if it passes [`is_floating_point`]
pub fn parse_float(s: &str) -> Option<f64> {
    if is_floating_point(s) {
        s.parse().ok()
    } else {
        None
    }
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}
