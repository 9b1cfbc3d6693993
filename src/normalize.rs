//! Free-text numeric input normalization.
//!
//! Users type numbers the way their locale writes them: `1,234.56`,
//! `1.234,56`, `12,5`. This module turns such text into a canonical
//! [`Decimal`] using a separator heuristic, then parses the longest numeric
//! prefix the way a lenient float parser does. It never fails: anything that
//! cannot be read as a number is zero.
//!
//! The heuristic is inherently ambiguous for a single separator followed by
//! exactly three digits. `12,500` and `1.500` are read as grouped thousands,
//! so `0.001` normalizes to 1. Downstream sizing depends on this reading.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Normalizes `raw` into a number. Empty or unparseable input yields zero.
pub fn normalize(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    let canonical = canonicalize_separators(trimmed);
    parse_numeric_prefix(&canonical).unwrap_or(Decimal::ZERO)
}

/// Reads a percentage such as `2%` or `1,5 %`. Returns None when `raw` has
/// no percent marker, so callers can fall back to an absolute amount.
pub fn normalize_percent(raw: &str) -> Option<Decimal> {
    if !raw.contains('%') {
        return None;
    }
    Some(normalize(&raw.replacen('%', "", 1)))
}

/// Rewrites `s` so that `.` is the only decimal separator and grouping
/// separators are gone.
fn canonicalize_separators(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    match (last_comma, last_dot) {
        // both present: whichever comes last is the decimal point
        (Some(comma), Some(dot)) => {
            if comma > dot {
                s.replace('.', "").replacen(',', ".", 1)
            } else {
                s.replace(',', "")
            }
        }
        (Some(_), None) => {
            let parts: Vec<&str> = s.split(',').collect();
            if parts.len() == 2 && parts[1].chars().count() != 3 {
                s.replacen(',', ".", 1)
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) => {
            let parts: Vec<&str> = s.split('.').collect();
            let grouped = parts.len() > 2 || (parts.len() == 2 && parts[1].chars().count() == 3);
            if grouped {
                s.replace('.', "")
            } else {
                s.to_string()
            }
        }
        (None, None) => s.to_string(),
    }
}

/// Parses the longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
/// Trailing garbage is ignored, so `12abc` is 12.
fn parse_numeric_prefix(s: &str) -> Option<Decimal> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    let mut mantissa_end = end;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut cursor = end + 1;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        frac_digits = cursor - end - 1;
        // a bare "5." still counts as 5
        mantissa_end = if frac_digits > 0 { cursor } else { end };
        end = cursor;
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    let mut exponent: Option<&str> = None;
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exp_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exp_start {
            exponent = Some(&s[end + 1..cursor]);
        }
    }

    let mut mantissa = s[..mantissa_end].trim_start_matches('+').to_string();
    if int_digits == 0 {
        // ".5" and "-.5" need a leading zero
        let insert_at = usize::from(mantissa.starts_with('-'));
        mantissa.insert(insert_at, '0');
    }

    let value = Decimal::from_str(&mantissa).ok()?;
    match exponent {
        None => Some(value),
        Some(exp) => apply_exponent(value, exp),
    }
}

/// Scales by a power of ten. A non-zero value overflows or underflows
/// within a few dozen steps, so only zero needs an early exit.
fn apply_exponent(value: Decimal, exp: &str) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }
    let exp: i32 = exp.trim_start_matches('+').parse().ok()?;
    let ten = Decimal::TEN;
    let mut result = value;
    if exp >= 0 {
        for _ in 0..exp {
            result = result.checked_mul(ten)?;
        }
    } else {
        for _ in 0..exp.unsigned_abs() {
            // stop once the value underflows to zero, 1e-400 is just 0
            if result.is_zero() {
                break;
            }
            result = result.checked_div(ten)?;
        }
    }
    Some(result)
}
