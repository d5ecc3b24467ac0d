//! Lenient parsing of string-valued query parameters.

use std::collections::HashMap;

/// Raw query string parameters as received by a list endpoint.
pub type RawParams = HashMap<String, String>;

/// Value of `key` unless absent or empty.
pub fn non_empty<'a>(params: &'a RawParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Positive integer from the leading digits, so `"2.5"` is 2 and `"3abc"` is 3.
/// No leading digits, zero and negative inputs are all None.
pub fn positive_int(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let n = rest[..end].parse::<u64>().ok()?;
    if negative || n == 0 {
        None
    } else {
        Some(n)
    }
}

/// Number for range bounds. Malformed input yields NaN rather than an error.
pub fn number_or_nan(key: &str, raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(param = key, value = raw, "non-numeric range bound, using NaN");
            f64::NAN
        }
    }
}

/// `true` only for the literal string "true".
pub fn flag(raw: &str) -> bool {
    raw == "true"
}
