//! Tag key classification
//!
//! A raw key such as `addr:street` becomes the pair `("addr", "street")`;
//! keys that would be unsafe to export are filtered out entirely.

use once_cell::sync::Lazy;
use regex::Regex;

static PROBLEM_CHARS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[=+/&<>;'"?%#$@,.\s]"#).unwrap());

/// Whether a raw tag key may be exported
pub fn is_exportable(raw_key: &str) -> bool {
    !PROBLEM_CHARS_REGEX.is_match(raw_key)
}

/// Split a raw key on its first colon into `(type, key)`
///
/// Keys without a colon get `default_type`.
pub fn split_key<'a>(raw_key: &'a str, default_type: &'a str) -> (&'a str, &'a str) {
    raw_key
        .split_once(':')
        .unwrap_or((default_type, raw_key))
}
