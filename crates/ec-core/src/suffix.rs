//! Ordering of attribute names that share a common prefix.
//!
//! Declarations number repeated keys (`editor_usage`, `editor_usage1`, ...,
//! `editor_usage10`). Sorting those by byte order would put `10` before `2`,
//! so names are compared by the suffix that follows the prefix instead.

use std::cmp::Ordering;

/// Compare two names by the part following the first `prefix_len` bytes.
///
/// An empty suffix sorts first. When both suffixes parse as integers they are
/// compared numerically, otherwise lexicographically. Numerically equal
/// suffixes (`"01"` and `"1"`) fall back to lexicographic order so the result
/// is a total order.
pub fn compare_by_suffix(prefix_len: usize, a: &str, b: &str) -> Ordering {
    let suffix_a = a.get(prefix_len..).unwrap_or("");
    let suffix_b = b.get(prefix_len..).unwrap_or("");

    match (suffix_a.is_empty(), suffix_b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match (suffix_a.parse::<i64>(), suffix_b.parse::<i64>()) {
        (Ok(num_a), Ok(num_b)) => num_a.cmp(&num_b).then_with(|| suffix_a.cmp(suffix_b)),
        _ => suffix_a.cmp(suffix_b),
    }
}

/// Extract the suffix of `key` after a case-insensitive `prefix`.
///
/// Returns `None` when `key` does not start with `prefix`.
pub fn suffix_of<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with_ignore_case(key, prefix) {
        key.get(prefix.len()..)
    } else {
        None
    }
}

/// ASCII case-insensitive `starts_with`.
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
