//! Field-level text rules. Each helper returns a slice of its input (or of the
//! supplied label) so callers can compare against the original before
//! allocating.

/// Trims leading/trailing whitespace.
pub fn trim(input: &str) -> &str {
    input.trim()
}

/// Replaces the whole value with `label` when it starts with `prefix`.
pub fn fold_prefix<'a>(input: &'a str, prefix: &str, label: &'a str) -> &'a str {
    if input.starts_with(prefix) {
        label
    } else {
        input
    }
}

/// Strips every trailing `ch` from values that start with `prefix`.
pub fn strip_trailing_when<'a>(input: &'a str, prefix: &str, ch: char) -> &'a str {
    if input.starts_with(prefix) {
        input.trim_end_matches(ch)
    } else {
        input
    }
}
