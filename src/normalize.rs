//! Whitespace normalization for free-text metadata fields.

/// Collapse every run of whitespace (including CR, LF and tabs) into a single
/// ASCII space and strip the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
