//! Shared utility helpers.

/// Truncate a string to `max` characters, appending `…` if trimmed.
///
/// The result is at most `max` characters wide, ellipsis included, so it
/// lines up with `{:<width$}` padding (which counts chars, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
