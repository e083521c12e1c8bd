//! Cleanup of raw completion text before it is decorated and sent.
//!
//! The model sometimes emits unicode emoji or an `[EMOJI]` placeholder where
//! it wanted a decoration. Both are stripped here; real decorations come
//! from the catalogue afterwards.

/// Placeholder the model writes when it tries to place an emoji itself.
pub const PLACEHOLDER_MARKER: &str = "[EMOJI]";

/// Strip placeholders and anything outside printable ASCII, collapse
/// whitespace, trim. `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let printable: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some(' '),
            ' '..='~' => Some(c),
            _ => None,
        })
        .collect();

    collapse_spaces(&remove_markers(printable))
}

fn collapse_spaces(text: &str) -> String {
    match regex_lite::Regex::new(r" {2,}").ok() {
        Some(regex) => regex.replace_all(text, " ").trim().to_string(),
        None => text.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

// Removing one marker can join the halves of another, so repeat until none remain.
fn remove_markers(mut text: String) -> String {
    while text.contains(PLACEHOLDER_MARKER) {
        text = text.replace(PLACEHOLDER_MARKER, "");
    }
    text
}
