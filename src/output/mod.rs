// Output formatting: terminal display and log previews.

pub mod terminal;

/// Shorten `text` to `max_chars` characters for log lines and error bodies,
/// appending "..." when anything was cut. Counts chars, not bytes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
