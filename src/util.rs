// ABOUTME: Utility functions for filenames and log previews
// ABOUTME: Provides filesystem-safe titles and UTF-8 safe truncation

const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces characters that are invalid in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if FORBIDDEN_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Shortens `s` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((boundary, _)) => format!("{}...", &s[..boundary]),
    }
}
