//! Relay envelope formatting.

use crate::common::Network;

/// Format a message for the opposite network: `[ORIGIN] author: content`.
///
/// Content is passed through untouched.
pub fn format_envelope(origin: Network, author: &str, content: &str) -> String {
    format!("[{}] {}: {}", origin.tag(), author, content)
}

/// Format `content` as one or more envelopes of at most `max_bytes` each.
///
/// Splits on UTF-8 character boundaries and repeats the `[ORIGIN] author: `
/// tag on every piece. Empty content yields no envelopes.
pub fn split_envelope(origin: Network, author: &str, content: &str, max_bytes: usize) -> Vec<String> {
    let tag = format_envelope(origin, author, "");
    let room = max_bytes.saturating_sub(tag.len()).max(1);

    let mut envelopes = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        let mut end = rest.len().min(room);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // Room is smaller than the next character; send it alone.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (piece, tail) = rest.split_at(end);
        envelopes.push(format!("{}{}", tag, piece));
        rest = tail;
    }
    envelopes
}
