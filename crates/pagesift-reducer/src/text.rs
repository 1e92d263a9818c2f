//! Text helpers shared by the strategies

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// # Examples
///
/// ```
/// use pagesift_reducer::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Flight\n\n UA123\tdeparts "), "Flight UA123 departs");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset `chars` characters before `byte`, clamped to the start.
pub(crate) fn back_chars(text: &str, byte: usize, chars: usize) -> usize {
    if chars == 0 {
        return byte;
    }
    text[..byte]
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map_or(byte, |(i, _)| i)
}

/// Byte offset `chars` characters after `byte`, clamped to the end.
pub(crate) fn forward_chars(text: &str, byte: usize, chars: usize) -> usize {
    text[byte..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| byte + i)
}
