/// Cuts `text` after at most `limit` characters without splitting a
/// multi-byte character. The flag tells whether anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Number of characters, not bytes
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), ("hello", false));
        assert_eq!(truncate_chars("hello", 5), ("hello", false));
        assert_eq!(truncate_chars("", 0), ("", false));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), ("héll", true));
        assert_eq!(truncate_chars("日本語テキスト", 3), ("日本語", true));
    }

    #[test]
    fn test_char_count() {
        assert_eq!(char_count("日本語"), 3);
        assert_eq!(char_count("abc"), 3);
    }
}
