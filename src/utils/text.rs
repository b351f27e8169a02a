//! Text processing utilities.

/// Turn a unit title into a filesystem-safe artifact key.
///
/// ASCII alphanumerics and `-` pass through; every other byte is escaped as
/// `_xx` (lowercase hex), including `_` itself. The mapping is deterministic
/// and injective, so distinct unit titles never collide on disk.
pub fn sanitize_unit_key(unit: &str) -> String {
    let mut key = String::with_capacity(unit.len());
    for byte in unit.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => key.push(byte as char),
            _ => {
                key.push('_');
                key.push_str(&format!("{:02x}", byte));
            }
        }
    }
    key
}

/// Truncate a string to at most `budget` characters, respecting char
/// boundaries.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_passthrough() {
        assert_eq!(sanitize_unit_key("Chapter-3"), "Chapter-3");
    }

    #[test]
    fn test_sanitize_escapes_spaces_and_underscores() {
        assert_eq!(sanitize_unit_key("UNIT 1"), "UNIT_201");
        // Underscore is escaped too, so "UNIT 1" and "UNIT_1" stay distinct.
        assert_eq!(sanitize_unit_key("UNIT_1"), "UNIT_5f1");
    }

    #[test]
    fn test_sanitize_deterministic() {
        assert_eq!(
            sanitize_unit_key("Full Book"),
            sanitize_unit_key("Full Book")
        );
        assert_ne!(sanitize_unit_key("a/b"), sanitize_unit_key("a_b"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        // Multi-byte chars are not split.
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
