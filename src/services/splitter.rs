//! Splitting a full document into named units by heading pattern.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::UnitMap;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Chapter \d+|Unit \d+)").expect("valid heading pattern")
});

/// Split `full_text` into units at `Chapter <n>` / `Unit <n>` headings
/// (case-insensitive).
///
/// Each unit spans from its heading to the start of the next heading, or to
/// the end of the document, with surrounding whitespace trimmed. Text before
/// the first heading is not part of any unit. Duplicate headings follow
/// [`UnitMap::insert`]'s last-wins policy.
pub fn split_into_units(full_text: &str) -> UnitMap {
    let matches: Vec<_> = HEADING.find_iter(full_text).collect();

    let mut units = UnitMap::new();
    for (i, m) in matches.iter().enumerate() {
        let start = m.start();
        let end = matches
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(full_text.len());
        units.insert(m.as_str(), full_text[start..end].trim());
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_in_document_order() {
        let text = "Chapter 1\nalpha text\nChapter 2\nbeta text\nChapter 3\ngamma text";
        let units = split_into_units(text);
        let titles: Vec<&str> = units.titles().collect();
        assert_eq!(titles, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    }

    #[test]
    fn test_unit_span_ends_at_next_heading() {
        let text = "Chapter 1\nalpha text\nChapter 2\nbeta text";
        let units = split_into_units(text);
        assert_eq!(units.get("Chapter 1"), Some("Chapter 1\nalpha text"));
        assert_eq!(units.get("Chapter 2"), Some("Chapter 2\nbeta text"));
    }

    #[test]
    fn test_preamble_discarded() {
        let text = "preface material nobody indexes\nChapter 1\ncontent";
        let units = split_into_units(text);
        assert_eq!(units.len(), 1);
        assert_eq!(units.get("Chapter 1"), Some("Chapter 1\ncontent"));
    }

    #[test]
    fn test_case_insensitive_and_unit_headings() {
        let text = "chapter 1\none\nUNIT 2\ntwo";
        let units = split_into_units(text);
        let titles: Vec<&str> = units.titles().collect();
        assert_eq!(titles, vec!["chapter 1", "UNIT 2"]);
    }

    #[test]
    fn test_no_headings_yields_empty_map() {
        assert!(split_into_units("plain text with no headings").is_empty());
    }

    #[test]
    fn test_duplicate_heading_last_wins() {
        let text = "Chapter 1\nfirst\nChapter 2\nmid\nChapter 1\nsecond";
        let units = split_into_units(text);
        assert_eq!(units.len(), 2);
        assert_eq!(units.get("Chapter 1"), Some("Chapter 1\nsecond"));
    }
}
