//! Retrieval-related models: scored chunks and the ordered unit map.

use serde::{Deserialize, Serialize};

/// A chunk returned by a similarity search, with its L2 distance to the
/// query (lower = more similar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub distance: f32,
}

/// An insertion-ordered mapping from unit title to unit text.
///
/// Iteration follows document order. Inserting a title that already exists
/// replaces its text in place (last occurrence wins) without moving the
/// entry; a document with two identical headings keeps a single unit holding
/// the later span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitMap {
    entries: Vec<(String, String)>,
}

impl UnitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, text: impl Into<String>) {
        let title = title.into();
        let text = text.into();
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == title) {
            entry.1 = text;
        } else {
            self.entries.push((title, text));
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(title, text)| (title.as_str(), text.as_str()))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(title, _)| title.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut map = UnitMap::new();
        map.insert("Chapter 1", "one");
        map.insert("Chapter 2", "two");
        map.insert("Chapter 3", "three");
        let titles: Vec<&str> = map.titles().collect();
        assert_eq!(titles, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    }

    #[test]
    fn test_duplicate_title_last_wins_in_place() {
        let mut map = UnitMap::new();
        map.insert("Chapter 1", "first");
        map.insert("Chapter 2", "middle");
        map.insert("Chapter 1", "second");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Chapter 1"), Some("second"));
        let titles: Vec<&str> = map.titles().collect();
        assert_eq!(titles, vec!["Chapter 1", "Chapter 2"]);
    }
}
