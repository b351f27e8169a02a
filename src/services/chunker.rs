//! Overlapping word-window chunking of unit text.

use crate::error::ChunkError;
use crate::models::IndexingConfig;

/// Splits text into overlapping windows of whitespace-separated words.
///
/// The window holds `max_tokens` words and advances by `max_tokens - overlap`
/// words per step; the final window takes whatever words remain, so no empty
/// trailing chunk is emitted and the walk always terminates.
#[derive(Debug, Clone)]
pub struct WordChunker {
    max_tokens: usize,
    overlap: usize,
}

impl WordChunker {
    /// Create a chunker, rejecting parameter combinations that would not
    /// terminate: `max_tokens` must be positive and `overlap` strictly
    /// smaller than `max_tokens`.
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self, ChunkError> {
        if max_tokens == 0 {
            return Err(ChunkError::InvalidConfiguration(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if overlap >= max_tokens {
            return Err(ChunkError::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than max_tokens ({})",
                overlap, max_tokens
            )));
        }
        Ok(Self {
            max_tokens,
            overlap,
        })
    }

    /// Create a chunker from the indexing configuration.
    pub fn from_config(config: &IndexingConfig) -> Result<Self, ChunkError> {
        Self::new(config.chunk_max_tokens as usize, config.chunk_overlap as usize)
    }

    /// Chunk `text` into overlapping word windows, each re-joined with
    /// single spaces. Empty or whitespace-only input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        // Guarded by the constructor, but the clamp keeps the walk finite
        // under any parameter combination.
        let stride = (self.max_tokens - self.overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.max_tokens).min(words.len());
            chunks.push(words[start..end].join(" "));
            if start + self.max_tokens >= words.len() {
                break;
            }
            start += stride;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sliding_window_example() {
        let chunker = WordChunker::new(3, 1).unwrap();
        assert_eq!(
            chunker.chunk("a b c d e f g"),
            vec!["a b c", "c d e", "e f g"]
        );
    }

    #[test]
    fn test_deterministic() {
        let chunker = WordChunker::new(4, 2).unwrap();
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(chunker.chunk(text), chunker.chunk(text));
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = WordChunker::new(100, 10).unwrap();
        assert_eq!(chunker.chunk("just a few words"), vec!["just a few words"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunker = WordChunker::new(3, 1).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t ").is_empty());
    }

    #[test]
    fn test_no_empty_trailing_chunk() {
        // 6 words, window 3, stride 3: exactly two windows, no empty third.
        let chunker = WordChunker::new(3, 0).unwrap();
        assert_eq!(chunker.chunk("a b c d e f"), vec!["a b c", "d e f"]);
    }

    #[test]
    fn test_chunk_count_bound() {
        let chunker = WordChunker::new(10, 4).unwrap();
        let words: Vec<String> = (0..1000).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let chunks = chunker.chunk(&text);
        // ceil((L - overlap) / stride) with L=1000, overlap=4, stride=6
        let expected = (1000usize - 4).div_ceil(6);
        assert_eq!(chunks.len(), expected);
    }

    #[test]
    fn test_overlap_reconstructs_word_sequence() {
        let chunker = WordChunker::new(5, 2).unwrap();
        let text = "one two three four five six seven eight nine ten eleven";
        let chunks = chunker.chunk(text);

        // Every window after the first repeats the previous window's last
        // `overlap` words; dropping them reconstructs the original sequence.
        let mut rebuilt: Vec<&str> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let words: Vec<&str> = chunk.split_whitespace().collect();
            let skip = if i == 0 { 0 } else { 2 };
            rebuilt.extend(&words[skip..]);
        }
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(matches!(
            WordChunker::new(0, 0),
            Err(ChunkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            WordChunker::new(3, 3),
            Err(ChunkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            WordChunker::new(3, 5),
            Err(ChunkError::InvalidConfiguration(_))
        ));
    }
}
