//! Separator-aware text chunking

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const PARAGRAPH_BREAK: &str = "\n\n";

/// Splits text into bounded-size chunks with no overlap.
///
/// Boundaries prefer, in order: paragraph breaks, sentence boundaries, word
/// boundaries, and finally hard character cuts when a single word exceeds
/// the budget. Adjacent fragments are merged greedily up to the budget, so
/// concatenating the chunks reproduces the input modulo whitespace trimmed
/// at chunk edges.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
}

impl TextChunker {
    /// Create a new chunker. A zero budget is a configuration error.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    /// Configured chunk budget in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    ///
    /// Empty or whitespace-only input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut fragments: Vec<&str> = Vec::new();

        for paragraph in text.split_inclusive(PARAGRAPH_BREAK) {
            if self.fits(paragraph) {
                fragments.push(paragraph);
                continue;
            }
            for sentence in paragraph.split_sentence_bounds() {
                if self.fits(sentence) {
                    fragments.push(sentence);
                    continue;
                }
                for word in sentence.split_word_bounds() {
                    if self.fits(word) {
                        fragments.push(word);
                    } else {
                        self.hard_cut(word, &mut fragments);
                    }
                }
            }
        }

        self.merge(fragments)
    }

    fn fits(&self, fragment: &str) -> bool {
        fragment.chars().count() <= self.chunk_size
    }

    /// Cut an oversized fragment into budget-sized windows at char boundaries
    fn hard_cut<'a>(&self, fragment: &'a str, out: &mut Vec<&'a str>) {
        let mut start = 0;
        let mut count = 0;
        for (idx, _) in fragment.char_indices() {
            if count == self.chunk_size {
                out.push(&fragment[start..idx]);
                start = idx;
                count = 0;
            }
            count += 1;
        }
        if start < fragment.len() {
            out.push(&fragment[start..]);
        }
    }

    /// Greedily merge fragments up to the budget. Every fragment is already
    /// within budget, so every merged chunk is too.
    fn merge(&self, fragments: Vec<&str>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for fragment in fragments {
            let fragment_len = fragment.chars().count();
            if current_len > 0 && current_len + fragment_len > self.chunk_size {
                Self::flush(&mut chunks, &mut current);
                current_len = 0;
            }
            current.push_str(fragment);
            current_len += fragment_len;
        }
        Self::flush(&mut chunks, &mut current);

        chunks
    }

    fn flush(chunks: &mut Vec<String>, current: &mut String) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(TextChunker::new(0).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(400).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  \t").is_empty());
    }

    #[test]
    fn test_chunk_size_bound() {
        let chunker = TextChunker::new(50).unwrap();
        let text = "The quick brown fox jumps over the lazy dog. \
                    Pack my box with five dozen liquor jugs. \
                    How vexingly quick daft zebras jump!\n\n\
                    Sphinx of black quartz, judge my vow.";
        for chunk in chunker.split(text) {
            assert!(
                chunk.chars().count() <= 50,
                "chunk exceeds budget: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_reconstruction_preserves_content() {
        let chunker = TextChunker::new(40).unwrap();
        let text = "First paragraph with several words in it.\n\n\
                    Second paragraph. It has two sentences.\n\n\
                    Third one is short.";
        let chunks = chunker.split(text);
        assert_eq!(
            strip_whitespace(&chunks.join("")),
            strip_whitespace(text),
            "concatenated chunks must reproduce the input content"
        );
    }

    #[test]
    fn test_unbroken_text_hard_cuts() {
        let chunker = TextChunker::new(400).unwrap();
        let text = "x".repeat(1000);
        let chunks = chunker.split(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1].len(), 400);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_prose_of_1000_chars_fills_three_chunks() {
        // 40 sentences of 25 chars each: merges to 400/400/200 characters
        // before edge trimming.
        let sentence = "Water finds its own way. "; // 25 chars
        let text = sentence.repeat(40);
        assert_eq!(text.chars().count(), 1000);

        let chunker = TextChunker::new(400).unwrap();
        let chunks = chunker.split(&text);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 400);
        }
    }

    #[test]
    fn test_budget_counts_chars_not_bytes() {
        let chunker = TextChunker::new(4).unwrap();
        let text = "éééééééééé"; // 10 chars, 20 bytes
        let chunks = chunker.split(text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 4);
        assert_eq!(chunks[2].chars().count(), 2);
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let chunker = TextChunker::new(30).unwrap();
        let text = "One short sentence. Another short one. A third one here.";
        let chunks = chunker.split(text);
        // No sentence is split mid-word when it fits the budget
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
        assert!(chunks[0].starts_with("One short sentence."));
    }
}
