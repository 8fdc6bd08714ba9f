//! Overlapping, sentence-aware text chunking
//!
//! Text is whitespace-normalized first; every offset on a [`Chunk`] is a
//! character offset into that normalized string.

use crate::config::ChunkingConfig;
use crate::error::PipelineError;
use docqa_domain::Chunk;
use tracing::debug;

/// How far back from the tentative end a sentence boundary may be snapped to.
///
/// Fixed, and unrelated to the configured overlap.
pub const SNAP_LOOKBACK: usize = 200;

const SENTENCE_END: [char; 3] = ['.', '!', '?'];

/// Collapse whitespace runs (newlines included) to one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into overlapping chunks
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker, rejecting parameters that cannot make progress
    pub fn new(config: ChunkingConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    /// Chunk the given text
    ///
    /// Deterministic: the same text and parameters always give the same
    /// sequence. Empty or whitespace-only text gives no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let normalized = normalize_whitespace(text);
        let chars: Vec<char> = normalized.chars().collect();
        let len = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let tentative_end = start + self.chunk_size;
            let end = if tentative_end < len {
                self.snap_to_sentence(&chars, start, tentative_end)
                    .unwrap_or(tentative_end)
            } else {
                len
            };

            let piece: String = chars[start..end].iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                chunks.push(Chunk::new(piece, start, end));
            }

            if end >= len {
                break;
            }
            // end > start + overlap always holds here, so start strictly increases
            start = end - self.overlap;
        }

        debug!(
            "Chunked {} chars into {} chunks (size {}, overlap {})",
            len,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );
        chunks
    }

    /// End position just after the last sentence terminator in the window,
    /// if it lies within the lookback and still moves the cursor forward.
    fn snap_to_sentence(&self, chars: &[char], start: usize, tentative_end: usize) -> Option<usize> {
        let sentence_end = (start..tentative_end)
            .rev()
            .find(|&i| SENTENCE_END.contains(&chars[i]))?;

        let within_lookback = sentence_end + SNAP_LOOKBACK > tentative_end;
        let advances = sentence_end + 1 > start + self.overlap;

        (within_lookback && advances).then_some(sentence_end + 1)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        }
    }
}
