//! Chunk and context budget value types

use serde::{Deserialize, Serialize};

/// Default number of chunks considered when assembling a context
pub const DEFAULT_MAX_CHUNKS: usize = 10;

/// Default character budget for an assembled context
pub const DEFAULT_MAX_CHARS: usize = 3000;

/// A bounded, positioned substring of a document's normalized text
///
/// `start_pos` and `end_pos` are character offsets into the whitespace-collapsed
/// text, not byte offsets into the original file. Consecutive chunks of one
/// document have strictly increasing `start_pos` and may overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text
    pub text: String,

    /// Offset of the first character of the window
    pub start_pos: usize,

    /// Offset one past the last character of the window
    pub end_pos: usize,
}

impl Chunk {
    /// Create a chunk
    pub fn new(text: impl Into<String>, start_pos: usize, end_pos: usize) -> Self {
        Self {
            text: text.into(),
            start_pos,
            end_pos,
        }
    }

    /// Length of the chunk text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Character and count limits on how much chunk text goes into one prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    /// Maximum number of chunks inspected, in document order
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Maximum length of the joined chunk text, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl ContextBudget {
    /// Create a validated budget
    ///
    /// # Examples
    ///
    /// ```
    /// use docqa_domain::ContextBudget;
    ///
    /// let budget = ContextBudget::new(5, 1200).unwrap();
    /// assert_eq!(budget.max_chunks, 5);
    /// assert!(ContextBudget::new(0, 1200).is_err());
    /// ```
    pub fn new(max_chunks: usize, max_chars: usize) -> Result<Self, String> {
        let budget = Self {
            max_chunks,
            max_chars,
        };
        budget.validate()?;
        Ok(budget)
    }

    /// Check both limits are positive
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunks == 0 {
            return Err("max_chunks must be greater than 0".to_string());
        }
        if self.max_chars == 0 {
            return Err("max_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}
