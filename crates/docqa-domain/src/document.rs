//! Document module - an uploaded file and its chunk sequence

use crate::chunk::Chunk;
use crate::id::{DocumentId, UserId};
use thiserror::Error;

/// Maximum number of characters shown by [`Document::content_preview`]
pub const PREVIEW_CHARS: usize = 500;

/// Errors raised by document lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Chunks can be attached exactly once, at ingestion time
    #[error("Chunks already attached to document {0}")]
    ChunksAlreadyAttached(DocumentId),
}

/// An uploaded document
///
/// The content and chunk sequence are produced once at upload time. After the
/// one-time [`attach_chunks`](Document::attach_chunks) the document is read-only;
/// a re-upload creates a new document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Owning user
    pub owner: UserId,

    /// Original (sanitized) filename, also used as the document title
    pub filename: String,

    /// Where the uploaded bytes are kept
    pub file_path: String,

    /// Extracted text
    pub content: String,

    /// Size of the uploaded file in bytes
    pub file_size: u64,

    /// Upload time (seconds since Unix epoch)
    pub uploaded_at: u64,

    /// Whether ingestion finished
    pub processed: bool,

    chunks: Option<Vec<Chunk>>,
}

impl Document {
    /// Create a new document with no chunks attached yet
    pub fn new(
        owner: UserId,
        filename: impl Into<String>,
        file_path: impl Into<String>,
        content: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            owner,
            filename: filename.into(),
            file_path: file_path.into(),
            content: content.into(),
            file_size,
            uploaded_at: crate::unix_now(),
            processed: true,
            chunks: None,
        }
    }

    /// Rehydrate a persisted chunk sequence
    ///
    /// Intended for storage layers loading a document that was already ingested.
    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.chunks = Some(chunks);
        self
    }

    /// Attach the chunk sequence produced by ingestion
    pub fn attach_chunks(&mut self, chunks: Vec<Chunk>) -> Result<(), DocumentError> {
        if self.chunks.is_some() {
            return Err(DocumentError::ChunksAlreadyAttached(self.id));
        }
        self.chunks = Some(chunks);
        Ok(())
    }

    /// Whether ingestion has attached chunks
    pub fn chunks_attached(&self) -> bool {
        self.chunks.is_some()
    }

    /// The ordered chunk sequence (empty before ingestion)
    pub fn chunks(&self) -> &[Chunk] {
        self.chunks.as_deref().unwrap_or(&[])
    }

    /// Number of chunks
    pub fn chunks_count(&self) -> usize {
        self.chunks().len()
    }

    /// Title used in prompts and listings
    pub fn title(&self) -> &str {
        &self.filename
    }

    /// First [`PREVIEW_CHARS`] characters of the content, with `...` when cut
    pub fn content_preview(&self) -> String {
        let mut chars = self.content.chars();
        let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", preview)
        } else {
            preview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document::new(UserId::new(), "notes.txt", "/tmp/notes.txt", content, 42)
    }

    #[test]
    fn test_attach_chunks_once() {
        let mut document = doc("Hello world.");
        assert!(!document.chunks_attached());
        assert!(document.chunks().is_empty());

        document
            .attach_chunks(vec![Chunk::new("Hello world.", 0, 12)])
            .unwrap();
        assert_eq!(document.chunks_count(), 1);

        let again = document.attach_chunks(vec![]);
        assert_eq!(again, Err(DocumentError::ChunksAlreadyAttached(document.id)));
        assert_eq!(document.chunks_count(), 1);
    }

    #[test]
    fn test_empty_chunk_sequence_counts_as_attached() {
        let mut document = doc("");
        document.attach_chunks(Vec::new()).unwrap();
        assert!(document.chunks_attached());
        assert!(document.attach_chunks(Vec::new()).is_err());
    }

    #[test]
    fn test_content_preview_short() {
        assert_eq!(doc("short").content_preview(), "short");
    }

    #[test]
    fn test_content_preview_truncates() {
        let content = "x".repeat(PREVIEW_CHARS + 1);
        let preview = doc(&content).content_preview();
        assert_eq!(preview.len(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_content_preview_exact_length() {
        let content = "y".repeat(PREVIEW_CHARS);
        assert_eq!(doc(&content).content_preview(), content);
    }
}
