//! Document ingestion: extract, normalize, chunk, persist

use crate::chunking::{normalize_whitespace, TextChunker};
use crate::config::ChunkingConfig;
use crate::error::PipelineError;
use crate::extract::TextExtractor;
use docqa_domain::traits::DocumentStore;
use docqa_domain::{Chunk, Document, UserId};
use std::fmt::Display;
use tracing::{info, warn};

/// An uploaded file waiting to become a document
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Uploading user
    pub owner: UserId,

    /// Original filename; its extension selects the extractor
    pub filename: String,

    /// Where the upload was stored
    pub file_path: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Turns uploads into chunked, persisted documents
#[derive(Debug, Clone, Copy)]
pub struct Ingestor {
    extractor: TextExtractor,
    chunker: TextChunker,
}

impl Ingestor {
    /// Create an ingestor with the given chunking parameters
    pub fn new(chunking: ChunkingConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: TextExtractor::new(),
            chunker: TextChunker::new(chunking)?,
        })
    }

    /// Extract and chunk an upload without touching any store
    ///
    /// This is the expensive part of ingestion and needs no coordination, so
    /// callers sharing a store should run it before taking their lock.
    /// Unsupported extensions fail before any extraction work. A blank
    /// extraction result is an [`PipelineError::ExtractionFailure`].
    pub fn prepare(&self, request: &IngestRequest) -> Result<PreparedDocument, PipelineError> {
        let raw = self.extractor.extract_bytes(&request.filename, &request.bytes)?;
        let content = normalize_whitespace(&raw);

        if content.is_empty() {
            return Err(PipelineError::ExtractionFailure(format!(
                "could not extract text from '{}'",
                request.filename
            )));
        }

        let chunks = self.chunker.chunk(&content);
        let document = Document::new(
            request.owner,
            request.filename.clone(),
            request.file_path.clone(),
            content,
            request.bytes.len() as u64,
        );
        Ok(PreparedDocument { document, chunks })
    }

    /// Store a prepared document and attach its chunks
    ///
    /// The document row is written first and its chunks attached once
    /// afterwards; if attaching fails the row is removed again.
    pub fn persist<S>(store: &mut S, prepared: PreparedDocument) -> Result<Document, PipelineError>
    where
        S: DocumentStore,
        S::Error: Display,
    {
        let PreparedDocument {
            mut document,
            chunks,
        } = prepared;

        store
            .insert_document(&document)
            .map_err(|e| PipelineError::Store(e.to_string()))?;

        if let Err(e) = store.attach_chunks(document.id, &chunks) {
            warn!("Failed to attach chunks to document {}: {}", document.id, e);
            if let Err(cleanup) = store.delete_document(document.id) {
                warn!("Failed to remove partial document {}: {}", document.id, cleanup);
            }
            return Err(PipelineError::Store(e.to_string()));
        }
        document.attach_chunks(chunks)?;

        info!(
            "Ingested '{}' as document {} ({} bytes, {} chars, {} chunks)",
            document.filename,
            document.id,
            document.file_size,
            document.content.chars().count(),
            document.chunks_count()
        );
        Ok(document)
    }

    /// Extract, chunk and store an upload in one step
    pub fn ingest<S>(&self, store: &mut S, request: &IngestRequest) -> Result<Document, PipelineError>
    where
        S: DocumentStore,
        S::Error: Display,
    {
        let prepared = self.prepare(request)?;
        Self::persist(store, prepared)
    }
}

/// An extracted and chunked upload that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    document: Document,
    chunks: Vec<Chunk>,
}

impl PreparedDocument {
    /// The document, still without chunks
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The chunks that will be attached on persist
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self {
            extractor: TextExtractor::new(),
            chunker: TextChunker::default(),
        }
    }
}
