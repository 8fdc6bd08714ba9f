//! Error types for the document pipeline

use docqa_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while ingesting or querying a document
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File extension is not one of the supported formats
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Nothing usable could be extracted from the file
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    /// Invalid chunking or budget parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inference gateway failure
    #[error("Inference error: {0}")]
    Inference(#[from] LlmError),

    /// Persistence collaborator error
    #[error("Store error: {0}")]
    Store(String),

    /// Rejected request input (e.g. an empty question)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<docqa_store::StoreError> for PipelineError {
    fn from(e: docqa_store::StoreError) -> Self {
        PipelineError::Store(e.to_string())
    }
}

impl From<docqa_domain::DocumentError> for PipelineError {
    fn from(e: docqa_domain::DocumentError) -> Self {
        PipelineError::Store(e.to_string())
    }
}
