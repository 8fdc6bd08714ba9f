//! DocQA Pipeline
//!
//! Turns uploaded files into chunked documents and answers questions about
//! them through an inference provider.
//!
//! # Architecture
//!
//! ```text
//! file → TextExtractor → text → TextChunker → chunks ─┐
//!                                                     ▼
//! question → ContextAssembler → PromptBuilder → LlmProvider → answer
//! ```
//!
//! Every stage before inference is a pure function of its input and the
//! configuration. Inference failures are converted into fallback answers by
//! [`DocumentAssistant`]; ingestion failures reject the upload.
//!
//! # Example Usage
//!
//! ```no_run
//! use docqa_domain::UserId;
//! use docqa_llm::MockProvider;
//! use docqa_pipeline::{DocumentAssistant, IngestRequest, Ingestor, PipelineConfig};
//! use docqa_store::SqliteStore;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let mut store = SqliteStore::in_memory()?;
//! let ingestor = Ingestor::new(config.chunking)?;
//!
//! let document = ingestor.ingest(
//!     &mut store,
//!     &IngestRequest {
//!         owner: UserId::new(),
//!         filename: "notes.txt".to_string(),
//!         file_path: "uploads/notes.txt".to_string(),
//!         bytes: b"The launch is on Friday.".to_vec(),
//!     },
//! )?;
//!
//! let assistant = DocumentAssistant::new(
//!     MockProvider::new("Friday."),
//!     config.budget,
//!     Duration::from_secs(30),
//! );
//! let answer = assistant.ask(&document, "When is the launch?").await?;
//! println!("{} (success: {})", answer.answer, answer.success);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assistant;
mod chunking;
mod config;
mod context;
mod error;
mod extract;
mod ingest;
mod prompt;

pub use assistant::{DocumentAssistant, QaAnswer, SummaryOutcome, FALLBACK_ANSWER, FALLBACK_SUMMARY};
pub use chunking::{normalize_whitespace, TextChunker, SNAP_LOOKBACK};
pub use config::{ChunkingConfig, PipelineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
pub use context::{AssembledContext, ContextAssembler, NO_CONTENT_PLACEHOLDER};
pub use error::PipelineError;
pub use extract::TextExtractor;
pub use ingest::{IngestRequest, Ingestor, PreparedDocument};
pub use prompt::PromptBuilder;
