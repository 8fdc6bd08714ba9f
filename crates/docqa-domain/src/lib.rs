//! DocQA Domain Layer
//!
//! Typed records and persistence boundaries for the document question-answering
//! system. Nothing in this crate performs I/O; infrastructure implementations of
//! the traits in [`traits`] live in other crates.
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded, positioned substring of a document's normalized text
//! - **Context Budget**: character/count limits on the text assembled into one prompt
//! - **Document**: an uploaded file's extracted content plus its chunk sequence
//! - **QaRecord**: one asked question and the answer that was returned
//! - **User**: the owner of documents and history

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod document;
pub mod format;
pub mod id;
pub mod qa;
pub mod traits;
pub mod user;

pub use chunk::{Chunk, ContextBudget, DEFAULT_MAX_CHARS, DEFAULT_MAX_CHUNKS};
pub use document::{Document, DocumentError};
pub use format::DocumentFormat;
pub use id::{DocumentId, QaId, UserId};
pub use qa::QaRecord;
pub use user::User;

/// Current time as seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
