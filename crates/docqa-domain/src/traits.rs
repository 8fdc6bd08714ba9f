//! Trait definitions for persistence
//!
//! These traits define the boundary between the ingestion/QA flows and the
//! storage infrastructure. Implementations live in `docqa-store`.

use crate::{Chunk, Document, DocumentId, QaId, QaRecord, User, UserId};

/// Default number of history records returned by a listing
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Storing and retrieving documents
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Persist a newly ingested document (including any attached chunks)
    fn insert_document(&mut self, document: &Document) -> Result<DocumentId, Self::Error>;

    /// Store the chunk sequence of a document that has none yet
    fn attach_chunks(&mut self, id: DocumentId, chunks: &[Chunk]) -> Result<(), Self::Error>;

    /// Get a document by ID
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// All documents owned by a user, newest first
    fn list_documents(&self, owner: UserId) -> Result<Vec<Document>, Self::Error>;

    /// Delete a document and its history; returns whether it existed
    fn delete_document(&mut self, id: DocumentId) -> Result<bool, Self::Error>;
}

/// Query criteria for history listings
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    /// Whose history
    pub owner: UserId,

    /// Restrict to one document
    pub document_id: Option<DocumentId>,

    /// Maximum records to return
    pub limit: usize,
}

impl HistoryQuery {
    /// All history for a user, with the default limit
    pub fn for_user(owner: UserId) -> Self {
        Self {
            owner,
            document_id: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Recording asked questions
pub trait QaHistoryStore {
    /// Error type for store operations
    type Error;

    /// Append a record
    fn record_qa(&mut self, record: &QaRecord) -> Result<QaId, Self::Error>;

    /// Records matching the query, newest first
    fn list_history(&self, query: &HistoryQuery) -> Result<Vec<QaRecord>, Self::Error>;

    /// Delete one of the user's records; returns whether it existed
    fn delete_qa(&mut self, owner: UserId, id: QaId) -> Result<bool, Self::Error>;
}

/// User accounts
pub trait UserStore {
    /// Error type for store operations
    type Error;

    /// Register a user; duplicate emails are rejected
    fn create_user(&mut self, user: &User) -> Result<UserId, Self::Error>;

    /// Look up a user by (normalized) email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error>;

    /// Look up a user by ID
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, Self::Error>;
}
