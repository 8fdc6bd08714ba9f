//! DocQA Storage Layer
//!
//! Implements the domain store traits on top of SQLite.
//!
//! # Architecture
//!
//! - One `SqliteStore` owns one connection; it is constructed explicitly and
//!   passed to whoever needs it (the server wraps it in `Arc<Mutex<_>>`)
//! - Chunk sequences are stored as a JSON array of `{ text, start_pos, end_pos }`
//!   records in the `documents.chunks` column
//!
//! # Examples
//!
//! ```
//! use docqa_store::SqliteStore;
//!
//! let store = SqliteStore::in_memory().unwrap();
//! assert_eq!(store.table_counts().unwrap().documents, 0);
//! ```

#![warn(missing_docs)]

use docqa_domain::traits::{DocumentStore, HistoryQuery, QaHistoryStore, UserStore};
use docqa_domain::{Chunk, Document, DocumentId, QaId, QaRecord, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Chunk JSON could not be encoded or decoded
    #[error("Chunk serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unique constraint violated (e.g. email already registered)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Chunks were already stored for this document
    #[error("Chunks already attached to document {0}")]
    ChunksAlreadyAttached(DocumentId),
}

/// Row counts per table, for the database viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    /// Rows in `users`
    pub users: usize,
    /// Rows in `documents`
    pub documents: usize,
    /// Rows in `qa_history`
    pub qa_history: usize,
}

/// SQLite-based implementation of the domain stores
///
/// # Thread Safety
///
/// SQLite connections are not `Sync`. Share a store across tasks behind a mutex.
pub struct SqliteStore {
    conn: Connection,
}

const DOCUMENT_COLUMNS: &str =
    "document_id, user_id, filename, file_path, content, file_size, uploaded_at, processed, chunks";

const QA_COLUMNS: &str =
    "qa_id, user_id, document_id, question, answer, success, context_used, timestamp";

const USER_COLUMNS: &str = "user_id, username, email, password_hash, created_at, is_active";

impl SqliteStore {
    /// Open (or create) a database file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use docqa_store::SqliteStore;
    ///
    /// let store = SqliteStore::open("document_qa.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened database at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Row counts of every table
    pub fn table_counts(&self) -> Result<TableCounts, StoreError> {
        let count = |table: &str| -> Result<usize, StoreError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            users: count("users")?,
            documents: count("documents")?,
            qa_history: count("qa_history")?,
        })
    }

    /// Every registered user, oldest first
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at, user_id",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Every document regardless of owner, newest first
    pub fn list_all_documents(&self) -> Result<Vec<Document>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents ORDER BY uploaded_at DESC, document_id DESC",
            DOCUMENT_COLUMNS
        ))?;
        let documents = stmt
            .query_map([], Self::row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    /// Most recent history records regardless of owner
    pub fn list_all_history(&self, limit: usize) -> Result<Vec<QaRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM qa_history ORDER BY timestamp DESC, qa_id DESC LIMIT ?1",
            QA_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![limit as i64], Self::row_to_qa)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn parse_id<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
        let raw: String = row.get(idx)?;
        raw.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(e)),
            )
        })
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let chunks_json: Option<String> = row.get(8)?;
        let chunks = chunks_json
            .map(|json| {
                serde_json::from_str::<Vec<Chunk>>(&json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?;

        let mut document = Document::new(
            Self::parse_id::<UserId>(row, 1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i64>(5)? as u64,
        );
        document.id = Self::parse_id::<DocumentId>(row, 0)?;
        document.uploaded_at = row.get::<_, i64>(6)? as u64;
        document.processed = row.get(7)?;

        Ok(match chunks {
            Some(chunks) => document.with_chunks(chunks),
            None => document,
        })
    }

    fn row_to_qa(row: &Row<'_>) -> rusqlite::Result<QaRecord> {
        Ok(QaRecord {
            id: Self::parse_id(row, 0)?,
            owner: Self::parse_id(row, 1)?,
            document_id: Self::parse_id(row, 2)?,
            question: row.get(3)?,
            answer: row.get(4)?,
            success: row.get(5)?,
            context_used: row.get::<_, i64>(6)? as usize,
            timestamp: row.get::<_, i64>(7)? as u64,
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: Self::parse_id(row, 0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
            is_active: row.get(5)?,
        })
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn insert_document(&mut self, document: &Document) -> Result<DocumentId, Self::Error> {
        let chunks_json = if document.chunks_attached() {
            Some(serde_json::to_string(document.chunks())?)
        } else {
            None
        };

        self.conn.execute(
            &format!(
                "INSERT INTO documents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                DOCUMENT_COLUMNS
            ),
            params![
                document.id.to_string(),
                document.owner.to_string(),
                &document.filename,
                &document.file_path,
                &document.content,
                document.file_size as i64,
                document.uploaded_at as i64,
                document.processed,
                chunks_json,
            ],
        )?;

        debug!(
            "Inserted document {} ({} chunks)",
            document.id,
            document.chunks_count()
        );
        Ok(document.id)
    }

    fn attach_chunks(&mut self, id: DocumentId, chunks: &[Chunk]) -> Result<(), Self::Error> {
        let json = serde_json::to_string(chunks)?;
        let updated = self.conn.execute(
            "UPDATE documents SET chunks = ?1 WHERE document_id = ?2 AND chunks IS NULL",
            params![json, id.to_string()],
        )?;

        if updated == 0 {
            let exists: bool = self
                .conn
                .query_row(
                    "SELECT 1 FROM documents WHERE document_id = ?1",
                    params![id.to_string()],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            return Err(if exists {
                StoreError::ChunksAlreadyAttached(id)
            } else {
                StoreError::NotFound(format!("document {}", id))
            });
        }
        Ok(())
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        let document = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE document_id = ?1", DOCUMENT_COLUMNS),
                params![id.to_string()],
                Self::row_to_document,
            )
            .optional()?;
        Ok(document)
    }

    fn list_documents(&self, owner: UserId) -> Result<Vec<Document>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents WHERE user_id = ?1
             ORDER BY uploaded_at DESC, document_id DESC",
            DOCUMENT_COLUMNS
        ))?;
        let documents = stmt
            .query_map(params![owner.to_string()], Self::row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<bool, Self::Error> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM qa_history WHERE document_id = ?1",
            params![id.to_string()],
        )?;
        let deleted = tx.execute(
            "DELETE FROM documents WHERE document_id = ?1",
            params![id.to_string()],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

impl QaHistoryStore for SqliteStore {
    type Error = StoreError;

    fn record_qa(&mut self, record: &QaRecord) -> Result<QaId, Self::Error> {
        self.conn.execute(
            &format!(
                "INSERT INTO qa_history ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                QA_COLUMNS
            ),
            params![
                record.id.to_string(),
                record.owner.to_string(),
                record.document_id.to_string(),
                &record.question,
                &record.answer,
                record.success,
                record.context_used as i64,
                record.timestamp as i64,
            ],
        )?;
        Ok(record.id)
    }

    fn list_history(&self, query: &HistoryQuery) -> Result<Vec<QaRecord>, Self::Error> {
        let mut sql = format!("SELECT {} FROM qa_history WHERE user_id = ?", QA_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(query.owner.to_string())];

        if let Some(document_id) = query.document_id {
            sql.push_str(" AND document_id = ?");
            params.push(Box::new(document_id.to_string()));
        }

        sql.push_str(" ORDER BY timestamp DESC, qa_id DESC LIMIT ?");
        params.push(Box::new(query.limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(&param_refs[..], Self::row_to_qa)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn delete_qa(&mut self, owner: UserId, id: QaId) -> Result<bool, Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM qa_history WHERE qa_id = ?1 AND user_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

impl UserStore for SqliteStore {
    type Error = StoreError;

    fn create_user(&mut self, user: &User) -> Result<UserId, Self::Error> {
        let result = self.conn.execute(
            &format!("INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", USER_COLUMNS),
            params![
                user.id.to_string(),
                &user.username,
                &user.email,
                &user.password_hash,
                user.created_at as i64,
                user.is_active,
            ],
        );

        match result {
            Ok(_) => Ok(user.id),
            Err(e) if Self::is_unique_violation(&e) => Err(StoreError::Duplicate(format!(
                "user with email {}",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        let email = docqa_domain::user::normalize_email(email);
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
                params![id.to_string()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user() -> (SqliteStore, User) {
        let mut store = SqliteStore::in_memory().unwrap();
        let user = User::new("ada", "ada@example.com", "hash");
        store.create_user(&user).unwrap();
        (store, user)
    }

    #[test]
    fn test_schema_initializes_empty() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.table_counts().unwrap(), TableCounts::default());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (mut store, _) = store_with_user();
        let twin = User::new("ada2", "ADA@example.com", "hash");
        let result = store.create_user(&twin);
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_find_user_normalizes_email() {
        let (store, user) = store_with_user();
        let found = store.find_user_by_email("  Ada@Example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(store.find_user_by_id(user.id).unwrap().unwrap().username, "ada");
    }

    #[test]
    fn test_document_chunks_round_trip() {
        let (mut store, user) = store_with_user();
        let mut document = Document::new(user.id, "a.txt", "/tmp/a.txt", "Hello world.", 12);
        document
            .attach_chunks(vec![Chunk::new("Hello world.", 0, 12)])
            .unwrap();
        store.insert_document(&document).unwrap();

        let loaded = store.get_document(document.id).unwrap().unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_attach_chunks_only_once() {
        let (mut store, user) = store_with_user();
        let document = Document::new(user.id, "a.txt", "/tmp/a.txt", "text", 4);
        store.insert_document(&document).unwrap();

        store
            .attach_chunks(document.id, &[Chunk::new("text", 0, 4)])
            .unwrap();
        let again = store.attach_chunks(document.id, &[]);
        assert!(matches!(again, Err(StoreError::ChunksAlreadyAttached(_))));

        let missing = store.attach_chunks(DocumentId::new(), &[]);
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }
}
