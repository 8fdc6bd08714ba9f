//! Question/answer history records

use crate::id::{DocumentId, QaId, UserId};
use serde::{Deserialize, Serialize};

/// One asked question and the answer returned for it
///
/// Recorded whether or not inference succeeded, so history has a uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    /// Unique identifier
    #[serde(rename = "qa_id")]
    pub id: QaId,

    /// Who asked
    #[serde(skip)]
    pub owner: UserId,

    /// Document the question was asked against
    pub document_id: DocumentId,

    /// The question as asked (trimmed)
    pub question: String,

    /// The answer, or the fallback text when inference failed
    pub answer: String,

    /// Whether inference succeeded
    pub success: bool,

    /// Number of chunks included in the prompt context
    pub context_used: usize,

    /// When the question was answered (seconds since Unix epoch)
    pub timestamp: u64,
}

impl QaRecord {
    /// Create a new record stamped with the current time
    pub fn new(
        owner: UserId,
        document_id: DocumentId,
        question: impl Into<String>,
        answer: impl Into<String>,
        success: bool,
        context_used: usize,
    ) -> Self {
        Self {
            id: QaId::new(),
            owner,
            document_id,
            question: question.into(),
            answer: answer.into(),
            success,
            context_used,
            timestamp: crate::unix_now(),
        }
    }
}
