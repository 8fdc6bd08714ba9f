//! Command implementations.

pub mod documents;
pub mod history;
pub mod ingest;
pub mod profile;
pub mod qa;
pub mod tables;

pub use self::documents::{execute_chunks, execute_documents, execute_remove, execute_show};
pub use self::history::{execute_forget, execute_history};
pub use self::ingest::{execute_ingest, ingest_file};
pub use self::profile::execute_profile;
pub use self::qa::{ask_and_record, execute_ask, execute_summarize};
pub use self::tables::execute_tables;

#[cfg(test)]
pub(crate) fn test_session(response: &str) -> crate::session::Session {
    session_with(docqa_llm::MockProvider::new(response))
}

#[cfg(test)]
pub(crate) fn failing_session() -> crate::session::Session {
    session_with(docqa_llm::MockProvider::failing(docqa_llm::LlmError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }))
}

#[cfg(test)]
fn session_with(provider: docqa_llm::MockProvider) -> crate::session::Session {
    crate::session::Session::new(
        docqa_store::SqliteStore::in_memory().unwrap(),
        std::sync::Arc::new(provider),
        &crate::config::Profile::default(),
    )
    .unwrap()
}
