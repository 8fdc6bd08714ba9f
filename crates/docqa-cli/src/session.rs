//! Everything a command needs to work against one profile's database.

use crate::config::Profile;
use crate::error::{CliError, Result};
use docqa_domain::traits::{DocumentStore, UserStore};
use docqa_domain::{Document, DocumentId, User};
use docqa_llm::{ChatCompletionsProvider, LlmProvider};
use docqa_pipeline::{DocumentAssistant, Ingestor};
use docqa_store::SqliteStore;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Provider handle shared by the assistant
pub type SharedProvider = Arc<dyn LlmProvider>;

/// An opened database plus the local user and pipeline built from a profile.
pub struct Session {
    store: SqliteStore,
    user: User,
    ingestor: Ingestor,
    assistant: DocumentAssistant<SharedProvider>,
}

impl Session {
    /// Open the profile's database and inference endpoint.
    pub fn open(profile: &Profile) -> Result<Self> {
        if let Some(parent) = profile.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = SqliteStore::open(&profile.database_path)?;
        let provider = ChatCompletionsProvider::new(profile.inference.clone())?;
        if profile.inference.resolve_api_key().is_none() {
            warn!(
                "No inference API key configured (set inference.api_key or {})",
                docqa_llm::settings::API_KEY_ENV
            );
        }

        Self::new(store, Arc::new(provider), profile)
    }

    /// Build a session over an existing store and provider.
    pub fn new(mut store: SqliteStore, provider: SharedProvider, profile: &Profile) -> Result<Self> {
        let user = ensure_local_user(&mut store, &profile.user_email)?;
        let ingestor = Ingestor::new(profile.pipeline.chunking)?;
        let assistant = DocumentAssistant::new(
            provider,
            profile.pipeline.budget,
            profile.inference.timeout(),
        );

        Ok(Self {
            store,
            user,
            ingestor,
            assistant,
        })
    }

    /// The local account owning ingested documents
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The underlying database
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// The underlying database, mutably
    pub fn store_mut(&mut self) -> &mut SqliteStore {
        &mut self.store
    }

    /// The configured ingestor
    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// The configured assistant
    pub fn assistant(&self) -> &DocumentAssistant<SharedProvider> {
        &self.assistant
    }

    /// Look up one of the local user's documents by its textual ID.
    pub fn document(&self, raw_id: &str) -> Result<Document> {
        let id: DocumentId = parse_id("document", raw_id)?;
        match self.store.get_document(id)? {
            Some(document) if document.owner == self.user.id => Ok(document),
            _ => Err(CliError::NotFound(format!("document {}", raw_id))),
        }
    }
}

/// Parse a textual identifier, reporting which kind was malformed.
pub fn parse_id<T>(kind: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CliError::InvalidInput(format!("invalid {} id '{}': {}", kind, raw, e)))
}

/// Find the account for `email`, creating a password-less one on first use.
///
/// The empty password hash never verifies, so the account cannot sign in
/// through the HTTP API.
pub fn ensure_local_user(store: &mut SqliteStore, email: &str) -> Result<User> {
    if let Some(user) = store.find_user_by_email(email)? {
        debug!("Using local user {}", user.id);
        return Ok(user);
    }

    let user = User::new("local", email, "");
    store.create_user(&user)?;
    info!("Created local user {} <{}>", user.id, user.email);
    Ok(user)
}
