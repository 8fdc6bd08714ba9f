//! HTTP request handlers.
//!
//! Authentication, document management, question answering, history and
//! health endpoints under `/api`, implemented with axum.

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::config::{ConfigError, ServerConfig};
use crate::session::{SessionError, SessionManager};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router as AxumRouter,
};
use docqa_domain::traits::{
    DocumentStore, HistoryQuery, QaHistoryStore, UserStore, DEFAULT_HISTORY_LIMIT,
};
use docqa_domain::user::{is_valid_email, normalize_email, MIN_PASSWORD_LEN};
use docqa_domain::{Document, DocumentId, QaId, QaRecord, User};
use docqa_llm::LlmProvider;
use docqa_pipeline::{DocumentAssistant, IngestRequest, Ingestor, PipelineError, TextExtractor};
use docqa_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Inference provider shared by all requests
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Persistence handle
    pub store: Arc<Mutex<SqliteStore>>,
    /// Session manager for JWT token operations
    pub session_manager: Arc<SessionManager>,
    /// Upload-to-document pipeline
    pub ingestor: Ingestor,
    /// Question answering and summarization
    pub assistant: Arc<DocumentAssistant<SharedProvider>>,
    /// Where uploaded files are written
    pub upload_dir: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state from configuration, an opened store and a provider
    pub fn new(
        config: &ServerConfig,
        store: SqliteStore,
        provider: SharedProvider,
    ) -> Result<Self, ConfigError> {
        let ingestor = Ingestor::new(config.pipeline.chunking)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let assistant = DocumentAssistant::new(
            provider,
            config.pipeline.budget,
            config.inference.timeout(),
        );

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            session_manager: Arc::new(SessionManager::new(
                &config.jwt_secret,
                config.token_expiry_secs,
            )),
            ingestor,
            assistant: Arc::new(assistant),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Run `f` with exclusive access to the store
    ///
    /// Waiting for the lock yields to the runtime instead of parking the
    /// worker thread. `f` should only do store work.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteStore) -> Result<T, StoreError>,
    {
        let mut store = self.store.lock().await;
        Ok(f(&mut *store)?)
    }

    /// Load a document, hiding documents owned by other users
    async fn owned_document(&self, user: &User, raw_id: &str) -> Result<Document, AppError> {
        let not_found = || AppError::NotFound("Document not found".to_string());
        let id: DocumentId = raw_id.parse().map_err(|_| not_found())?;

        self.with_store(|store| store.get_document(id))
            .await?
            .filter(|document| document.owner == user.id)
            .ok_or_else(not_found)
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed or rejected input (400)
    BadRequest(String),
    /// Missing or invalid credentials (401)
    Unauthorized(String),
    /// Unknown or foreign resource (404)
    NotFound(String),
    /// Conflicts with an existing resource (409)
    Conflict(String),
    /// Internal server error (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::UnsupportedFormat(_)
            | PipelineError::ExtractionFailure(_)
            | PipelineError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::JwtEncode(_) => AppError::Internal(e.to_string()),
            SessionError::TokenExpired | SessionError::InvalidToken => {
                AppError::Unauthorized(e.to_string())
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", e))
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process answers
    pub status: String,
    /// Human-readable status line
    pub message: String,
    /// Server version
    pub version: String,
}

/// Public view of a user account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    /// User id
    pub user_id: String,
    /// Display name
    pub username: String,
    /// Normalized email
    pub email: String,
    /// Registration time (Unix seconds)
    pub created_at: u64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub username: String,
    /// Email address (login name)
    #[serde(default)]
    pub email: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

/// Token issued on register or login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Status line
    pub message: String,
    /// Bearer token
    pub access_token: String,
    /// The authenticated user
    pub user: UserView,
}

/// Document metadata without content
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document id
    pub document_id: String,
    /// Original filename
    pub filename: String,
    /// Upload size in bytes
    pub file_size: u64,
    /// Upload time (Unix seconds)
    pub uploaded_at: u64,
    /// Number of stored chunks
    pub chunks_count: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            document_id: document.id.to_string(),
            filename: document.filename.clone(),
            file_size: document.file_size,
            uploaded_at: document.uploaded_at,
            chunks_count: document.chunks_count(),
        }
    }
}

/// Upload result
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Status line
    pub message: String,
    /// The stored document
    pub document: DocumentSummary,
}

/// Documents owned by the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponse {
    /// Newest first
    pub documents: Vec<DocumentSummary>,
    /// Number of documents
    pub total: usize,
}

/// One document with a content preview
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentDetail {
    /// Metadata
    #[serde(flatten)]
    pub summary: DocumentSummary,
    /// First characters of the extracted text
    pub content_preview: String,
}

/// Plain status message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Status line
    pub message: String,
}

/// Question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural-language question
    #[serde(default)]
    pub question: String,
    /// Document to answer from
    #[serde(default)]
    pub document_id: String,
}

/// Answer to a question
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// The question as asked
    pub question: String,
    /// Model answer or fallback
    pub answer: String,
    /// Whether inference succeeded
    pub success: bool,
    /// Chunks included in the prompt
    pub context_used: usize,
    /// Filename of the document
    pub document_title: String,
    /// History record id
    pub qa_id: String,
}

/// Document summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Filename of the document
    pub document_title: String,
    /// Model summary or fallback
    pub summary: String,
    /// Whether inference succeeded
    pub success: bool,
}

/// History filters
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Only entries for this document
    pub document_id: Option<String>,
    /// Maximum entries (default 50)
    pub limit: Option<usize>,
}

/// One history entry
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    /// The stored record
    #[serde(flatten)]
    pub record: QaRecord,
    /// Filename of the document, if it still exists
    pub document_title: Option<String>,
}

/// Question history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Newest first
    pub history: Vec<HistoryEntry>,
    /// Number of entries returned
    pub total: usize,
}

/// GET /api/health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "AI Document Q&A System is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let username = request.username.trim();
    let email = normalize_email(&request.email);
    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username, email, and password are required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let user = User::new(username, email, hash_password(&request.password)?);
    match state.with_store(|store| store.create_user(&user)).await {
        Err(AppError::Conflict(_)) => {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ))
        }
        other => other?,
    };

    let access_token = state.session_manager.generate_token(user.id)?;
    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            access_token,
            user: UserView::from(&user),
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let email = normalize_email(&request.email);
    let user = state
        .with_store(|store| store.find_user_by_email(&email))
        .await?
        .filter(|user| user.is_active && verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let access_token = state.session_manager.generate_token(user.id)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        access_token,
        user: UserView::from(&user),
    }))
}

/// GET /api/auth/profile
async fn profile(AuthUser(user): AuthUser) -> Json<UserView> {
    Json(UserView::from(&user))
}

/// Reduce a client-supplied filename to a safe single path component
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// POST /api/documents/upload
async fn upload_document(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (raw_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = secure_filename(&raw_name);
    if filename.is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }
    TextExtractor::format_for(&filename)?;
    if bytes.len() > state.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "File too large (max {} bytes)",
            state.max_upload_bytes
        )));
    }

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let path = state
        .upload_dir
        .join(format!("{}_{}", uuid::Uuid::now_v7(), filename));
    tokio::fs::write(&path, &bytes).await?;

    let request = IngestRequest {
        owner: user.id,
        filename,
        file_path: path.to_string_lossy().into_owned(),
        bytes: bytes.to_vec(),
    };
    let document = match ingest_upload(&state, request).await {
        Ok(document) => document,
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove rejected upload {}: {}", path.display(), cleanup);
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            document: DocumentSummary::from(&document),
        }),
    ))
}

/// Extract and chunk without holding the store, then lock only to persist
///
/// Both steps run on the blocking pool.
async fn ingest_upload(state: &AppState, request: IngestRequest) -> Result<Document, AppError> {
    let ingestor = state.ingestor;
    let prepared = tokio::task::spawn_blocking(move || ingestor.prepare(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))??;

    let store = Arc::clone(&state.store);
    let document = tokio::task::spawn_blocking(move || {
        let mut store = store.blocking_lock();
        Ingestor::persist(&mut *store, prepared)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))??;

    Ok(document)
}

/// GET /api/documents/list
async fn list_documents(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<DocumentListResponse>, AppError> {
    let documents = state.with_store(|store| store.list_documents(user.id)).await?;
    let documents: Vec<DocumentSummary> = documents.iter().map(DocumentSummary::from).collect();

    Ok(Json(DocumentListResponse {
        total: documents.len(),
        documents,
    }))
}

/// GET /api/documents/:document_id
async fn get_document(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let document = state.owned_document(&user, &document_id).await?;

    Ok(Json(DocumentDetail {
        summary: DocumentSummary::from(&document),
        content_preview: document.content_preview(),
    }))
}

/// DELETE /api/documents/:document_id
async fn delete_document(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(document_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let document = state.owned_document(&user, &document_id).await?;
    state.with_store(|store| store.delete_document(document.id)).await?;

    if let Err(e) = tokio::fs::remove_file(&document.file_path).await {
        warn!("Failed to remove stored file {}: {}", document.file_path, e);
    }
    info!("Deleted document {}", document.id);

    Ok(Json(MessageResponse {
        message: "Document deleted successfully".to_string(),
    }))
}

/// POST /api/qa/ask
async fn ask_question(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = request.question.trim();
    if question.is_empty() || request.document_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Question and document ID are required".to_string(),
        ));
    }

    let document = state.owned_document(&user, &request.document_id).await?;
    let answer = state.assistant.ask(&document, question).await?;

    let record = answer.to_record(user.id, document.id, question);
    let qa_id = state.with_store(|store| store.record_qa(&record)).await?;

    Ok(Json(AskResponse {
        question: question.to_string(),
        answer: answer.answer,
        success: answer.success,
        context_used: answer.context_used,
        document_title: document.title().to_string(),
        qa_id: qa_id.to_string(),
    }))
}

/// POST /api/qa/summarize/:document_id
async fn summarize_document(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(document_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let document = state.owned_document(&user, &document_id).await?;
    let outcome = state.assistant.summarize(&document).await;

    Ok(Json(SummaryResponse {
        document_title: document.title().to_string(),
        summary: outcome.summary,
        success: outcome.success,
    }))
}

/// GET /api/qa/history
async fn get_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let document_id = params
        .document_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| raw.parse::<DocumentId>())
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid document ID".to_string()))?;

    let query = HistoryQuery {
        owner: user.id,
        document_id,
        limit: params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
    };

    let (records, titles) = state.with_store(|store| {
        let records = store.list_history(&query)?;
        let titles: HashMap<DocumentId, String> = store
            .list_documents(user.id)?
            .into_iter()
            .map(|document| (document.id, document.filename))
            .collect();
        Ok((records, titles))
    })
    .await?;

    let history: Vec<HistoryEntry> = records
        .into_iter()
        .map(|record| HistoryEntry {
            document_title: titles.get(&record.document_id).cloned(),
            record,
        })
        .collect();

    Ok(Json(HistoryResponse {
        total: history.len(),
        history,
    }))
}

/// DELETE /api/qa/history/:qa_id
async fn delete_history_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(qa_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let not_found = || AppError::NotFound("History entry not found".to_string());
    let id: QaId = qa_id.parse().map_err(|_| not_found())?;

    if !state.with_store(|store| store.delete_qa(user.id, id)).await? {
        return Err(not_found());
    }

    Ok(Json(MessageResponse {
        message: "History entry deleted successfully".to_string(),
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let body_limit = state.max_upload_bytes;

    AxumRouter::new()
        .route("/api/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
        .route("/api/documents/upload", post(upload_document))
        .route("/api/documents/list", get(list_documents))
        .route(
            "/api/documents/:document_id",
            get(get_document).delete(delete_document),
        )
        .route("/api/qa/ask", post(ask_question))
        .route("/api/qa/summarize/:document_id", post(summarize_document))
        .route("/api/qa/history", get(get_history))
        .route("/api/qa/history/:qa_id", delete(delete_history_entry))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
