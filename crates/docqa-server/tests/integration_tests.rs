//! Integration tests for the HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use docqa_llm::{LlmProvider, MockProvider};
use docqa_server::{
    config::ServerConfig,
    handlers::{create_router, AppState},
};
use docqa_store::SqliteStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "docqa-test-boundary";

/// Helper to create test application state with uploads in a temp dir
fn create_test_state(provider: Arc<dyn LlmProvider>) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default_test_config();
    config.upload_dir = dir.path().join("uploads");
    config.inference.timeout_secs = 1;

    let store = SqliteStore::in_memory().unwrap();
    let state = AppState::new(&config, store, provider).unwrap();
    (state, dir)
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn upload_request(token: &str, filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = content
    );
    Request::builder()
        .method("POST")
        .uri("/api/documents/upload")
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn register(state: &AppState, username: &str, email: &str) -> String {
    let (status, body) = send(
        state,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": username, "email": email, "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["access_token"].as_str().unwrap().to_string()
}

async fn upload(state: &AppState, token: &str, filename: &str, content: &str) -> String {
    let (status, body) = send(state, upload_request(token, filename, content)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["document"]["document_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&state, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "AI Document Q&A System is running");
}

#[tokio::test]
async fn test_register_login_profile() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    register(&state, "ada", "Ada@Example.com").await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&state, authed("GET", "/api/auth/profile", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));

    let (status, _) = send(
        &state,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "bob", "email": "not-an-email", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&state, "bob", "bob@example.com").await;
    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "bobby", "email": "BOB@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User with this email already exists");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    register(&state, "cy", "cy@example.com").await;

    let (status, _) = send(
        &state,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "cy@example.com", "password": "wrong-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_document_lifecycle() {
    let (state, dir) = create_test_state(Arc::new(MockProvider::default()));
    let token = register(&state, "dee", "dee@example.com").await;

    let id = upload(&state, &token, "notes.txt", "Meeting moved to Tuesday.\nBring slides.").await;

    let (status, body) = send(&state, authed("GET", "/api/documents/list", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["documents"][0]["filename"], "notes.txt");
    assert_eq!(body["documents"][0]["chunks_count"], 1);

    let (status, body) = send(&state, authed("GET", &format!("/api/documents/{}", id), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content_preview"], "Meeting moved to Tuesday. Bring slides.");

    let stored_files = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored_files, 1);

    let (status, _) = send(&state, authed("DELETE", &format!("/api/documents/{}", id), &token)).await;
    assert_eq!(status, StatusCode::OK);

    let stored_files = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored_files, 0);

    let (status, _) = send(&state, authed("GET", &format!("/api/documents/{}", id), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_store_stays_available_during_large_upload() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    let token = register(&state, "bulk", "bulk@example.com").await;
    upload(&state, &token, "small.txt", "A small document.").await;

    let content = "Bulk sentence for chunking.   ".repeat(16 * 1024 * 1024 / 30);
    let upload_task = {
        let state = state.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let started = std::time::Instant::now();
            let (status, _) = send(&state, upload_request(&token, "large.txt", &content)).await;
            (status, started.elapsed())
        })
    };

    // The upload is stored on disk just before extraction starts
    let upload_dir = state.upload_dir.clone();
    loop {
        let stored = std::fs::read_dir(&upload_dir)
            .map(|entries| entries.filter_map(Result::ok).any(|e| e.file_name().to_string_lossy().ends_with("_large.txt")))
            .unwrap_or(false);
        if stored {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = std::time::Instant::now();
    let (status, body) = send(&state, authed("GET", "/api/documents/list", &token)).await;
    let list_elapsed = started.elapsed();
    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_u64().unwrap() >= 1);

    let (upload_status, upload_elapsed) = upload_task.await.unwrap();
    assert_eq!(upload_status, StatusCode::CREATED);
    assert!(
        list_elapsed * 4 < upload_elapsed,
        "listing took {:?} while the upload took {:?}",
        list_elapsed,
        upload_elapsed
    );
}

#[tokio::test]
async fn test_rejected_uploads() {
    let (state, dir) = create_test_state(Arc::new(MockProvider::default()));
    let token = register(&state, "eve", "eve@example.com").await;

    let (status, _) = send(&state, upload_request(&token, "tool.exe", "MZ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&state, upload_request(&token, "blank.txt", "   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Extraction failed"));

    // The stored copy of a rejected upload is removed
    let uploads = dir.path().join("uploads");
    let remaining = if uploads.exists() {
        std::fs::read_dir(&uploads).unwrap().count()
    } else {
        0
    };
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_documents_are_private() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    let owner = register(&state, "fay", "fay@example.com").await;
    let other = register(&state, "gus", "gus@example.com").await;

    let id = upload(&state, &owner, "private.txt", "Owner only.").await;

    let (status, _) = send(&state, authed("GET", &format!("/api/documents/{}", id), &other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &state,
        json_request(
            "POST",
            "/api/qa/ask",
            Some(&other),
            json!({"question": "What?", "document_id": id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&state, authed("GET", "/api/documents/list", &other)).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_ask_summarize_and_history() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::new("Tuesday.")));
    let token = register(&state, "hal", "hal@example.com").await;
    let id = upload(&state, &token, "meeting.txt", "The meeting is on Tuesday.").await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/qa/ask",
            Some(&token),
            json!({"question": "When is the meeting?", "document_id": id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Tuesday.");
    assert_eq!(body["success"], true);
    assert_eq!(body["context_used"], 1);
    assert_eq!(body["document_title"], "meeting.txt");
    let qa_id = body["qa_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &state,
        authed("POST", &format!("/api/qa/summarize/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["document_title"], "meeting.txt");

    let (status, body) = send(
        &state,
        authed("GET", &format!("/api/qa/history?document_id={}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["history"][0]["qa_id"], qa_id.as_str());
    assert_eq!(body["history"][0]["document_title"], "meeting.txt");

    let (status, _) = send(
        &state,
        authed("DELETE", &format!("/api/qa/history/{}", qa_id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&state, authed("GET", "/api/qa/history", &token)).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_ask_requires_question() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    let token = register(&state, "ida", "ida@example.com").await;
    let id = upload(&state, &token, "a.txt", "Some content.").await;

    let (status, _) = send(
        &state,
        json_request(
            "POST",
            "/api/qa/ask",
            Some(&token),
            json!({"question": "   ", "document_id": id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inference_timeout_returns_fallback() {
    let slow = MockProvider::new("too slow").with_delay(Duration::from_secs(3));
    let (state, _dir) = create_test_state(Arc::new(slow));
    let token = register(&state, "jo", "jo@example.com").await;
    let id = upload(&state, &token, "slow.txt", "Anything at all.").await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/qa/ask",
            Some(&token),
            json!({"question": "Will it answer?", "document_id": id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["answer"],
        "Sorry, I couldn't process your question at the moment."
    );

    // Failed answers are still recorded
    let (_, body) = send(&state, authed("GET", "/api/qa/history", &token)).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["history"][0]["success"], false);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (state, _dir) = create_test_state(Arc::new(MockProvider::default()));
    let (status, body) = send(&state, authed("GET", "/api/documents/list", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}
