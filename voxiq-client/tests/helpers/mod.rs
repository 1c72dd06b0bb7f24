//! In-process mock backend for integration tests
//!
//! Serves the subset of the REST API the client exercises, with
//! per-filename failure injection and request capture.
#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct MockState {
    /// Own base URL, set after binding (upload slots point back here)
    pub base_url: Mutex<String>,
    /// Filenames whose upload-url request fails
    pub fail_upload_url_for: Mutex<Vec<String>>,
    /// Filenames whose interview registration fails
    pub fail_create_for: Mutex<Vec<String>>,
    /// Fail the interviews list with a structured detail
    pub fail_list: AtomicBool,
    /// Fail billing usage with an empty body (status-text fallback path)
    pub fail_usage_empty_body: AtomicBool,
    /// Storage paths that received a PUT
    pub uploads: Mutex<Vec<String>>,
    /// Filenames registered as interviews
    pub created: Mutex<Vec<String>>,
    /// Sort keys requested on the interviews list
    pub list_sorts: Mutex<Vec<String>>,
    /// Raw ask request bodies, in arrival order
    pub ask_requests: Mutex<Vec<Value>>,
    pub interview_seq: AtomicUsize,
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    *state.base_url.lock().unwrap() = base_url.clone();

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { base_url, state }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/verify", post(verify))
        .route("/api/auth/me", get(me))
        .route("/api/interviews/upload-url", post(upload_url))
        .route("/storage/:name", put(store_bytes))
        .route("/api/interviews", post(create_interview).get(list_interviews))
        .route("/api/interviews/:id", get(get_interview).delete(delete_interview))
        .route("/api/themes", get(list_themes))
        .route("/api/ask", post(ask))
        .route("/api/ask/conversations", get(list_conversations))
        .route("/api/ask/conversations/:id", get(get_conversation))
        .route("/api/export/insights", get(export_insights))
        .route("/api/billing/usage", get(billing_usage))
        .route("/api/demo/load-sample-data", post(load_sample_data))
        .with_state(state)
}

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

fn user_json() -> Value {
    json!({
        "id": "user_1",
        "email": "researcher@example.com",
        "name": "Riley Researcher",
        "avatar_url": null,
        "plan": "pro",
        "created_at": "2026-01-01T00:00:00Z"
    })
}

async fn verify() -> Json<Value> {
    Json(user_json())
}

async fn me() -> Json<Value> {
    Json(user_json())
}

async fn upload_url(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let filename = body["filename"].as_str().unwrap_or_default().to_string();
    if state.fail_upload_url_for.lock().unwrap().contains(&filename) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "no upload slots available")
            .into_response();
    }
    let base = state.base_url.lock().unwrap().clone();
    Json(json!({
        "upload_url": format!("{}/storage/{}", base, filename),
        "storage_path": format!("uploads/{}", filename),
    }))
    .into_response()
}

async fn store_bytes(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    body: axum::body::Bytes,
) -> StatusCode {
    assert!(!body.is_empty(), "upload body should carry the file bytes");
    state.uploads.lock().unwrap().push(format!("uploads/{}", name));
    StatusCode::OK
}

fn interview_json(id: &str, filename: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "file_type": "txt",
        "file_size_bytes": 1024,
        "status": "queued",
        "duration_seconds": null,
        "error_message": null,
        "created_at": "2026-02-01T09:00:00Z",
        "updated_at": "2026-02-01T09:00:00Z"
    })
}

async fn create_interview(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let filename = body["filename"].as_str().unwrap_or_default().to_string();
    if state.fail_create_for.lock().unwrap().contains(&filename) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "registration rejected").into_response();
    }
    let n = state.interview_seq.fetch_add(1, Ordering::SeqCst) + 1;
    state.created.lock().unwrap().push(filename.clone());
    Json(interview_json(&format!("iv_{}", n), &filename)).into_response()
}

async fn list_interviews(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if state.fail_list.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "synthesis worker unavailable")
            .into_response();
    }
    let sort = params.get("sort").cloned().unwrap_or_default();
    state.list_sorts.lock().unwrap().push(sort);
    Json(json!([
        interview_json("iv_1", "call-01.mp3"),
        interview_json("iv_2", "notes.txt"),
    ]))
    .into_response()
}

async fn get_interview(Path(id): Path<String>) -> axum::response::Response {
    if id == "iv_1" {
        let mut detail = interview_json("iv_1", "call-01.mp3");
        detail["transcript"] = json!("hello world");
        detail["speakers"] = json!([]);
        detail["insights"] = json!([]);
        return Json(detail).into_response();
    }
    detail(StatusCode::NOT_FOUND, "Interview not found").into_response()
}

async fn delete_interview(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn theme_json(id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "mention_count": 4,
        "sentiment_positive": 1.0,
        "sentiment_neutral": 2.0,
        "sentiment_negative": 1.0,
        "is_new": false,
        "status": status,
        "created_at": "2026-02-01T09:00:00Z"
    })
}

async fn list_themes(Query(_params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!([
        theme_json("th_1", "Onboarding friction", "active"),
        theme_json("th_2", "Pricing confusion", "previous"),
    ]))
}

async fn ask(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    let n = {
        let mut requests = state.ask_requests.lock().unwrap();
        requests.push(body);
        requests.len()
    };
    Json(json!({
        "answer": "Onboarding friction dominates.",
        "citations": [
            {"interview_id": "iv_1", "filename": "call-01.mp3", "quote": "setup took weeks"}
        ],
        "suggested_followups": ["Which segment mentions this most?"],
        "conversation_id": "conv_1",
        "message_id": format!("msg_{}", n)
    }))
}

async fn list_conversations() -> Json<Value> {
    Json(json!([
        {"id": "conv_1", "title": "Top pain points", "created_at": "2026-02-02T08:00:00Z"}
    ]))
}

async fn get_conversation(Path(id): Path<String>) -> axum::response::Response {
    if id != "conv_1" {
        return detail(StatusCode::NOT_FOUND, "Conversation not found").into_response();
    }
    Json(json!({
        "id": "conv_1",
        "title": "Top pain points",
        "created_at": "2026-02-02T08:00:00Z",
        "messages": [
            {
                "id": "msg_1",
                "role": "user",
                "content": "What are the top pain points?",
                "citations": null,
                "created_at": "2026-02-02T08:00:01Z"
            },
            {
                "id": "msg_2",
                "role": "assistant",
                "content": "Onboarding friction dominates.",
                "citations": [],
                "created_at": "2026-02-02T08:00:05Z"
            }
        ]
    }))
    .into_response()
}

async fn export_insights() -> &'static str {
    "# Interview Insights Export\n\n## Onboarding friction\n"
}

async fn billing_usage(State(state): State<Arc<MockState>>) -> axum::response::Response {
    if state.fail_usage_empty_body.load(Ordering::SeqCst) {
        return StatusCode::BAD_GATEWAY.into_response();
    }
    Json(json!({
        "month": "2026-02-01",
        "interviews_uploaded": 3,
        "qa_queries_used": 7,
        "storage_bytes_used": 1048576
    }))
    .into_response()
}

async fn load_sample_data() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
