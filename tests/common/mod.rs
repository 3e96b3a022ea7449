#![allow(dead_code)]

// Fake recognition/chat backend used by the integration tests.
//
// Serves the same wire contract as the real services: POST /start,
// POST /ingest-chunk (multipart) and GET/POST /api/messages, while
// recording everything it receives so tests can assert on it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// One recorded ingest request.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    pub session_id: String,
    pub file_name: String,
    pub mode: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FakeBackend {
    /// Respond 500 to /start
    pub start_fails: AtomicBool,
    /// Respond 500 to /ingest-chunk
    pub ingest_fails: AtomicBool,
    /// Reply `Finished` with this text once this many ingests have landed
    pub finish_after: Mutex<Option<(usize, String)>>,
    /// Override the reply status string (e.g. something unrecognized)
    pub status_override: Mutex<Option<String>>,
    /// Canned message history for GET /api/messages
    pub history: Mutex<Vec<Value>>,
    /// reply_text attached to POST /api/messages responses
    pub reply_text: Mutex<Option<String>>,

    pub sessions_opened: AtomicUsize,
    pub ingests: Mutex<Vec<IngestRecord>>,
    pub posted_messages: Mutex<Vec<Value>>,
}

impl FakeBackend {
    pub fn ingest_count(&self) -> usize {
        self.ingests.lock().unwrap().len()
    }
}

/// Bind the fake backend on an ephemeral port and return its base URL.
pub async fn spawn_backend(state: Arc<FakeBackend>) -> String {
    let app = Router::new()
        .route("/start", post(start_session))
        .route("/ingest-chunk", post(ingest_chunk))
        .route("/api/messages", get(list_messages).post(create_message))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn start_session(State(state): State<Arc<FakeBackend>>) -> (StatusCode, Json<Value>) {
    if state.start_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create session"})),
        );
    }

    let n = state.sessions_opened.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({ "sessionId": format!("session-{n}") })),
    )
}

async fn ingest_chunk(
    State(state): State<Arc<FakeBackend>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut record = IngestRecord {
        session_id: String::new(),
        file_name: String::new(),
        mode: String::new(),
        bytes: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "sessionId" => record.session_id = field.text().await.unwrap(),
            "chunk" => {
                record.file_name = field.file_name().unwrap_or("").to_string();
                record.bytes = field.bytes().await.unwrap().to_vec();
            }
            "mode" => record.mode = field.text().await.unwrap(),
            _ => {}
        }
    }

    if state.ingest_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "Error", "text": null})),
        );
    }

    let count = {
        let mut ingests = state.ingests.lock().unwrap();
        ingests.push(record);
        ingests.len()
    };

    if let Some(status) = state.status_override.lock().unwrap().clone() {
        return (StatusCode::OK, Json(json!({ "status": status })));
    }

    if let Some((after, text)) = state.finish_after.lock().unwrap().clone() {
        if count >= after {
            return (
                StatusCode::OK,
                Json(json!({ "status": "Finished", "text": text })),
            );
        }
    }

    (StatusCode::OK, Json(json!({"status": "Speech"})))
}

async fn list_messages(
    State(state): State<Arc<FakeBackend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let room_id = params.get("room_id").cloned().unwrap_or_default();
    let history = state.history.lock().unwrap();

    let messages: Vec<Value> = history
        .iter()
        .filter(|m| m["room_id"] == room_id.as_str())
        .cloned()
        .collect();

    Json(Value::Array(messages))
}

async fn create_message(
    State(state): State<Arc<FakeBackend>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.posted_messages.lock().unwrap().push(body.clone());

    let reply_text = state.reply_text.lock().unwrap().clone();
    Json(json!({
        "id": state.posted_messages.lock().unwrap().len(),
        "room_id": body["room_id"],
        "text": body["text"],
        "client_type": body["client_type"],
        "created_at": "2026-08-07T12:00:00",
        "reply_text": reply_text,
    }))
}
