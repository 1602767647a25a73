//! Mock upstream platform for integration tests
//!
//! One axum server stands in for every external service: the managed
//! backend (identity, storage, data API, vault RPC), the image provider,
//! the speech provider and the chat gateway.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub const USER_TOKEN: &str = "user-token";
pub const USER_ID: &str = "user-1";

/// An object stored through the mock storage API
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Default)]
struct PlatformState {
    base_url: String,
    objects: Mutex<Vec<StoredObject>>,
    jobs: Mutex<Vec<Value>>,
    chat_reply: Mutex<String>,
    minimax_key: Mutex<Option<String>>,
    image_requests: Mutex<Vec<Value>>,
}

/// Mock platform that records what the functions send it
pub struct MockPlatform {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<PlatformState>,
}

impl MockPlatform {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(PlatformState {
            base_url: format!("http://{addr}"),
            ..PlatformState::default()
        });

        let app = Router::new()
            .route("/auth/v1/user", routing::get(handle_user))
            .route("/storage/v1/object/{bucket}/{*path}", routing::post(handle_upload))
            .route("/rest/v1/generation_jobs", routing::get(handle_jobs))
            .route("/rest/v1/rpc/get_user_api_key_for_service", routing::post(handle_vault))
            .route("/v1/models/{owner}/{name}/predictions", routing::post(handle_prediction))
            .route("/v1/predictions/{id}", routing::get(handle_get_prediction))
            .route("/v1/t2a_v2", routing::post(handle_speech))
            .route("/v1/chat/completions", routing::post(handle_chat))
            .route("/files/{name}", routing::get(handle_file))
            .with_state(Arc::clone(&state));

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Content of the next chat completions
    pub fn set_chat_reply(&self, content: &str) {
        *self.state.chat_reply.lock().unwrap() = content.to_owned();
    }

    /// Store the user's speech provider key in the vault
    pub fn set_minimax_key(&self, key: &str) {
        *self.state.minimax_key.lock().unwrap() = Some(key.to_owned());
    }

    pub fn insert_job(&self, row: Value) {
        self.state.jobs.lock().unwrap().push(row);
    }

    pub fn objects(&self, bucket: &str) -> Vec<StoredObject> {
        self.state
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|object| object.bucket == bucket)
            .cloned()
            .collect()
    }

    /// Inputs of every prediction created so far
    pub fn image_requests(&self) -> Vec<Value> {
        self.state.image_requests.lock().unwrap().clone()
    }
}

impl Drop for MockPlatform {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn is_user(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {USER_TOKEN}"))
}

async fn handle_user(headers: HeaderMap) -> Response {
    if is_user(&headers) {
        Json(json!({"id": USER_ID, "aud": "authenticated"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"msg": "invalid JWT"}))).into_response()
    }
}

async fn handle_upload(
    State(state): State<Arc<PlatformState>>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let key = format!("{bucket}/{path}");

    state.objects.lock().unwrap().push(StoredObject {
        bucket,
        path,
        content_type,
        bytes,
    });

    Json(json!({"Key": key}))
}

async fn handle_jobs(
    State(state): State<Arc<PlatformState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !is_user(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "JWT expired"}))).into_response();
    }

    let matches = |row: &Value, column: &str| {
        query.get(column).is_none_or(|filter| {
            let expected = filter.strip_prefix("eq.").unwrap_or(filter.as_str());
            row.get(column).and_then(Value::as_str) == Some(expected)
        })
    };

    let mut rows: Vec<Value> = state
        .jobs
        .lock()
        .unwrap()
        .iter()
        .filter(|row| matches(row, "id") && matches(row, "project_id"))
        .cloned()
        .collect();

    if query.get("order").is_some_and(|order| order == "created_at.desc") {
        rows.sort_by(|a, b| b["created_at"].as_str().cmp(&a["created_at"].as_str()));
    }

    Json(rows).into_response()
}

async fn handle_vault(State(state): State<Arc<PlatformState>>, Json(body): Json<Value>) -> Json<Option<String>> {
    let key = state.minimax_key.lock().unwrap().clone();
    Json(key.filter(|_| body["target_user_id"] == USER_ID))
}

async fn handle_prediction(State(state): State<Arc<PlatformState>>, Json(body): Json<Value>) -> impl IntoResponse {
    let count = {
        let mut requests = state.image_requests.lock().unwrap();
        requests.push(body["input"].clone());
        requests.len()
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "id": format!("p{count}"),
            "status": "succeeded",
            "output": [format!("{}/files/out-{count}.webp", state.base_url)]
        })),
    )
}

async fn handle_get_prediction(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"id": id, "status": "processing", "logs": ""}))
}

async fn handle_speech(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "Bearer mm-key");

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }

    if body["text"].as_str().is_none_or(str::is_empty) {
        return Json(json!({"base_resp": {"status_code": 2013, "status_msg": "invalid params"}})).into_response();
    }

    Json(json!({
        "data": {"audio": "48656c6c6f"},
        "extra_info": {"audio_length": 2_500},
        "base_resp": {"status_code": 0, "status_msg": "success"}
    }))
    .into_response()
}

async fn handle_chat(State(state): State<Arc<PlatformState>>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "Bearer gw-key");

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "invalid gateway key").into_response();
    }

    let content = state.chat_reply.lock().unwrap().clone();

    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    }))
    .into_response()
}

async fn handle_file(Path(name): Path<String>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/webp")], format!("image bytes of {name}"))
}
