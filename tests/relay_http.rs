use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rag_relay::core::config::{ChatMode, RelayConfig};
use rag_relay::core::errors::ERROR_KIND_HEADER;
use rag_relay::server::router::router;
use rag_relay::state::AppState;

struct ReceivedUpload {
    field: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

struct FakeUpstream {
    rag_status: StatusCode,
    rag_reply: Value,
    completion_status: StatusCode,
    completion_reply: Value,
    upload_status: StatusCode,
    rag_bodies: Mutex<Vec<Value>>,
    completion_bodies: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<ReceivedUpload>>,
}

impl FakeUpstream {
    fn new() -> Self {
        Self {
            rag_status: StatusCode::OK,
            rag_reply: json!({ "context": "foo" }),
            completion_status: StatusCode::OK,
            completion_reply: json!({ "choices": [{ "text": " bar " }] }),
            upload_status: StatusCode::OK,
            rag_bodies: Mutex::new(Vec::new()),
            completion_bodies: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }
}

async fn fake_rag_chat(State(fake): State<Arc<FakeUpstream>>, Json(body): Json<Value>) -> Response {
    fake.rag_bodies.lock().unwrap().push(body);
    if fake.rag_status != StatusCode::OK {
        return fake.rag_status.into_response();
    }
    Json(fake.rag_reply.clone()).into_response()
}

async fn fake_completions(
    State(fake): State<Arc<FakeUpstream>>,
    Json(body): Json<Value>,
) -> Response {
    fake.completion_bodies.lock().unwrap().push(body);
    if fake.completion_status != StatusCode::OK {
        return fake.completion_status.into_response();
    }
    Json(fake.completion_reply.clone()).into_response()
}

async fn fake_upload(State(fake): State<Arc<FakeUpstream>>, mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let received = ReceivedUpload {
            field: field.name().map(str::to_string),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.unwrap().to_vec(),
        };
        fake.uploads.lock().unwrap().push(received);
    }
    (fake.upload_status, Json(json!({ "message": "stored" }))).into_response()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_upstream(fake: Arc<FakeUpstream>) -> SocketAddr {
    let app = Router::new()
        .route("/api/rag_chat", post(fake_rag_chat))
        .route("/api/upload", post(fake_upload))
        .route("/v1/completions", post(fake_completions))
        .with_state(fake);
    serve(app).await
}

async fn spawn_relay(upstream: SocketAddr, mode: ChatMode) -> String {
    spawn_split_relay(upstream, upstream, mode).await
}

async fn spawn_split_relay(rag: SocketAddr, inference: SocketAddr, mode: ChatMode) -> String {
    let mut config = RelayConfig::default();
    config.rag.base_url = format!("http://{}", rag);
    config.inference.base_url = format!("http://{}", inference);
    config.chat.mode = mode;

    let state = AppState::from_config(config).expect("state should build");
    let addr = serve(router(state)).await;
    format!("http://{}", addr)
}

async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn post_hi(relay: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/chat", relay))
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .unwrap()
}

fn kind_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(ERROR_KIND_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn chat_relays_context_into_completion_and_trims_reply() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", relay))
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "response": "bar" }));

    let rag_bodies = fake.rag_bodies.lock().unwrap();
    assert_eq!(rag_bodies.as_slice(), &[json!({ "query": "hi" })]);

    let completions = fake.completion_bodies.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0]["model"], "meta-llama/Llama-3.2-1B-Instruct");
    assert_eq!(completions[0]["max_tokens"], 200);
    assert_eq!(completions[0]["temperature"], 0.0);
    let prompt = completions[0]["prompt"].as_str().unwrap();
    assert!(prompt.contains("foo"));
    assert!(prompt.contains("Question: hi"));
}

#[tokio::test]
async fn rag_answer_mode_forwards_history_and_returns_rag_reply() {
    let mut upstream = FakeUpstream::new();
    upstream.rag_reply = json!({ "response": " from rag " });
    let fake = Arc::new(upstream);
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::RagAnswer).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", relay))
        .json(&json!({ "messages": [
            { "role": "user", "content": "hello" },
            { "role": "assistant", "content": "hi" },
            { "role": "user", "content": "who?" }
        ] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "response": "from rag" }));
    assert_eq!(
        fake.rag_bodies.lock().unwrap()[0],
        json!({ "query": "who?", "chat_history": "User: hello\nAssistant: hi\n" })
    );
    assert!(fake.completion_bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_conversation_is_a_500_and_server_keeps_serving() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/chat", relay))
        .json(&json!({ "messages": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("bad-request"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
    assert!(fake.rag_bodies.lock().unwrap().is_empty());

    let health = client
        .get(format!("{}/health", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
}

#[tokio::test]
async fn malformed_chat_body_takes_the_generic_error_path() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake).await, ChatMode::Augmented).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", relay))
        .header("content-type", "application/json")
        .body("{\"messages\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
}

#[tokio::test]
async fn rag_error_status_is_reported_as_upstream_error() {
    let mut upstream = FakeUpstream::new();
    upstream.rag_status = StatusCode::SERVICE_UNAVAILABLE;
    let fake = Arc::new(upstream);
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", relay))
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("upstream-error"));
    assert!(fake.completion_bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_rag_is_reported_as_upstream_unavailable() {
    let relay = spawn_relay(closed_port().await, ChatMode::Augmented).await;

    let response = post_hi(&relay).await;

    assert_eq!(response.status(), 500);
    assert_eq!(
        kind_header(&response).as_deref(),
        Some("upstream-unavailable")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
}

#[tokio::test]
async fn inference_error_status_is_reported_as_upstream_error() {
    let mut upstream = FakeUpstream::new();
    upstream.completion_status = StatusCode::INTERNAL_SERVER_ERROR;
    let fake = Arc::new(upstream);
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let response = post_hi(&relay).await;

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("upstream-error"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
    assert_eq!(fake.completion_bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn completion_without_choices_is_reported_as_upstream_error() {
    let mut upstream = FakeUpstream::new();
    upstream.completion_reply = json!({ "choices": [] });
    let fake = Arc::new(upstream);
    let relay = spawn_relay(spawn_upstream(fake).await, ChatMode::Augmented).await;

    let response = post_hi(&relay).await;

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("upstream-error"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
}

#[tokio::test]
async fn unreachable_inference_is_reported_as_upstream_unavailable() {
    let fake = Arc::new(FakeUpstream::new());
    let rag = spawn_upstream(fake.clone()).await;
    let relay = spawn_split_relay(rag, closed_port().await, ChatMode::Augmented).await;

    let response = post_hi(&relay).await;

    assert_eq!(response.status(), 500);
    assert_eq!(
        kind_header(&response).as_deref(),
        Some("upstream-unavailable")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process request" }));
    assert_eq!(fake.rag_bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn truncated_file_part_is_an_upload_failure() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let body = "--XBOUNDARY\r\n\
                Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
                \r\n\
                hello, this part never ends";
    let response = reqwest::Client::new()
        .post(format!("{}/api/upload", relay))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("internal"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to upload file" }));
    assert!(fake.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_file_field_is_rejected_locally() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let form = Form::new().text("note", "no attachment");
    let response = reqwest::Client::new()
        .post(format!("{}/api/upload", relay))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No file provided" }));
    assert!(fake.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_with_non_multipart_body_is_rejected_locally() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/upload", relay))
        .json(&json!({ "file": "nope" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No file provided" }));
    assert!(fake.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_forwards_file_byte_for_byte() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake.clone()).await, ChatMode::Augmented).await;

    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let part = Part::bytes(data.clone())
        .file_name("davinci.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = Form::new().text("note", "ignored").part("file", part);

    let response = reqwest::Client::new()
        .post(format!("{}/api/upload", relay))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "File uploaded successfully" }));

    let uploads = fake.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field.as_deref(), Some("file"));
    assert_eq!(uploads[0].file_name.as_deref(), Some("davinci.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].bytes.len(), data.len());
    assert_eq!(uploads[0].bytes, data);
}

#[tokio::test]
async fn upstream_upload_failure_is_a_500() {
    let mut upstream = FakeUpstream::new();
    upstream.upload_status = StatusCode::INTERNAL_SERVER_ERROR;
    let fake = Arc::new(upstream);
    let relay = spawn_relay(spawn_upstream(fake).await, ChatMode::Augmented).await;

    let part = Part::bytes(b"hello".to_vec()).file_name("notes.txt");
    let response = reqwest::Client::new()
        .post(format!("{}/api/upload", relay))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(kind_header(&response).as_deref(), Some("upstream-error"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to upload file" }));
}

#[tokio::test]
async fn pages_are_served_from_the_relay() {
    let fake = Arc::new(FakeUpstream::new());
    let relay = spawn_relay(spawn_upstream(fake).await, ChatMode::Augmented).await;
    let client = reqwest::Client::new();

    let chat = client.get(format!("{}/", relay)).send().await.unwrap();
    assert_eq!(chat.status(), 200);
    assert!(chat.text().await.unwrap().contains("/api/chat"));

    let upload = client
        .get(format!("{}/upload", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(upload.status(), 200);
    let html = upload.text().await.unwrap();
    assert!(html.contains("name=\"file\""));
    assert!(html.contains("/api/upload"));
}
