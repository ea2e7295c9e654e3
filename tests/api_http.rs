//! HTTP surface: status codes, error shape and request wiring.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use minutegraph::api::router;
use minutegraph::config::Config;
use minutegraph::db::Database;
use minutegraph::llm::Summarizer;
use minutegraph::pipeline::MeetingService;
use minutegraph::storage::LocalObjectStore;
use minutegraph::summary::SummaryResult;
use minutegraph::transcription::TranscriptionProvider;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower::ServiceExt;

const MEETING: &str = "0b8f7e52-5a1e-4d7c-a0e4-6c2c9d9f5b11";
const BOUNDARY: &str = "minutegraph-test-boundary";

struct EchoTranscriber;

impl TranscriptionProvider for EchoTranscriber {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        _file_name: &'a str,
        _language: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move { Ok(String::from_utf8_lossy(&audio).to_string()) })
    }
}

struct EmptySummarizer;

#[async_trait]
impl Summarizer for EmptySummarizer {
    async fn summarize(&self, _transcript: &str, _meeting_id: &str, _language: Option<&str>) -> Result<SummaryResult> {
        Ok(SummaryResult::default())
    }
}

fn app(config: Config) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(dir.path().join("api.db")).unwrap();
    let service = MeetingService::new(
        db,
        Arc::new(LocalObjectStore::new(dir.path().join("bucket"))),
        Arc::new(EchoTranscriber),
        Arc::new(EmptySummarizer),
        &config,
    );
    (router(Arc::new(service)), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(meeting_id: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"meetingId\"\r\n\r\n{id}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"call.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\n{contents}\r\n--{b}--\r\n",
        b = BOUNDARY,
        id = meeting_id,
        contents = contents,
    );
    Request::post("/api/upload")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_reports_service() {
    let (app, _dir) = app(Config::default());
    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "minutegraph");
}

#[tokio::test]
async fn invalid_meeting_id_is_400_with_error_body() {
    let (app, _dir) = app(Config::default());
    let (status, body) = send(
        &app,
        Request::get("/api/status?meetingId=not-a-uuid").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": true, "message": "meetingId must be a UUID."}));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _dir) = app(Config::default());
    let request = Request::post("/api/summary")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn upload_transcribe_edit_and_diagram() {
    let (app, _dir) = app(Config::default());

    let (status, upload) = send(&app, upload_request(MEETING, "hello from the call")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upload["meetingId"], MEETING);
    assert!(upload["path"].as_str().unwrap().ends_with(".webm"));

    let (status, transcribed) = send(
        &app,
        json_request("POST", "/api/transcribe", json!({"meetingId": MEETING})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcribed["transcriptText"], "hello from the call");
    assert_eq!(transcribed["recordingId"], upload["recordingId"]);

    let (status, saved) = send(
        &app,
        json_request(
            "PUT",
            "/api/summary",
            json!({
                "meetingId": MEETING,
                "summary": {"overview": "Edited", "decisions": ["Adopt plan A", "  "]}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["summary"]["decisions"], json!(["Adopt plan A"]));

    let (status, view) = send(
        &app,
        Request::get(format!("/api/status?meetingId={}", MEETING))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["meeting"]["status"], "transcribed");
    assert_eq!(view["summary"]["overview"], "Edited");
    assert_eq!(view["actionItems"], json!([]));

    let (status, diagram) = send(
        &app,
        json_request("POST", "/api/diagram", json!({"meetingId": MEETING})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(diagram["mermaid"]
        .as_str()
        .unwrap()
        .contains("decision0(\"Adopt plan A\")"));
}

#[tokio::test]
async fn share_lifecycle() {
    let (app, _dir) = app(Config::default());
    send(&app, upload_request(MEETING, "audio")).await;

    let (status, created) = send(
        &app,
        json_request("POST", "/api/share", json!({"meetingId": MEETING, "expiresInHours": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = created["link"]["token"].as_str().unwrap().to_string();
    assert_eq!(created["link"]["sharePath"], format!("/share/{}", token));

    let (status, shared) = send(
        &app,
        Request::get(format!("/api/share/{}", token)).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["meeting"]["id"], MEETING);

    let (status, _) = send(&app, json_request("DELETE", "/api/share", json!({"token": token}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Request::get(format!("/api/share/{}", token)).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn cleanup_requires_bearer_secret() {
    let mut config = Config::default();
    config.retention.cron_secret = Some("topsecret".to_string());
    let (app, _dir) = app(config);

    let (status, _) = send(
        &app,
        Request::post("/api/admin/cleanup").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, report) = send(
        &app,
        Request::post("/api/admin/cleanup")
            .header("authorization", "Bearer topsecret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["removedRecordings"], 0);
}
