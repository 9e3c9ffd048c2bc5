mod common;

use axum::body::{Body, BodyDataStream};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{sample_books, tools_call, RecordingProvider};
use futures::StreamExt;
use hardcover_mcp::transport::MCP_PATH;
use hardcover_mcp::{CatalogProfile, SseBinding};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Reads server-sent events off a response body
struct EventReader {
    body: BodyDataStream,
    buffer: String,
}

impl EventReader {
    async fn open(router: &Router) -> Self {
        let request = Request::builder().method(Method::GET).uri(MCP_PATH).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        Self { body: response.into_body().into_data_stream(), buffer: String::new() }
    }

    /// Next `(event, data)` pair, skipping keep-alive comments
    async fn next(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = String::new();
                for line in raw.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim());
                    }
                }
                if event.is_empty() && data.is_empty() {
                    continue;
                }
                return (event, data);
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

async fn post(router: &Router, uri: &str, frame: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&frame).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn stream_announces_endpoint_and_carries_responses() {
    let provider = Arc::new(RecordingProvider::new().with_books(sample_books()));
    let router = SseBinding::router(common::server_with(provider.clone(), CatalogProfile::Hosted));

    let mut events = EventReader::open(&router).await;
    let (event, endpoint) = events.next().await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/mcp?session_id="));

    let (status, _) = post(&router, &endpoint, tools_call(11, "search_books", json!({ "query": "dune" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (event, data) = events.next().await;
    assert_eq!(event, "message");
    let response: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(response["id"], 11);
    assert!(response["result"]["content"][0]["text"].as_str().unwrap().contains("Dune Messiah"));
}

#[tokio::test]
async fn concurrent_streams_are_isolated() {
    let provider = Arc::new(RecordingProvider::new());
    let router = SseBinding::router(common::server_with(provider, CatalogProfile::Hosted));

    let mut first = EventReader::open(&router).await;
    let mut second = EventReader::open(&router).await;
    let (_, first_endpoint) = first.next().await;
    let (_, second_endpoint) = second.next().await;
    assert_ne!(first_endpoint, second_endpoint);

    post(&router, &second_endpoint, json!({ "jsonrpc": "2.0", "id": "b", "method": "ping" })).await;
    post(&router, &first_endpoint, json!({ "jsonrpc": "2.0", "id": "a", "method": "ping" })).await;

    let (_, data) = first.next().await;
    assert_eq!(serde_json::from_str::<Value>(&data).unwrap()["id"], "a");
    let (_, data) = second.next().await;
    assert_eq!(serde_json::from_str::<Value>(&data).unwrap()["id"], "b");
}

#[tokio::test]
async fn post_requires_a_known_session() {
    let provider = Arc::new(RecordingProvider::new());
    let router = SseBinding::router(common::server_with(provider.clone(), CatalogProfile::Hosted));
    let frame = tools_call(1, "search_books", json!({ "query": "dune" }));

    let (status, _) = post(&router, MCP_PATH, frame.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&router, "/mcp?session_id=missing", frame).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "error": "Unknown session" }));

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn malformed_frame_is_rejected_on_post() {
    let provider = Arc::new(RecordingProvider::new());
    let router = SseBinding::router(common::server_with(provider, CatalogProfile::Hosted));
    let mut events = EventReader::open(&router).await;
    let (_, endpoint) = events.next().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(&endpoint)
        .body(Body::from("[1, 2"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dropping_the_stream_cancels_pending_invocations() {
    let provider = Arc::new(RecordingProvider::new().hanging());
    let started = provider.search_started.clone();
    let dropped = provider.search_dropped.clone();
    let router = SseBinding::router(common::server_with(provider.clone(), CatalogProfile::Hosted));

    let mut events = EventReader::open(&router).await;
    let (_, endpoint) = events.next().await;
    let (status, _) = post(&router, &endpoint, tools_call(1, "search_books", json!({ "query": "dune" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    eventually(|| started.load(Ordering::SeqCst)).await;

    drop(events);

    eventually(|| dropped.load(Ordering::SeqCst)).await;
    let (status, _) = post(&router, &endpoint, json!({ "jsonrpc": "2.0", "id": 2, "method": "ping" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preflight_and_unsupported_methods() {
    let provider = Arc::new(RecordingProvider::new());
    let router = SseBinding::router(common::server_with(provider, CatalogProfile::Hosted));

    let options = Request::builder().method(Method::OPTIONS).uri(MCP_PATH).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(options).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let delete = Request::builder().method(Method::DELETE).uri(MCP_PATH).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let head = Request::builder().method(Method::HEAD).uri(MCP_PATH).body(Body::empty()).unwrap();
    let response = router.oneshot(head).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().get("content-type").map_or(true, |v| v != "text/event-stream"));
}
