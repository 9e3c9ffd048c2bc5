//! Event-stream binding: one long-lived SSE channel per client
//!
//! `GET /mcp` opens the stream. Its first event (`endpoint`) names the URL the
//! client posts frames to; every response is pushed back as a `message` event
//! on the same stream. Dropping the stream closes the channel and cancels the
//! invocations still waiting on the provider.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures::Stream;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::http::{json_error, method_not_allowed, preflight, rejected_frame, serve_router, with_http_layers};
use super::{Channel, TransportBinding, MCP_PATH};
use crate::jsonrpc::{self, JsonRpcResponse};
use crate::{McpResult, McpServer};

const OUTBOUND_QUEUE: usize = 64;

pub struct SseBinding {
    addr: String,
}

#[derive(Clone)]
struct StreamSession {
    tx: mpsc::Sender<JsonRpcResponse>,
    channel: Arc<Channel>,
}

type SessionMap = Arc<Mutex<HashMap<String, StreamSession>>>;

#[derive(Clone)]
struct SseState {
    server: Arc<McpServer>,
    sessions: SessionMap,
}

impl SseState {
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, StreamSession>> {
        lock(&self.sessions)
    }
}

fn lock(sessions: &SessionMap) -> MutexGuard<'_, HashMap<String, StreamSession>> {
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(alias = "sessionId")]
    session_id: Option<String>,
}

/// Removes the session and closes its channel when the stream goes away
struct StreamGuard {
    id: String,
    sessions: SessionMap,
    channel: Arc<Channel>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        lock(&self.sessions).remove(&self.id);
        self.channel.close();
    }
}

impl SseBinding {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn router(server: Arc<McpServer>) -> Router {
        let state = SseState { server, sessions: Arc::new(Mutex::new(HashMap::new())) };
        let router = Router::new()
            .route(
                MCP_PATH,
                get(open_stream)
                    .head(method_not_allowed)
                    .post(post_message)
                    .options(preflight)
                    .fallback(method_not_allowed),
            )
            .with_state(state);
        with_http_layers(router)
    }
}

#[async_trait]
impl TransportBinding for SseBinding {
    fn name(&self) -> &'static str {
        "sse"
    }

    async fn serve(self, server: Arc<McpServer>) -> McpResult<()> {
        serve_router(&self.addr, self.name(), Self::router(server)).await
    }
}

async fn open_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let channel = Channel::new("sse");
    let id = channel.id().to_string();
    let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_QUEUE);

    state
        .sessions()
        .insert(id.clone(), StreamSession { tx, channel: channel.clone() });
    channel.open();

    let endpoint = format!("{}?session_id={}", MCP_PATH, id);
    let guard = StreamGuard { id: id.clone(), sessions: state.sessions.clone(), channel };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(response) = rx.recv().await {
            match serde_json::to_string(&response) {
                Ok(data) => {
                    debug!(session = %id, id = ?response.id, "response emitted");
                    yield Ok(Event::default().event("message").data(data));
                }
                Err(e) => warn!(session = %id, error = %e, "dropping unserializable response"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id else {
        return json_error(StatusCode::BAD_REQUEST, "Missing session_id");
    };
    let Some(session) = state.sessions().get(&session_id).cloned() else {
        return json_error(StatusCode::NOT_FOUND, "Unknown session");
    };

    let request = match jsonrpc::parse_request(&body) {
        Ok(request) => request,
        Err(error) => return rejected_frame(error),
    };
    let Ok(guard) = session.channel.begin() else {
        return json_error(StatusCode::GONE, "Channel closed");
    };

    let server = state.server.clone();
    tokio::spawn(async move {
        let _guard = guard;
        tokio::select! {
            _ = session.tx.closed() => {
                debug!(session = %session_id, "invocation cancelled: channel closed");
            }
            response = server.handle_request(request) => {
                if let Some(response) = response {
                    if session.tx.send(response).await.is_err() {
                        debug!(session = %session_id, "channel closed before response was sent");
                    }
                }
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}
