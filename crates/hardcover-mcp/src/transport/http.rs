//! Request/response HTTP binding and the HTTP plumbing shared with the SSE binding

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, info};

use super::{Channel, TransportBinding};
use crate::jsonrpc::{self, JsonRpcResponse};
use crate::protocol::{LATEST_PROTOCOL_VERSION, SERVER_NAME};
use crate::registry::ToolDefinition;
use crate::{McpError, McpResult, McpServer};

/// Path both HTTP bindings serve
pub const MCP_PATH: &str = "/mcp";

/// One JSON-RPC frame per `POST /mcp`, answered in the response body
pub struct HttpBinding {
    addr: String,
}

#[derive(Clone)]
struct HttpState {
    server: Arc<McpServer>,
    channel: Arc<Channel>,
}

impl HttpBinding {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Router for this binding; the returned channel is already open
    pub fn router(server: Arc<McpServer>) -> (Router, Arc<Channel>) {
        let channel = Channel::new("http");
        channel.open();

        let router = Router::new()
            .route(
                MCP_PATH,
                get(describe)
                    .head(method_not_allowed)
                    .post(handle_post)
                    .options(preflight)
                    .fallback(method_not_allowed),
            )
            .with_state(HttpState { server, channel: channel.clone() });
        (with_http_layers(router), channel)
    }
}

#[async_trait]
impl TransportBinding for HttpBinding {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn serve(self, server: Arc<McpServer>) -> McpResult<()> {
        let (router, channel) = Self::router(server);
        let outcome = serve_router(&self.addr, self.name(), router).await;
        channel.close();
        outcome
    }
}

async fn describe(State(state): State<HttpState>) -> Json<Value> {
    let tools: Vec<_> = state.server.definitions().iter().map(ToolDefinition::to_tool).collect();
    Json(json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "tools": tools,
    }))
}

async fn handle_post(State(state): State<HttpState>, body: Bytes) -> Response {
    let request = match jsonrpc::parse_request(&body) {
        Ok(request) => request,
        Err(error) => return rejected_frame(error),
    };
    let Ok(_guard) = state.channel.begin() else {
        return json_error(StatusCode::GONE, "Channel closed");
    };

    match state.server.handle_request(request).await {
        Some(response) => {
            debug!(id = ?response.id, is_error = response.is_error(), "response emitted");
            Json(response).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// CORS headers on every response, plus request tracing
pub(super) fn with_http_layers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

pub(super) async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub(super) async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub(super) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Malformed or truncated frame; answered here, never dispatched
pub(super) fn rejected_frame(error: jsonrpc::JsonRpcError) -> Response {
    (StatusCode::BAD_REQUEST, Json(JsonRpcResponse::failure(None, error))).into_response()
}

pub(super) async fn serve_router(addr: &str, binding: &'static str, router: Router) -> McpResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(binding, addr = %listener.local_addr()?, "MCP server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| McpError::Transport(format!("HTTP server error: {}", e)))
}
