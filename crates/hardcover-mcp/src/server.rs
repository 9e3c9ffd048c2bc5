//! MCP message handling on top of the dispatcher

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::{
    dispatcher::{Dispatcher, InvocationRequest, InvocationResult},
    jsonrpc::{self, JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION},
    protocol::{
        negotiate_version, CallToolParams, Implementation, InitializeParams, InitializeResult,
        ListToolsResult, ServerCapabilities, ToolsCapability, LATEST_PROTOCOL_VERSION,
        METHOD_INITIALIZE, METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SERVER_NAME,
    },
    registry::{ToolDefinition, ToolRegistry},
    McpError, McpResult,
};
use std::sync::Arc;

/// MCP server. Every transport binding drives one of these.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { dispatcher: Dispatcher::new(Arc::new(registry)) }
    }

    /// Registered tools, in advertisement order
    pub fn definitions(&self) -> &[ToolDefinition] {
        self.dispatcher.registry().definitions()
    }

    pub async fn dispatch(&self, request: InvocationRequest) -> InvocationResult {
        self.dispatcher.dispatch(request).await
    }

    /// Decode and handle one raw frame
    pub async fn process_message(&self, frame: &[u8]) -> Option<JsonRpcResponse> {
        match jsonrpc::parse_request(frame) {
            Ok(request) => self.handle_request(request).await,
            Err(error) => Some(JsonRpcResponse::failure(None, error)),
        }
    }

    /// Handle one decoded request. Notifications yield `None`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "processing message");

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(json!({ "message": "Invalid JSON-RPC version" })),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "received notification, ignoring");
            return None;
        }

        let outcome = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(request.params),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(request.params).await,
            other => {
                return Some(JsonRpcResponse::failure(
                    request.id,
                    JsonRpcError::method_not_found().with_data(json!({ "method": other })),
                ));
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => JsonRpcResponse::failure(request.id, e.to_jsonrpc_error()),
        })
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let protocol_version = match params {
            Some(params) => {
                let init: InitializeParams = serde_json::from_value(params)
                    .map_err(|e| McpError::InvalidParams(e.to_string()))?;
                if let Some(client) = &init.client_info {
                    debug!(client = %client.name, version = %client.version, "client initializing");
                }
                negotiate_version(&init.protocol_version)
            }
            None => LATEST_PROTOCOL_VERSION,
        };

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: Some(false) }),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Search the Hardcover book catalog, look up book details and read the user's library"
                    .to_string(),
            ),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ListToolsResult {
            tools: self.definitions().iter().map(ToolDefinition::to_tool).collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params
            .ok_or_else(|| McpError::InvalidParams("Missing params for tools/call".to_string()))?;
        let call: CallToolParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let request = InvocationRequest::new(call.name, call.arguments.unwrap_or_else(Map::new));
        let result = self.dispatch(request).await.into_call_result();
        Ok(serde_json::to_value(result)?)
    }
}
