//! Error handling for the MCP gateway

use crate::jsonrpc::JsonRpcError;
use crate::registry::RegistryError;
use thiserror::Error;

/// Result type for gateway operations
pub type McpResult<T> = Result<T, McpError>;

/// Faults that stay outside the invocation envelope: protocol, transport and
/// startup errors. Tool-level failures are carried by
/// [`crate::InvocationResult::Failure`] instead.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider setup failed: {0}")]
    Provider(#[from] hardcover_client::ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::Serialization(e) => {
                JsonRpcError::parse_error().with_data(serde_json::json!({ "message": e.to_string() }))
            }
            McpError::InvalidParams(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({ "message": msg }))
            }
            _ => JsonRpcError::internal_error()
                .with_data(serde_json::json!({ "message": self.to_string() })),
        }
    }
}
