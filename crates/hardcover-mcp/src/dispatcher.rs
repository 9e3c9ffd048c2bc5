//! Invocation dispatcher: registry lookup, validation, handler call, envelope

use async_trait::async_trait;
use hardcover_client::ProviderError;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::protocol::{CallToolResult, ContentBlock};
use crate::registry::ToolRegistry;
use crate::validator::{self, ValidatedArguments, ValidationError};

/// One call of a named tool
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self { tool_name: tool_name.into(), arguments }
    }
}

/// Envelope returned for every invocation
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success { content: Vec<ContentBlock> },
    Failure { message: String },
}

impl InvocationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        InvocationResult::Failure { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InvocationResult::Failure { .. })
    }

    pub fn into_call_result(self) -> CallToolResult {
        match self {
            InvocationResult::Success { content } => CallToolResult { content, is_error: None },
            InvocationResult::Failure { message } => CallToolResult {
                content: vec![ContentBlock::text(message)],
                is_error: Some(true),
            },
        }
    }
}

/// Data produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Serialized as pretty-printed JSON text
    Json(Value),
    Text(String),
}

impl ToolOutput {
    fn into_block(self) -> ContentBlock {
        match self {
            ToolOutput::Json(value) => {
                let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                ContentBlock::text(text)
            }
            ToolOutput::Text(text) => ContentBlock::text(text),
        }
    }
}

/// Failure raised by a handler
#[derive(Debug, Error)]
pub enum ToolError {
    /// The entity does not exist at the provider
    #[error("{0}")]
    NotFound(String),

    #[error("Failed to {operation}: {}", describe_cause(.source))]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    InvalidArgument(#[from] ValidationError),
}

impl ToolError {
    pub fn provider(operation: &'static str) -> impl FnOnce(ProviderError) -> ToolError {
        move |source| ToolError::Provider { operation, source }
    }
}

/// Text for a fault, falling back to its debug rendering when the display text is empty
pub fn describe_cause(err: &dyn std::error::Error) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        format!("{:?}", err)
    } else {
        text
    }
}

/// Capability bound to a tool definition
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError>;
}

/// Routes invocations to the handlers of a fixed registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one invocation. Never fails: every fault becomes a `Failure` envelope.
    pub async fn dispatch(&self, request: InvocationRequest) -> InvocationResult {
        let tool = request.tool_name.as_str();
        info!(tool, "invocation received");

        let Some(definition) = self.registry.lookup(tool) else {
            warn!(tool, "unknown tool");
            return InvocationResult::failure(format!("unknown tool {}", tool));
        };

        let args = match validator::validate(definition, request.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool, field = %e.field, expected = %e.expected, "argument validation failed");
                return InvocationResult::failure(e.to_string());
            }
        };

        let started = Instant::now();
        debug!(tool, "provider call started");
        let outcome = definition.handler.call(args).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                info!(tool, elapsed_ms, "provider call finished");
                InvocationResult::Success { content: vec![output.into_block()] }
            }
            Err(e) => {
                warn!(tool, elapsed_ms, error = %e, "provider call failed");
                InvocationResult::failure(e.to_string())
            }
        }
    }
}
