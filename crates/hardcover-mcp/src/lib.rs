//! Hardcover MCP (Model Context Protocol) gateway
//!
//! Exposes a fixed catalog of book tools (search, details, library) to
//! language-model agents. Invocations arrive over one of three transport
//! bindings, are validated against each tool's parameter schema, dispatched to
//! a [`hardcover_client::CatalogProvider`], and answered with a uniform
//! success/failure envelope.

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod transport;
pub mod validator;

// Re-export key types
pub use catalog::CatalogProfile;
pub use config::GatewayConfig;
pub use dispatcher::{Dispatcher, InvocationRequest, InvocationResult};
pub use error::{McpError, McpResult};
pub use registry::{ToolDefinition, ToolRegistry};
pub use server::McpServer;
pub use session::Session;
pub use transport::{HttpBinding, SseBinding, StdioBinding, TransportBinding};
