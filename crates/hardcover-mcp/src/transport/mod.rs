//! Transport bindings
//!
//! Each binding frames JSON-RPC requests inbound and responses outbound for
//! one kind of channel, and drives a shared [`McpServer`]:
//!
//! - [`StdioBinding`]: newline-delimited frames over a byte stream pair
//! - [`HttpBinding`]: one request per HTTP call, answered synchronously
//! - [`SseBinding`]: long-lived event stream per client, requests posted alongside

mod channel;
mod http;
mod sse;
mod stdio;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{McpResult, McpServer};

pub use channel::{Channel, ChannelState, InvocationGuard};
pub use http::{HttpBinding, MCP_PATH};
pub use sse::SseBinding;
pub use stdio::StdioBinding;

#[async_trait]
pub trait TransportBinding: Send + Sized {
    fn name(&self) -> &'static str;

    /// Accept and answer invocations until the channel closes
    async fn serve(self, server: Arc<McpServer>) -> McpResult<()>;
}
