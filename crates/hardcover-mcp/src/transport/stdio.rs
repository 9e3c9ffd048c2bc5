//! Newline-delimited JSON-RPC over a byte stream pair

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{Channel, TransportBinding};
use crate::jsonrpc::{self, JsonRpcResponse};
use crate::{McpError, McpResult, McpServer};

const OUTBOUND_QUEUE: usize = 64;

/// Serves one agent over a reader/writer pair. Each frame is dispatched as its
/// own task, so responses are written in completion order.
pub struct StdioBinding<R, W> {
    reader: R,
    writer: W,
}

impl StdioBinding<Stdin, Stdout> {
    /// Bind to the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioBinding<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

#[async_trait]
impl<R, W> TransportBinding for StdioBinding<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "stdio"
    }

    async fn serve(self, server: Arc<McpServer>) -> McpResult<()> {
        let channel = Channel::new("stdio");
        channel.open();

        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_QUEUE);
        let writer = tokio::spawn(write_frames(self.writer, rx));
        let mut lines = BufReader::new(self.reader).lines();
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "invocation task failed");
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("input stream ended");
                        break;
                    };
                    let frame = line.trim();
                    if frame.is_empty() {
                        continue;
                    }

                    let request = match jsonrpc::parse_request(frame.as_bytes()) {
                        Ok(request) => request,
                        Err(error) => {
                            warn!(code = error.code, "rejecting malformed frame");
                            if tx.send(JsonRpcResponse::failure(None, error)).await.is_err() {
                                break;
                            }
                            continue;
                        }
                    };

                    let guard = channel.begin()?;
                    let server = server.clone();
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        let _guard = guard;
                        if let Some(response) = server.handle_request(request).await {
                            if tx.send(response).await.is_err() {
                                debug!("output closed before response was written");
                            }
                        }
                    });
                }
            }
        }

        let abandoned = channel.close();
        if abandoned > 0 {
            info!(abandoned, "cancelling in-flight invocations");
        }
        in_flight.shutdown().await;
        drop(tx);

        writer.await.map_err(|e| McpError::Transport(format!("writer task failed: {}", e)))?
    }
}

async fn write_frames<W>(mut writer: W, mut rx: mpsc::Receiver<JsonRpcResponse>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut frame = serde_json::to_vec(&response)?;
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
        debug!(id = ?response.id, is_error = response.is_error(), "response emitted");
    }
    Ok(())
}
