//! Gateway serve commands, one per transport binding

use anyhow::{Context, Result};
use hardcover_mcp::{
    CatalogProfile, GatewayConfig, HttpBinding, Session, SseBinding, StdioBinding,
};
use tracing::{info, warn};

use crate::cli::ListenArgs;
use crate::utils::ColoredOutput;

/// Full catalog over stdin/stdout. A missing credential is fatal here.
pub async fn serve_stdio(config: GatewayConfig) -> Result<()> {
    config.require_credential()?;

    let session = Session::from_config(&config, CatalogProfile::Local)
        .context("Failed to build the catalog session")?;
    info!(api_url = %config.api_url, "Starting stdio MCP server");

    session.run(StdioBinding::stdio()).await?;
    Ok(())
}

pub async fn serve_http(config: GatewayConfig, args: ListenArgs) -> Result<()> {
    let session = hosted_session(&config)?;
    eprintln!(
        "{} http://{}{}",
        ColoredOutput::highlight("Hardcover MCP (HTTP) on"),
        args.addr,
        hardcover_mcp::transport::MCP_PATH
    );

    session.run(HttpBinding::new(args.addr)).await?;
    Ok(())
}

pub async fn serve_sse(config: GatewayConfig, args: ListenArgs) -> Result<()> {
    let session = hosted_session(&config)?;
    eprintln!(
        "{} http://{}{}",
        ColoredOutput::highlight("Hardcover MCP (SSE) on"),
        args.addr,
        hardcover_mcp::transport::MCP_PATH
    );

    session.run(SseBinding::new(args.addr)).await?;
    Ok(())
}

fn hosted_session(config: &GatewayConfig) -> Result<Session> {
    if config.credential().is_none() {
        warn!("No Hardcover API token configured; tool calls will fail until one is set");
    }
    Session::from_config(config, CatalogProfile::Hosted)
        .context("Failed to build the catalog session")
}
