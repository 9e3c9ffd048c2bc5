//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use hardcover_client::DEFAULT_API_URL;
use hardcover_mcp::config::{API_KEY_ENV, API_URL_ENV};
use hardcover_mcp::GatewayConfig;

/// Environment variable naming the listen address of the HTTP bindings
pub const ADDR_ENV: &str = "HARDCOVER_MCP_ADDR";

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(
    name = "hardcover-mcp-server",
    about = "Hardcover book catalog tools over the Model Context Protocol",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Hardcover API token
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Hardcover GraphQL endpoint
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.api_key.clone(), self.api_url.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the full catalog to a locally spawned agent over stdin/stdout
    ServeStdio,

    /// Serve the read-only catalog over request/response HTTP
    ServeHttp {
        #[command(flatten)]
        args: ListenArgs,
    },

    /// Serve the read-only catalog over server-sent events
    ServeSse {
        #[command(flatten)]
        args: ListenArgs,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListenArgs {
    /// Address to listen on
    #[arg(long, env = ADDR_ENV, default_value = DEFAULT_ADDR)]
    pub addr: String,
}
