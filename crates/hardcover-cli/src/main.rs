//! Hardcover MCP gateway entry point

use clap::Parser;
use hardcover_cli::{
    cli::{Cli, Commands},
    commands::{serve_http, serve_sse, serve_stdio},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Disable colored output if requested
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(!cli.no_color)?;

    info!("Hardcover MCP v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.gateway_config();
    match cli.command {
        Commands::ServeStdio => serve_stdio(config).await?,
        Commands::ServeHttp { args } => serve_http(config, args).await?,
        Commands::ServeSse { args } => serve_sse(config, args).await?,
    }

    Ok(())
}
