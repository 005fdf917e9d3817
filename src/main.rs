use rmcp::ServiceExt;
use std::sync::Arc;
use tokio::io::{stdin, stdout};

use mdtext::config;
use mdtext::server::handler::MdTextServerHandler;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol, so logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
    log::info!("mdtext server (MCP over stdio) started.");

    let config = config::load_config()?;
    log::info!("Configuration loaded: {:?}", config);

    let handler = MdTextServerHandler::new(Arc::new(config));

    let transport = (stdin(), stdout());
    log::info!("Starting MCP server listener...");
    let server_handle = handler.serve(transport).await.inspect_err(|e| {
        log::error!("serving error: {:?}", e);
    })?;

    log::info!("mdtext server running, waiting for completion...");
    let shutdown_reason = server_handle.waiting().await?;
    log::info!("mdtext server finished. Reason: {:?}", shutdown_reason);

    Ok(())
}
