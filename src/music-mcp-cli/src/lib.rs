//! music-mcp binary support: argument parsing, logging and server wiring.

pub mod args;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use music_mcp_script::OsaScriptRunner;
use music_mcp_server::McpServerBuilder;
use music_mcp_tools::{Config, Dispatcher};
use tokio::signal;
use tracing::{info, warn};

pub const SERVER_NAME: &str = "music-mcp";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Controls Apple Music on macOS. Start with the `info` tool to check \
    that the Music app is reachable and automation permission is granted.";

/// Serve MCP on stdio until stdin closes or a shutdown signal arrives.
pub async fn serve(config: Config) -> Result<()> {
    for issue in config.validate() {
        warn!(%issue, "configuration issue");
    }
    info!(
        version = VERSION,
        script_dir = %config.script_dir.display(),
        interpreter = %config.interpreter,
        timeout_s = config.timeout().as_secs(),
        "starting music-mcp"
    );

    let runner = Arc::new(OsaScriptRunner::new(&config.interpreter, &config.script_dir));
    let dispatcher = Arc::new(Dispatcher::new(config, runner));
    let server = McpServerBuilder::new(SERVER_NAME, VERSION)
        .tool_service(dispatcher)
        .with_logging_capability()
        .instructions(INSTRUCTIONS)
        .build()
        .context("failed to build MCP server")?;

    tokio::select! {
        result = Arc::clone(&server).run_stdio() => {
            result.context("stdio transport failed")?;
            info!("stdin closed, shutting down");
        }
        signal = shutdown_signal() => {
            info!(signal, "received signal, shutting down");
            server.stop().await;
        }
    }
    Ok(())
}

/// Resolves on SIGINT or SIGTERM with the signal name.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
