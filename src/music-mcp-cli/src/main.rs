//! music-mcp - MCP server for Apple Music.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use music_mcp_cli::{args::Args, logging, serve};
use music_mcp_tools::Config;

/// How long to wait for runtime tasks after the server stops. The stdin
/// reader may stay blocked in a read that never returns.
const RUNTIME_SHUTDOWN: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = args.load_env_file() {
        eprintln!("music-mcp: failed to load environment file: {e}");
        return ExitCode::FAILURE;
    }
    let mut config = Config::from_env();
    args.apply(&mut config);

    let guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("music-mcp: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(serve(config));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e:#}");
            ExitCode::FAILURE
        }
    };
    drop(guard);
    code
}
