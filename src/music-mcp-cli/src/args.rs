//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use music_mcp_tools::Config;

/// Log verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// MCP server for controlling Apple Music.
///
/// Speaks JSON-RPC on stdin/stdout; logs go to stderr. Every option can also
/// be set through the matching MUSIC_MCP_* environment variable, flags win.
#[derive(Debug, Parser)]
#[command(name = "music-mcp")]
#[command(version)]
pub struct Args {
    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Also write logs to the log file
    #[arg(long)]
    pub file_logging: bool,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Directory containing the AppleScript bundle
    #[arg(long)]
    pub script_dir: Option<PathBuf>,

    /// Interpreter used to run scripts
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Default script timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Default and maximum number of search results
    #[arg(long)]
    pub max_search_results: Option<u64>,

    /// Do not register the queue_music tool
    #[arg(long)]
    pub no_queue_tool: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl Args {
    /// Load `.env` (or `--env-file`) into the process environment. Variables
    /// already set are left untouched; a missing default `.env` is fine.
    pub fn load_env_file(&self) -> Result<(), dotenvy::Error> {
        match &self.env_file {
            Some(path) => dotenvy::from_path(path),
            None => match dotenvy::dotenv() {
                Ok(_) => Ok(()),
                Err(e) if e.not_found() => Ok(()),
                Err(e) => Err(e),
            },
        }
    }

    /// Overlay flags on top of environment configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(level) = self.log_level {
            config.log_level = level.as_filter_str().to_string();
        }
        if self.file_logging {
            config.file_logging = true;
        }
        if let Some(path) = &self.log_file {
            config.log_file = path.clone();
        }
        if let Some(dir) = &self.script_dir {
            config.script_dir = dir.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            config.interpreter = interpreter.clone();
        }
        if let Some(secs) = self.timeout_seconds {
            config.timeout_seconds = secs;
        }
        if let Some(max) = self.max_search_results {
            config.max_search_results = max;
        }
        if self.no_queue_tool {
            config.queue_tool = false;
        }
    }
}
