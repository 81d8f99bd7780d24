//! Runtime configuration, read from `MUSIC_MCP_*` environment variables.
//!
//! Bad values never abort startup. They fall back to the default and are
//! recorded as issues, which [`Config::validate`] reports alongside range
//! problems and the `info` tool surfaces to the client.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const ENV_LOG_LEVEL: &str = "MUSIC_MCP_LOG_LEVEL";
pub const ENV_FILE_LOGGING: &str = "MUSIC_MCP_FILE_LOGGING";
pub const ENV_LOG_FILE: &str = "MUSIC_MCP_LOG_FILE";
pub const ENV_MAX_SEARCH_RESULTS: &str = "MUSIC_MCP_MAX_SEARCH_RESULTS";
pub const ENV_TIMEOUT_SECONDS: &str = "MUSIC_MCP_TIMEOUT_SECONDS";
pub const ENV_SCRIPT_DIR: &str = "MUSIC_MCP_SCRIPT_DIR";
pub const ENV_INTERPRETER: &str = "MUSIC_MCP_INTERPRETER";
pub const ENV_APP_NAME: &str = "MUSIC_MCP_APP_NAME";
pub const ENV_QUEUE_TOOL: &str = "MUSIC_MCP_QUEUE_TOOL";

/// Log levels accepted by `MUSIC_MCP_LOG_LEVEL`.
pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

/// Hard ceiling on search results, whatever the configuration says.
pub const SEARCH_RESULTS_CEILING: u64 = 100;

/// A configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected} (got '{value}')")]
    Unparsable {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{var} must be positive")]
    NotPositive { var: &'static str },

    #[error("MUSIC_MCP_LOG_LEVEL must be one of: debug, info, warn, error")]
    UnknownLogLevel,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lowercased log level name.
    pub log_level: String,
    /// Whether the file log sink is enabled.
    pub file_logging: bool,
    pub log_file: PathBuf,
    /// Default and cap for `search_music` limits.
    pub max_search_results: u64,
    /// Default per-call script timeout.
    pub timeout_seconds: u64,
    /// Root of the AppleScript bundle.
    pub script_dir: PathBuf,
    pub interpreter: String,
    /// Application checked by the `info` tool.
    pub app_name: String,
    /// Register the `queue_music` tool.
    pub queue_tool: bool,
    pub(crate) parse_errors: Vec<ConfigError>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            file_logging: false,
            log_file: default_log_file(),
            max_search_results: default_max_search_results(),
            timeout_seconds: default_timeout_seconds(),
            script_dir: default_script_dir(),
            interpreter: default_interpreter(),
            app_name: default_app_name(),
            queue_tool: true,
            parse_errors: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Library").join("Logs"))
        .unwrap_or_default()
        .join("music-mcp.log")
}

fn default_max_search_results() -> u64 {
    50
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_script_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("scripts")))
        .unwrap_or_else(|| PathBuf::from("scripts"))
}

fn default_interpreter() -> String {
    "osascript".to_string()
}

fn default_app_name() -> String {
    "Music".to_string()
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.to_lowercase();
        }
        if let Some(path) = get(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_SCRIPT_DIR) {
            config.script_dir = PathBuf::from(dir);
        }
        if let Some(interpreter) = get(ENV_INTERPRETER) {
            config.interpreter = interpreter;
        }
        if let Some(app) = get(ENV_APP_NAME) {
            config.app_name = app;
        }

        if let Some(raw) = get(ENV_FILE_LOGGING) {
            config.file_logging = config.parse_bool(ENV_FILE_LOGGING, raw, false);
        }
        if let Some(raw) = get(ENV_QUEUE_TOOL) {
            config.queue_tool = config.parse_bool(ENV_QUEUE_TOOL, raw, true);
        }
        if let Some(raw) = get(ENV_MAX_SEARCH_RESULTS) {
            config.max_search_results =
                config.parse_u64(ENV_MAX_SEARCH_RESULTS, raw, default_max_search_results());
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECONDS) {
            config.timeout_seconds =
                config.parse_u64(ENV_TIMEOUT_SECONDS, raw, default_timeout_seconds());
        }

        config
    }

    fn parse_bool(&mut self, var: &'static str, raw: String, fallback: bool) -> bool {
        match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                self.parse_errors.push(ConfigError::Unparsable {
                    var,
                    value: raw,
                    expected: "a boolean",
                });
                fallback
            }
        }
    }

    fn parse_u64(&mut self, var: &'static str, raw: String, fallback: u64) -> u64 {
        match raw.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                self.parse_errors.push(ConfigError::Unparsable {
                    var,
                    value: raw,
                    expected: "a non-negative integer",
                });
                fallback
            }
        }
    }

    /// All configuration problems found, as human-readable messages.
    pub fn validate(&self) -> Vec<String> {
        self.errors().iter().map(ToString::to_string).collect()
    }

    pub fn errors(&self) -> Vec<ConfigError> {
        let mut errors = self.parse_errors.clone();
        if self.max_search_results < 1 {
            errors.push(ConfigError::NotPositive {
                var: ENV_MAX_SEARCH_RESULTS,
            });
        }
        if self.timeout_seconds < 1 {
            errors.push(ConfigError::NotPositive {
                var: ENV_TIMEOUT_SECONDS,
            });
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(ConfigError::UnknownLogLevel);
        }
        errors
    }

    /// Default script timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// Configured search cap, clamped to `1..=100`.
    pub fn search_cap(&self) -> u64 {
        self.max_search_results.clamp(1, SEARCH_RESULTS_CEILING)
    }

    /// The log level if it is one of [`LOG_LEVELS`], otherwise `info`.
    pub fn effective_log_level(&self) -> &str {
        if LOG_LEVELS.contains(&self.log_level.as_str()) {
            &self.log_level
        } else {
            "info"
        }
    }
}
