//! One handler per tool.
//!
//! Handlers take a decoded input, enforce the preconditions the schema cannot
//! express, run zero or more scripts through the shared runner and shape the
//! result. They always return an envelope; failures are folded in here.

pub mod info;
pub mod music_info;
pub mod output;
pub mod playback;
pub mod playlist;
pub mod queue;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use music_mcp_script::ScriptRunner;
use tracing::debug;

use crate::config::Config;
use crate::error::ToolError;
use crate::scripts::Script;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    runner: Arc<dyn ScriptRunner>,
    config: Arc<Config>,
}

impl HandlerContext {
    pub fn new(runner: Arc<dyn ScriptRunner>, config: Arc<Config>) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &dyn ScriptRunner {
        self.runner.as_ref()
    }

    /// Run `script` with the configured timeout.
    pub async fn run(&self, script: Script, args: Vec<String>) -> Result<String, ToolError> {
        self.run_with_timeout(script, args, self.config.timeout())
            .await
    }

    /// Run `script` and apply the output rules: process failures and `Error`
    /// markers become errors, anything else is the trimmed stdout.
    pub async fn run_with_timeout(
        &self,
        script: Script,
        args: Vec<String>,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        debug!(
            script = script.path(),
            args = args.len(),
            timeout_ms = timeout.as_millis() as u64,
            "running script"
        );
        let result = self.runner.run(&script.script_ref(), &args, timeout).await;
        output::check(result)
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Treat a missing or blank optional string as absent.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
