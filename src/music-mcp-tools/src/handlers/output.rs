//! Script output rules shared by all handlers.

use music_mcp_script::{ExecutionResult, ExitKind};
use serde_json::Value;

use crate::error::ToolError;

/// Scripts report failure by printing a line starting with this word.
pub const ERROR_MARKER: &str = "Error";

/// Classify a finished run.
///
/// The `Error` marker wins even on exit status 0; a non-zero exit is
/// described by stderr, or the exit code when stderr is empty.
pub fn check(result: ExecutionResult) -> Result<String, ToolError> {
    match result.exit_kind {
        ExitKind::Success => {}
        ExitKind::Timeout { after } => return Err(ToolError::ExternalTimeout { after }),
        ExitKind::SpawnFailure { reason } => return Err(ToolError::ExternalSpawn { reason }),
        ExitKind::NonZeroExit { code } => {
            let stderr = result.stderr.trim();
            let detail = if !stderr.is_empty() {
                stderr.to_string()
            } else {
                match code {
                    Some(code) => format!("exit code {code}"),
                    None => "terminated by signal".to_string(),
                }
            };
            return Err(ToolError::ExternalNonZeroExit { detail });
        }
    }

    let stdout = result.stdout.trim();
    if stdout.starts_with(ERROR_MARKER) {
        return Err(ToolError::ScriptReported(stdout.to_string()));
    }
    Ok(stdout.to_string())
}

/// JSON if the output parses, the raw string otherwise.
pub fn parse(output: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|_| Value::String(output.to_string()))
}

/// Number of results in a parsed payload: array length, otherwise one.
pub fn result_count(data: &Value) -> usize {
    data.as_array().map_or(1, Vec::len)
}
