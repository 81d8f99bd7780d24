//! The uniform `{success, data, message, error}` response shape.

use music_mcp_types::CallToolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Appended to the message of every failure that came from a script process.
pub const APP_HINT: &str =
    "Ensure Music app is running and you have granted automation permissions.";

/// Exactly one of these is produced per tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Failure envelope. `context` prefixes the message of external failures,
    /// e.g. `Search failed`.
    pub fn failure(context: &str, err: &ToolError) -> Self {
        let message = if err.is_external() {
            format!("{context}: {err}. {APP_HINT}")
        } else {
            err.to_string()
        };
        Self {
            success: false,
            data: None,
            message,
            error: Some(err.tag()),
        }
    }

    /// Encode as MCP tool result: pretty JSON text, `isError` on failure.
    pub fn into_call_result(self) -> CallToolResult {
        let text = serde_json::to_string_pretty(&self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"message":"Failed to encode response: {e}"}}"#)
        });
        if self.success {
            CallToolResult::text(text)
        } else {
            CallToolResult::error(text)
        }
    }
}
