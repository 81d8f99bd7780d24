//! Tool failure taxonomy.

use std::time::Duration;

use thiserror::Error;

pub const INVALID_ARGUMENTS: &str = "Invalid arguments";
pub const UNKNOWN_TOOL: &str = "Unknown tool";
pub const TOOL_EXECUTION_FAILED: &str = "Tool execution failed";

/// Why a tool call failed.
///
/// Every variant becomes a `success=false` envelope; [`ToolError::tag`] is
/// the machine-readable `error` field and the `Display` text is the human
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Arguments do not match the declared input shape.
    #[error("{message}")]
    Validation { tag: String, message: String },

    /// A per-action precondition is not met.
    #[error("{message}")]
    MissingParameter { tag: &'static str, message: String },

    #[error("Script execution timed out after {}ms", .after.as_millis())]
    ExternalTimeout { after: Duration },

    #[error("Script execution failed: {detail}")]
    ExternalNonZeroExit { detail: String },

    #[error("Failed to start script: {reason}")]
    ExternalSpawn { reason: String },

    /// The script printed an `Error...` marker.
    #[error("{0}")]
    ScriptReported(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    HandlerPanic(String),
}

impl ToolError {
    /// Validation failure with the generic tag.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            tag: INVALID_ARGUMENTS.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(tag: &'static str, message: impl Into<String>) -> Self {
        Self::MissingParameter {
            tag,
            message: message.into(),
        }
    }

    /// Machine-readable tag for the envelope's `error` field.
    pub fn tag(&self) -> String {
        match self {
            Self::Validation { tag, .. } => tag.clone(),
            Self::MissingParameter { tag, .. } => (*tag).to_string(),
            Self::ExternalTimeout { .. }
            | Self::ExternalNonZeroExit { .. }
            | Self::ExternalSpawn { .. }
            | Self::ScriptReported(_) => self.to_string(),
            Self::UnknownTool(_) => UNKNOWN_TOOL.to_string(),
            Self::HandlerPanic(_) => TOOL_EXECUTION_FAILED.to_string(),
        }
    }

    /// Whether the failure came from running a script process.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalTimeout { .. } | Self::ExternalNonZeroExit { .. } | Self::ExternalSpawn { .. }
        )
    }

    /// Whether the failure was detected before any script ran.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::MissingParameter { .. } | Self::UnknownTool(_)
        )
    }
}
