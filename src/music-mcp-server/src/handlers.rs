//! The seam between the protocol loop and the tools it serves.

use music_mcp_types::{CallToolResult, Tool};
use serde_json::Value;

/// Serves the fixed tool set behind `tools/list` and `tools/call`.
///
/// `call` is infallible: whatever goes wrong inside a tool must come back as
/// an error-flagged [`CallToolResult`], never as a protocol error.
#[async_trait::async_trait]
pub trait ToolService: Send + Sync {
    /// Tool descriptors in listing order.
    fn tools(&self) -> Vec<Tool>;

    /// Invoke a tool by name.
    async fn call(&self, name: &str, arguments: Value) -> CallToolResult;
}
