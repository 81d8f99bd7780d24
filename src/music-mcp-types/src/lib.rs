//! Model Context Protocol wire types for the music-mcp server.
//!
//! Only the slice of MCP the server speaks is modelled here:
//! - JSON-RPC 2.0 request/response/notification framing
//! - `initialize` handshake and server capabilities
//! - tool discovery (`tools/list`) and invocation (`tools/call`)
//! - `logging/setLevel`
//!
//! # Example
//! ```rust
//! use music_mcp_types::{PropertySchema, Tool, ToolInputSchema};
//!
//! let tool = Tool::new("search_music", "Search the music library").with_schema(
//!     ToolInputSchema::object()
//!         .property("query", PropertySchema::string().description("Search query"))
//!         .required(vec!["query"]),
//! );
//! assert_eq!(tool.name, "search_music");
//! ```

mod capabilities;
mod content;
mod initialization;
mod jsonrpc;
mod logging;
mod notifications;
mod tools;

/// MCP method name constants.
pub mod methods;

/// MCP protocol version announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub use capabilities::{ClientCapabilities, LoggingCapability, ServerCapabilities, ToolsCapability};
pub use content::Content;
pub use initialization::{Implementation, InitializeParams, InitializeResult};
pub use jsonrpc::{
    ErrorCode, JSONRPC_VERSION, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId,
};
pub use logging::{LogLevel, SetLogLevelParams};
pub use notifications::CancelledNotification;
pub use tools::{
    CallToolParams, CallToolResult, ListToolsResult, PropertySchema, Tool, ToolInputSchema,
};
