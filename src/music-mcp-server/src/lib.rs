//! music-mcp server - Model Context Protocol server loop.
//!
//! This crate owns the protocol side of the music-mcp binary:
//! - JSON-RPC routing for `initialize`, `ping`, `tools/list`, `tools/call`
//!   and `logging/setLevel`
//! - a newline-delimited stdio transport with pipelined tool calls
//! - the [`ToolService`] seam that the tool dispatcher plugs into
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use music_mcp_server::{McpServerBuilder, ToolService};
//! use music_mcp_types::{CallToolResult, Tool};
//! use serde_json::Value;
//!
//! struct Hello;
//!
//! #[async_trait::async_trait]
//! impl ToolService for Hello {
//!     fn tools(&self) -> Vec<Tool> {
//!         vec![Tool::new("hello", "Say hello")]
//!     }
//!     async fn call(&self, _name: &str, _arguments: Value) -> CallToolResult {
//!         CallToolResult::text("hello")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = McpServerBuilder::new("hello-server", "1.0.0")
//!         .tool_service(Arc::new(Hello))
//!         .build()?;
//!     server.run_stdio().await
//! }
//! ```

mod builder;
mod handlers;
mod server;

pub use builder::McpServerBuilder;
pub use handlers::ToolService;
pub use server::{McpServer, ServerState};

pub use music_mcp_types;
