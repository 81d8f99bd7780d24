//! Tool layer for music-mcp.
//!
//! The [`Dispatcher`] owns an immutable [`ToolRegistry`] and a shared
//! [`ScriptRunner`](music_mcp_script::ScriptRunner). Every tool call goes
//! through the same pipeline:
//!
//! 1. look the tool up by name (`Unknown tool` otherwise)
//! 2. validate the raw arguments against the tool's [`SchemaNode`]
//! 3. decode them into the closed [`ToolInput`] union
//! 4. run the handler, which may invoke zero or more scripts
//! 5. wrap the outcome, or a panic, in exactly one [`ResponseEnvelope`]
//!
//! The dispatcher implements [`music_mcp_server::ToolService`], so it plugs
//! straight into the protocol server.

pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod input;
pub mod registry;
pub mod schema;
pub mod scripts;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, ConfigError};
pub use dispatcher::Dispatcher;
pub use envelope::ResponseEnvelope;
pub use error::ToolError;
pub use input::ToolInput;
pub use registry::{ToolDescriptor, ToolKind, ToolRegistry};
pub use schema::{FieldSpec, SchemaNode};
pub use scripts::Script;
