//! MCP method names handled by the server.

// Lifecycle
/// Initialize request.
pub const INITIALIZE: &str = "initialize";
/// Initialized notification.
pub const INITIALIZED: &str = "notifications/initialized";
/// Cancelled notification.
pub const CANCELLED: &str = "notifications/cancelled";
/// Ping request.
pub const PING: &str = "ping";

// Tools
/// List tools request.
pub const TOOLS_LIST: &str = "tools/list";
/// Call tool request.
pub const TOOLS_CALL: &str = "tools/call";

// Logging
/// Set log level request.
pub const LOGGING_SET_LEVEL: &str = "logging/setLevel";
