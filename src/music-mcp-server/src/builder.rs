//! Builder for [`McpServer`].

use std::sync::Arc;

use anyhow::{Result, bail};
use music_mcp_types::{Implementation, ServerCapabilities};

use crate::handlers::ToolService;
use crate::server::McpServer;

/// Builder for creating MCP servers.
pub struct McpServerBuilder {
    name: String,
    version: String,
    capabilities: ServerCapabilities,
    service: Option<Arc<dyn ToolService>>,
    instructions: Option<String>,
}

impl McpServerBuilder {
    /// Start a builder for a server with the given identity.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            capabilities: ServerCapabilities::default(),
            service: None,
            instructions: None,
        }
    }

    /// Set the tool service. Also announces the tools capability.
    pub fn tool_service(mut self, service: Arc<dyn ToolService>) -> Self {
        self.service = Some(service);
        self.capabilities = self.capabilities.with_tools();
        self
    }

    /// Announce `logging/setLevel` support.
    pub fn with_logging_capability(mut self) -> Self {
        self.capabilities = self.capabilities.with_logging();
        self
    }

    /// Usage hints returned from `initialize`.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Build the server. Fails if no tool service was supplied.
    pub fn build(self) -> Result<Arc<McpServer>> {
        let Some(service) = self.service else {
            bail!("MCP server '{}' has no tool service", self.name);
        };

        let mut server = McpServer::new(
            Implementation::new(self.name, self.version),
            self.capabilities,
            service,
        );
        server.instructions = self.instructions;
        Ok(Arc::new(server))
    }
}
