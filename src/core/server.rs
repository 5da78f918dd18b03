//! MCP Server implementation and lifecycle management.
//!
//! `McpServer` wires the configuration into the tool registry and the
//! dispatcher. It is cheap to clone; transports hold one copy per task.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::config::Config;
use super::dispatcher::Dispatcher;
use crate::domains::tools::ToolRegistry;

/// The main MCP server.
#[derive(Debug, Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Protocol dispatcher shared by all transports.
    dispatcher: Dispatcher,

    /// Server start time, reported by the health tool.
    started: Instant,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let started = Instant::now();
        let registry = ToolRegistry::builtin(&config, started);
        info!("Registered tools: {}", registry.tool_names().join(", "));

        let dispatcher = Dispatcher::new(registry, &config.server, config.upstream.force_fallback);

        Self {
            config: Arc::new(config),
            dispatcher,
            started,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// The protocol dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// When the server was created.
    pub fn started(&self) -> Instant {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_wiring() {
        let server = McpServer::new(Config::default());
        assert_eq!(server.name(), "mcp-demo");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(server.dispatcher().list_tools().len(), 5);
        assert!(server.started() <= Instant::now());
    }
}
