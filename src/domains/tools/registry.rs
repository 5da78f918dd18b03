//! Tool Registry - central registration and lookup for all tools.
//!
//! Tools are registered once at startup; afterwards the registry is only
//! read. Listing order is registration order.

use std::sync::Arc;
use std::time::Instant;

use rmcp::model::Tool;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::domains::invoices::InvoiceFollowupEngine;
use crate::domains::resources::ResourceResolver;
use crate::domains::upstream::{CryptoAdapter, WeatherAdapter};

use super::definitions::{CryptoTool, FileTool, HealthTool, InvoiceFollowupTool, WeatherTool};
use super::error::ToolError;
use super::handlers::ToolHandler;

/// Tool registry - manages all available tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the five built-in tools, wired from `config`.
    ///
    /// `started` is the server start time reported by the health tool.
    pub fn builtin(config: &Config, started: Instant) -> Self {
        let client = reqwest::Client::new();
        let resolver = ResourceResolver::from_config(&config.resources);

        let mut registry = Self::new();
        let tools: [Arc<dyn ToolHandler>; 5] = [
            Arc::new(WeatherTool::new(WeatherAdapter::new(
                client.clone(),
                &config.upstream,
            ))),
            Arc::new(CryptoTool::new(CryptoAdapter::new(client, &config.upstream))),
            Arc::new(FileTool::new(resolver.clone())),
            Arc::new(HealthTool::new(
                config.server.name.clone(),
                config.server.version.clone(),
                started,
                config.upstream.timeout_secs,
            )),
            Arc::new(InvoiceFollowupTool::new(InvoiceFollowupEngine::new(resolver))),
        ];
        for tool in tools {
            // Built-in names are distinct
            if let Err(e) = registry.register(tool) {
                warn!("Skipping built-in tool: {}", e);
            }
        }
        registry
    }

    /// Register a handler. Names must be unique.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), ToolError> {
        if self.resolve(handler.name()).is_some() {
            return Err(ToolError::internal(format!(
                "tool already registered: {}",
                handler.name()
            )));
        }
        debug!("Registered tool: {}", handler.name());
        self.tools.push(handler);
        Ok(())
    }

    /// Tool metadata, in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// Look up a handler by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Registered handlers, in registration order.
    pub fn handlers(&self) -> &[Arc<dyn ToolHandler>] {
        &self.tools
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
