//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server,
//! including error handling, configuration, the protocol dispatcher, server
//! lifecycle management, and transport layer abstractions.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use config::Config;
pub use dispatcher::{DispatchError, Dispatcher, SessionState, ToolRequest, ToolResponse};
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
