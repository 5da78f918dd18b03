//! MCP demo tool server.
//!
//! Five tools (weather, crypto, file, health, invoice_followup) served over
//! line-delimited JSON-RPC (stdio, TCP) and HTTP.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the JSON-RPC protocol types,
//!   the dispatcher, the server and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool definitions and the registry
//!   - **upstream**: weather and crypto adapters with local fallbacks
//!   - **invoices**: overdue invoice follow-up generation
//!   - **resources**: sandboxed access to resource files
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_demo_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
