//! Tools domain module.
//!
//! Tools are the operations clients invoke. Each one decodes a JSON argument
//! bag into typed parameters, validates it and produces a typed output.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `handlers.rs` - `ToolDefinition` / `ToolHandler` traits and argument decoding
//! - `registry.rs` - Ordered registry used by the dispatcher and HTTP routes
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with a params type and a
//!    `ToolDefinition` impl
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::builtin`

pub mod definitions;
mod error;
mod handlers;
mod registry;

pub use error::ToolError;
pub use handlers::{ToolContext, ToolDefinition, ToolHandler, ToolParams, parse_arguments};
pub use registry::ToolRegistry;
