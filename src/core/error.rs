//! Error types and handling for the MCP server.
//!
//! Errors that reach the binary: bad configuration and transport failures.
//! Tool failures never get this far; the dispatcher turns them into replies.

use thiserror::Error;

use super::transport::TransportError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by a transport while serving.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
