//! Resource-specific error types.

use thiserror::Error;

/// Errors that can occur while resolving or reading a resource file.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested resource does not exist under the resource root.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The resource name resolves outside the resource root.
    #[error("access denied: '{0}' escapes the resource directory")]
    AccessDenied(String),

    /// The resource name is empty or otherwise unusable.
    #[error("invalid resource name: {0}")]
    InvalidName(String),

    /// An I/O error occurred while accessing the resource.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "access denied" error.
    pub fn access_denied(name: impl Into<String>) -> Self {
        Self::AccessDenied(name.into())
    }

    /// Create a new "invalid name" error.
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }
}
