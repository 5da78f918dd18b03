//! Tool-specific error types.

use thiserror::Error;

use crate::domains::invoices::InvoiceError;
use crate::domains::resources::ResourceError;
use crate::domains::upstream::QueryError;

/// Errors a tool can report back to its caller.
///
/// Upstream outages are not in here: adapters absorb them into fallback
/// values before a tool ever sees them.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments failed decoding or validation.
    #[error("{0}")]
    InvalidArgument(String),

    /// A named resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The tool failed for a reason the caller cannot fix.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "invalid argument" error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new "not found" error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<QueryError> for ToolError {
    fn from(e: QueryError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<ResourceError> for ToolError {
    fn from(e: ResourceError) -> Self {
        match e {
            ResourceError::NotFound(_) => Self::NotFound(e.to_string()),
            ResourceError::AccessDenied(_) | ResourceError::InvalidName(_) => {
                Self::InvalidArgument(e.to_string())
            }
            ResourceError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<InvoiceError> for ToolError {
    fn from(e: InvoiceError) -> Self {
        match e {
            InvoiceError::InvalidDate(_)
            | InvoiceError::NoPositiveThresholds
            | InvoiceError::MissingColumns(_) => Self::InvalidArgument(e.to_string()),
            InvoiceError::Resource(inner) => inner.into(),
            InvoiceError::Csv(_) => Self::Internal(e.to_string()),
        }
    }
}
