//! Invoice follow-up error types.

use thiserror::Error;

use crate::domains::resources::ResourceError;

/// Errors that abort a follow-up run.
///
/// Problems with individual rows are not errors: those rows are skipped.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The reference date override matched none of the accepted formats.
    #[error("unrecognized date format: {0}")]
    InvalidDate(String),

    /// No threshold survived normalization.
    #[error("thresholds must contain positive integers")]
    NoPositiveThresholds,

    /// The CSV header lacks required columns (sorted).
    #[error("csv missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The CSV resource could not be resolved or opened.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The CSV header could not be read.
    #[error("unreadable csv: {0}")]
    Csv(#[from] csv::Error),
}
