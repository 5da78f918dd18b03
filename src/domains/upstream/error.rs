//! Upstream adapter error types.

use thiserror::Error;

/// Why a live upstream call did not produce a value.
///
/// These never reach a caller: the adapter turns every variant into a
/// fallback value tagged with [`Provenance::Fallback`](super::Provenance).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The caller asked to skip the network entirely.
    #[error("live call bypassed")]
    Bypassed,

    /// Transport-level failure, including the per-call timeout.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The upstream answered but the payload was not what we expect.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Create a new "malformed payload" error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Whether the failure was the per-call timeout expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// A query that cannot be sent upstream at all.
///
/// Unlike [`FetchError`], these are the caller's fault and are reported back
/// as invalid arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("provide city or lat/lon")]
    MissingLocation,

    #[error("provide either city or lat/lon, not both")]
    AmbiguousLocation,

    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("lat must be within [-90, 90] and lon within [-180, 180]")]
    CoordinatesOutOfRange,

    #[error("days must be between 1 and 7, got {0}")]
    DaysOutOfRange(i64),

    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("vs currency must not be empty")]
    EmptyCurrency,
}
