//! Resources domain module.
//!
//! Read-only files that tools operate on (text documents, invoice CSVs) live
//! under a single resource root. This module resolves tool-supplied names
//! against that root.
//!
//! ## Architecture
//!
//! - `resolver.rs` - Name to path resolution with containment checks
//! - `error.rs` - Resource-specific error types

mod error;
mod resolver;

pub use error::ResourceError;
pub use resolver::ResourceResolver;
