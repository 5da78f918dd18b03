//! Tool definitions module.
//!
//! One file per tool. Each file owns the tool's parameter type, its
//! validation and its `ToolDefinition` impl.

mod crypto;
mod file;
mod health;
mod invoice_followup;
mod weather;

pub use crypto::{CryptoParams, CryptoTool};
pub use file::{FileDigest, FileParams, FileTool, digest_text};
pub use health::{HealthParams, HealthReport, HealthTool, HealthVersions};
pub use invoice_followup::{InvoiceFollowupParams, InvoiceFollowupTool};
pub use weather::{WeatherParams, WeatherTool};
