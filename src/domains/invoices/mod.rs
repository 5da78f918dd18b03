//! Overdue invoice follow-ups.
//!
//! Reads an invoice CSV resource, works out how many days each invoice is
//! past due relative to a reference date, and drafts a reminder email for
//! every invoice that has crossed at least one overdue threshold. Nothing is
//! sent; the drafts are returned to the caller.

mod dates;
mod engine;
mod error;
mod templates;
mod thresholds;

pub use dates::{DATE_FORMATS, parse_date};
pub use engine::{
    FollowupEmail, InvoiceFollowupEngine, InvoiceFollowupReport, InvoiceRow, REQUIRED_COLUMNS,
    generate_followups,
};
pub use error::InvoiceError;
pub use templates::{ReminderBand, format_amount};
pub use thresholds::{DEFAULT_THRESHOLDS, OverdueThresholds};
