//! Follow-up generation over invoice CSV rows.

use std::io;

use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dates::parse_date;
use super::error::InvoiceError;
use super::templates::{self, ReminderBand};
use super::thresholds::OverdueThresholds;
use crate::domains::resources::ResourceResolver;

/// Columns every invoice CSV must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["invoice_number", "broker", "due_date", "amount"];

/// One well-formed invoice row.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub invoice_number: String,
    pub broker: String,
    pub due_date: NaiveDate,
    pub amount: f64,
}

/// A generated reminder for one overdue invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FollowupEmail {
    pub invoice_number: String,
    pub broker: String,
    /// Due date, `YYYY-MM-DD`.
    pub due_date: String,
    pub amount: f64,
    pub days_overdue: i64,
    /// Largest threshold met by `days_overdue`.
    pub tier: u32,
    pub subject: String,
    pub body: String,
}

/// Result of one follow-up run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InvoiceFollowupReport {
    /// Data rows read, including malformed and not-yet-due rows.
    pub processed: usize,
    /// Number of emails generated.
    pub overdue: usize,
    /// Emails in CSV row order.
    pub emails: Vec<FollowupEmail>,
    /// CSV file name the rows came from.
    pub source: String,
}

/// Column positions of the required fields within a CSV header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    invoice_number: usize,
    broker: usize,
    due_date: usize,
    amount: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, InvoiceError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(InvoiceError::MissingColumns(missing));
        }

        Ok(Self {
            invoice_number: position("invoice_number").unwrap_or_default(),
            broker: position("broker").unwrap_or_default(),
            due_date: position("due_date").unwrap_or_default(),
            amount: position("amount").unwrap_or_default(),
        })
    }
}

/// Parse one data row. `None` means the row is malformed and must be skipped.
fn parse_row(record: &csv::StringRecord, columns: ColumnIndex) -> Option<InvoiceRow> {
    let invoice_number = record.get(columns.invoice_number)?.trim().to_string();
    let broker = record.get(columns.broker)?.trim().to_string();
    let due_date = parse_date(record.get(columns.due_date)?)?;
    let amount = record
        .get(columns.amount)?
        .replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()?;

    Some(InvoiceRow {
        invoice_number,
        broker,
        due_date,
        amount,
    })
}

fn build_email(row: InvoiceRow, days_overdue: i64, tier: u32) -> FollowupEmail {
    let body = templates::body(
        ReminderBand::for_tier(tier),
        &row.broker,
        &row.invoice_number,
        row.amount,
        row.due_date,
        days_overdue,
    );

    FollowupEmail {
        subject: templates::subject(&row.invoice_number, days_overdue),
        due_date: row.due_date.format("%Y-%m-%d").to_string(),
        invoice_number: row.invoice_number,
        broker: row.broker,
        amount: row.amount,
        days_overdue,
        tier,
        body,
    }
}

/// Generate reminders from CSV data.
///
/// Returns the number of data rows processed and the emails, in row order.
pub fn generate_followups<R: io::Read>(
    reader: R,
    thresholds: &OverdueThresholds,
    today: NaiveDate,
) -> Result<(usize, Vec<FollowupEmail>), InvoiceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut processed = 0;
    let mut emails = Vec::new();

    for (line, record) in reader.records().enumerate() {
        processed += 1;

        let Some(row) = record.ok().and_then(|r| parse_row(&r, columns)) else {
            debug!("Skipping malformed invoice row {}", line + 1);
            continue;
        };

        let days_overdue = (today - row.due_date).num_days();
        if days_overdue <= 0 {
            continue;
        }

        let Some(tier) = thresholds.tier_for(days_overdue) else {
            continue;
        };

        emails.push(build_email(row, days_overdue, tier));
    }

    Ok((processed, emails))
}

/// Runs follow-up generation against CSV resources.
#[derive(Debug, Clone)]
pub struct InvoiceFollowupEngine {
    resolver: ResourceResolver,
}

impl InvoiceFollowupEngine {
    pub fn new(resolver: ResourceResolver) -> Self {
        Self { resolver }
    }

    /// Run the full pipeline: reference date, thresholds, CSV resource, rows.
    ///
    /// `today` overrides the reference date; when absent or blank the current
    /// UTC date is used.
    pub fn run(
        &self,
        csv_name: &str,
        raw_thresholds: &[i64],
        today: Option<&str>,
    ) -> Result<InvoiceFollowupReport, InvoiceError> {
        let today = match today.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => parse_date(raw).ok_or_else(|| InvoiceError::InvalidDate(raw.to_string()))?,
            None => Utc::now().date_naive(),
        };

        let thresholds = OverdueThresholds::normalize(raw_thresholds)?;
        let file = self.resolver.open(csv_name)?;

        info!(
            "Generating follow-ups from {} as of {} (thresholds {:?})",
            csv_name,
            today,
            thresholds.as_slice()
        );

        let (processed, emails) = generate_followups(file, &thresholds, today)?;
        info!(
            "Processed {} invoice rows, {} overdue",
            processed,
            emails.len()
        );

        Ok(InvoiceFollowupReport {
            processed,
            overdue: emails.len(),
            emails,
            source: csv_name.to_string(),
        })
    }
}
