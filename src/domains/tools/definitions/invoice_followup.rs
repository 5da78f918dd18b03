//! Invoice follow-up tool definition.

use std::fmt;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, de};
use tracing::{info, instrument};

use crate::domains::invoices::{DEFAULT_THRESHOLDS, InvoiceFollowupEngine, InvoiceFollowupReport};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolParams};

/// Parameters for the invoice follow-up tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InvoiceFollowupParams {
    /// Invoice CSV file in the resource directory.
    #[serde(default = "default_csv_name")]
    pub csv_name: String,

    /// Overdue-day thresholds. Non-positive values are ignored.
    #[serde(default = "default_thresholds", deserialize_with = "lenient_integers")]
    pub thresholds: Vec<i64>,

    /// Reference date (YYYY-MM-DD, MM/DD/YYYY or DD-MM-YYYY). Defaults to today (UTC).
    #[serde(default)]
    pub today: Option<String>,
}

fn default_csv_name() -> String {
    "Fake_Invoice_Data.csv".to_string()
}

fn default_thresholds() -> Vec<i64> {
    DEFAULT_THRESHOLDS.to_vec()
}

/// A threshold as clients send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInteger {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseInteger {
    fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) => whole_number(*f),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
            }
        }
    }
}

impl fmt::Display for LooseInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Accept integers, integral floats (`7.0`) and numeric strings (`"7"`).
fn lenient_integers<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<LooseInteger>::deserialize(deserializer)?
        .iter()
        .map(|value| {
            value.to_integer().ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("threshold is not an integer: {value}"))
            })
        })
        .collect()
}

impl ToolParams for InvoiceFollowupParams {}

/// Drafts reminder emails for overdue invoices.
pub struct InvoiceFollowupTool {
    engine: InvoiceFollowupEngine,
}

impl InvoiceFollowupTool {
    pub fn new(engine: InvoiceFollowupEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ToolDefinition for InvoiceFollowupTool {
    const NAME: &'static str = "invoice_followup";

    const DESCRIPTION: &'static str = "Read an invoice CSV and draft tiered follow-up emails for every invoice overdue by at least one threshold (default 7, 14 and 21 days).";

    type Params = InvoiceFollowupParams;
    type Output = InvoiceFollowupReport;

    #[instrument(skip_all, fields(csv = %params.csv_name))]
    async fn run(
        &self,
        params: InvoiceFollowupParams,
        _ctx: &ToolContext,
    ) -> Result<InvoiceFollowupReport, ToolError> {
        info!("Invoice follow-up tool called");
        Ok(self
            .engine
            .run(&params.csv_name, &params.thresholds, params.today.as_deref())?)
    }
}
