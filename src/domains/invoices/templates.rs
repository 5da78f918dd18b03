//! Reminder email wording.

use chrono::NaiveDate;

/// Wording band for a tier. Bands escalate with the tier value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderBand {
    /// tier < 14
    Gentle,
    /// 14 <= tier < 21
    StatusCheck,
    /// tier >= 21
    Urgent,
}

impl ReminderBand {
    pub fn for_tier(tier: u32) -> Self {
        match tier {
            21.. => Self::Urgent,
            14..=20 => Self::StatusCheck,
            _ => Self::Gentle,
        }
    }
}

/// Format an amount as dollars with thousands separators: `$1,234.50`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        format!("${sign}{grouped}")
    } else {
        format!("${sign}{grouped}.{fraction}")
    }
}

/// `Invoice {number} is {days} days overdue`
pub fn subject(invoice_number: &str, days_overdue: i64) -> String {
    format!("Invoice {invoice_number} is {days_overdue} days overdue")
}

/// Render the email body for a reminder band.
pub fn body(
    band: ReminderBand,
    broker: &str,
    invoice_number: &str,
    amount: f64,
    due_date: NaiveDate,
    days_overdue: i64,
) -> String {
    let amount = format_amount(amount);
    let due = due_date.format("%Y-%m-%d");
    let greeting = format!("Hi {broker},");

    match band {
        ReminderBand::Urgent => format!(
            "{greeting}\n\n\
             This is a third reminder that invoice {invoice_number} for {amount} was due on {due} \
             and is now {days_overdue} days overdue. Please arrange payment immediately or reply with an \
             update so we can reconcile our records.\n\n\
             If payment has been made, please share the remittance details.\n\n\
             Thank you,\nAccounts Receivable"
        ),
        ReminderBand::StatusCheck => format!(
            "{greeting}\n\n\
             Friendly follow-up on invoice {invoice_number} for {amount} due {due}. \
             Our records show it is {days_overdue} days overdue. Could you share a quick status or \
             expected payment date?\n\n\
             Thanks so much,\nAccounts Receivable"
        ),
        ReminderBand::Gentle => format!(
            "{greeting}\n\n\
             Quick reminder: invoice {invoice_number} for {amount} was due {due} and appears to be \
             {days_overdue} days overdue. Please let us know if you need the invoice resent or have any \
             questions.\n\n\
             Best,\nAccounts Receivable"
        ),
    }
}
