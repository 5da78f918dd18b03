//! Calendar date parsing shared by the reference date and CSV due dates.

use chrono::NaiveDate;

/// Accepted date formats, tried in order; the first match wins.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a date in any of [`DATE_FORMATS`], ignoring surrounding whitespace.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}
