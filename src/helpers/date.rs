//! Date helper functions

use chrono::NaiveDate;

/// Format an ISO date the long US way
///
/// # Examples
/// ```ignore
/// long_date("2024-01-05") // -> "January 5, 2024"
/// ```
pub fn long_date(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}
