use chrono::{Local, NaiveDate};

use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date, also accepting an ISO timestamp such as
/// `2024-03-01T00:00:00.000Z` (the time part is dropped).
pub fn parse_date(field: &str, raw: &str) -> AppResult<String> {
    let raw = raw.trim();
    let date_part = raw.split_once('T').map(|(d, _)| d).unwrap_or(raw);

    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            AppError::Validation(format!("{} must be a date in YYYY-MM-DD format", field))
        })
}

pub fn parse_or_today(field: &str, raw: Option<&str>) -> AppResult<String> {
    match raw.filter(|r| !r.trim().is_empty()) {
        Some(r) => parse_date(field, r),
        None => Ok(today()),
    }
}
