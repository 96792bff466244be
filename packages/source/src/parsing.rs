//! Shared field parsing utilities for the dataset readers.

use chrono::NaiveDate;

/// Parses a date using a `chrono` format string, ignoring surrounding
/// whitespace.
#[must_use]
pub fn parse_date(s: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), format).ok()
}

/// Parses a non-negative integer identifier.
#[must_use]
pub fn parse_identifier(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok()
}

/// Parses a daily count cell.
///
/// Empty cells mean "nothing reported" and parse as zero. Returns `None`
/// if the cell is not an integer. Negative values are returned as-is so
/// the caller can decide how to treat data corrections.
#[must_use]
pub fn parse_count(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse::<i64>().ok()
}
