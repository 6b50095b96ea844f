//! Named string formats.
//!
//! Unknown formats are annotations: they are reported once when the schema is
//! compiled and never fail validation.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex"));

static SEMVER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

const KNOWN: &[&str] = &["date", "date-time", "email", "semver", "version"];

pub fn is_known(format: &str) -> bool {
    KNOWN.contains(&format)
}

/// Check `value` against a named format. `None` if the format is unknown.
pub fn check(format: &str, value: &str) -> Option<bool> {
    let valid = match format {
        // Calendar-valid, zero-padded YYYY-MM-DD.
        "date" => DATE_SHAPE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        "date-time" => DateTime::parse_from_rfc3339(value).is_ok(),
        "email" => EMAIL.is_match(value),
        "semver" | "version" => SEMVER.is_match(value),
        _ => return None,
    };
    Some(valid)
}
