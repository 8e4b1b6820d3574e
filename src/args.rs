//! Value parsers for command-line arguments.

use crate::address::today;
use crate::registry::Registry;
use chrono::NaiveDate;
use regex::Regex;

/// `YYYY-MM-DD`, a real calendar date, strictly before today.
pub fn parse_past_date(value: &str) -> Result<NaiveDate, String> {
    parse_past_date_as_of(value, today())
}

pub fn parse_past_date_as_of(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let shape = Regex::new(r"^\d{4}-\d{2}-\d{2}$").map_err(|e| e.to_string())?;
    if !shape.is_match(value) {
        return Err("YYYY-MM-DD形式で渡してください".to_string());
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "存在しない日付です".to_string())?;
    if date >= today {
        return Err("過去の日付でなければなりません".to_string());
    }
    Ok(date)
}

/// A location name known to the built-in registry, lower-cased.
pub fn parse_location(value: &str) -> Result<String, String> {
    Registry::builtin()
        .site(value)
        .map(|site| site.en_name.clone())
        .map_err(|e| e.to_string())
}
