use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::errors::AppError;

lazy_static! {
    /// Exactly `YYYY-MM-DD`, no time part, no surrounding whitespace.
    pub static ref DATE_RE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::Validation)
}

pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

// Only reached once DATE_RE matched; catches days like 2024-02-30
pub fn validate_calendar_date(value: &str) -> Result<(), ValidationError> {
    if !DATE_RE.is_match(value) {
        return Ok(());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::new("calendar_date"))
}

pub fn validate_limit(limit: i64) -> Result<(), AppError> {
    if !(1..=100).contains(&limit) {
        return Err(AppError::BadRequest("Limit must be between 1 and 100".to_string()));
    }
    Ok(())
}
