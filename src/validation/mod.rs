use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// `#RGB` or `#RRGGBB`.
pub fn validate_color(field: &'static str, value: &str) -> ValidationResult {
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::new(field, "must be a hex color like #1a2b3c"))?;

    if !(hex.len() == 3 || hex.len() == 6) || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ValidationError::new(
            field,
            "must be a hex color like #1a2b3c",
        ));
    }

    Ok(())
}

pub fn validate_non_negative(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount < &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

pub fn validate_month(field: &'static str, month: i64) -> ValidationResult<u32> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::new(field, "must be between 1 and 12"));
    }

    Ok(month as u32)
}

pub fn validate_year(field: &'static str, year: i64) -> ValidationResult<i32> {
    if !(MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ));
    }

    Ok(year as i32)
}

pub fn parse_month(field: &'static str, value: &str) -> ValidationResult<u32> {
    let month: i64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, "must be a number between 1 and 12"))?;

    validate_month(field, month)
}

pub fn parse_year(field: &'static str, value: &str) -> ValidationResult<i32> {
    let year: i64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, "must be a four-digit year"))?;

    validate_year(field, year)
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; a plain date
/// resolves to midnight UTC of that day.
pub fn parse_date(field: &'static str, value: &str) -> ValidationResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            ValidationError::new(field, "must be an RFC 3339 timestamp or a YYYY-MM-DD date")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("name", "Groceries").is_ok());
        assert!(validate_required("name", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("name", "abc", 3).is_ok());
        assert!(validate_max_len("name", "abcd", 3).is_err());
    }

    #[test]
    fn validates_colors() {
        assert!(validate_color("color", "#1a2b3c").is_ok());
        assert!(validate_color("color", "#fff").is_ok());
        assert!(validate_color("color", "1a2b3c").is_err());
        assert!(validate_color("color", "#12345").is_err());
        assert!(validate_color("color", "#gggggg").is_err());
    }

    #[test]
    fn validates_amount_sign() {
        assert!(validate_non_negative("amount", &BigDecimal::from(0)).is_ok());
        assert!(validate_non_negative("amount", &BigDecimal::from_str("12.50").unwrap()).is_ok());
        assert!(validate_non_negative("amount", &BigDecimal::from(-1)).is_err());
    }

    #[test]
    fn parses_month_in_range() {
        assert_eq!(parse_month("month", "1").unwrap(), 1);
        assert_eq!(parse_month("month", "12").unwrap(), 12);
        assert!(parse_month("month", "0").is_err());
        assert!(parse_month("month", "13").is_err());
        assert!(parse_month("month", "june").is_err());
    }

    #[test]
    fn parses_year_in_range() {
        assert_eq!(parse_year("year", "2025").unwrap(), 2025);
        assert!(parse_year("year", "1492").is_err());
        assert!(parse_year("year", "soon").is_err());
    }

    #[test]
    fn parses_plain_dates_as_midnight_utc() {
        let parsed = parse_date("startDate", "2025-06-18").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let parsed = parse_date("startDate", "2025-06-18T09:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 18, 9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("startDate", "18/06/2025").is_err());
        assert!(parse_date("startDate", "yesterday").is_err());
    }
}
