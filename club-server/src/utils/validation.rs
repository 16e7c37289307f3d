//! Input validation helpers
//!
//! Text limits, password policy, date parsing and extractor rejection
//! mapping shared by the services and handlers.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use chrono::{DateTime, NaiveDate};
use validator::ValidateEmail;

use crate::utils::{AppError, AppResult, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Names: first/last name, username, plan name
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone, national id, plan code, period, reference
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// URLs
pub const MAX_URL_LEN: usize = 2048;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Error reporting every missing required field at once
pub fn missing_fields(code: ErrorCode, fields: &[&str]) -> AppError {
    AppError::with_message(
        code,
        format!("Missing required fields: {}", fields.join(", ")),
    )
    .with_detail("fields", fields.to_vec())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > MAX_EMAIL_LEN || !email.validate_email() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("Invalid email address: {email}"),
        )
        .with_detail("field", "email"));
    }
    Ok(())
}

/// Password length policy, counted in characters
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooLong));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("{field} must be a date in YYYY-MM-DD format"),
        )
        .with_detail("field", field)
    })
}

/// Accept either a plain date or an RFC 3339 timestamp, keeping the date part
pub fn parse_date_or_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Unwrap a JSON body, turning extractor rejections into a 400 `AppError`
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}

/// Unwrap query parameters, turning extractor rejections into a 400 `AppError`
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    params
        .map(|Query(q)| q)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert_eq!(
            validate_password("12345").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"x".repeat(128)).is_ok());
        assert_eq!(
            validate_password(&"x".repeat(129)).unwrap_err().code,
            ErrorCode::PasswordTooLong
        );
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("ama@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("1990-04-12", "dateOfBirth").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());

        let err = parse_date("12/04/1990", "dateOfBirth").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_date_or_timestamp() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        assert_eq!(parse_date_or_timestamp("2025-08-15"), Some(day));
        assert_eq!(parse_date_or_timestamp("2025-08-15T10:30:00Z"), Some(day));
        assert_eq!(parse_date_or_timestamp("2025-08-15T10:30:00+02:00"), Some(day));
        assert_eq!(parse_date_or_timestamp("yesterday"), None);
        assert_eq!(parse_date_or_timestamp(""), None);
    }

    #[test]
    fn test_missing_fields_message() {
        let err = missing_fields(ErrorCode::MemberMissingFields, &["firstName", "email"]);
        assert_eq!(err.message, "Missing required fields: firstName, email");
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_optional_text_limit() {
        assert!(validate_optional_text(&None, "phone", 5).is_ok());
        assert!(validate_optional_text(&Some("12345".into()), "phone", 5).is_ok());
        assert!(validate_optional_text(&Some("123456".into()), "phone", 5).is_err());
    }
}
