// ABOUTME: Field validation helpers for request payloads and query parameters
// ABOUTME: Emits field-tagged AppErrors so clients can see which input was rejected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use recipe_core::constants::limits::{MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::Price;
use serde_json::Value;

/// Validate email format: `local@domain.tld`, no whitespace, bounded length
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_NAME_LENGTH || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Require a non-blank email with a plausible shape; returns it trimmed
///
/// # Errors
///
/// Returns a field error if the email is missing, blank, or malformed
pub fn require_email(email: Option<&str>) -> AppResult<String> {
    let email = require_text("email", email)?;
    if !is_valid_email(&email) {
        return Err(AppError::invalid_input("Enter a valid email address.").with_field("email"));
    }
    Ok(email)
}

/// Require a password of at least the minimum length
///
/// # Errors
///
/// Returns a field error if the password is missing, blank, or too short
pub fn require_password(password: Option<&str>) -> AppResult<String> {
    let Some(password) = password.filter(|p| !p.trim().is_empty()) else {
        return Err(AppError::missing_field("password"));
    };
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."
        ))
        .with_field("password"));
    }
    Ok(password.to_owned())
}

/// Require a non-blank text field within the length limit; returns it trimmed
///
/// # Errors
///
/// Returns a field error if the value is missing, blank, or too long
pub fn require_text(field: &str, value: Option<&str>) -> AppResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::missing_field(field));
    }
    check_max_length(field, value)?;
    Ok(value.to_owned())
}

/// Reject values longer than the shared name limit
///
/// # Errors
///
/// Returns a field error if the value is too long
pub fn check_max_length(field: &str, value: &str) -> AppResult<()> {
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Ensure this field has no more than {MAX_NAME_LENGTH} characters."
        ))
        .with_field(field));
    }
    Ok(())
}

/// Reject negative minute counts
///
/// # Errors
///
/// Returns a field error if the value is below zero
pub fn check_non_negative(field: &str, value: i32) -> AppResult<i32> {
    if value < 0 {
        return Err(AppError::out_of_range(
            field,
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(value)
}

/// Parse an integer flag such as `assigned_only=1`; absent means false
///
/// # Errors
///
/// Returns a field error if the value is not an integer
pub fn parse_flag(field: &str, raw: Option<&str>) -> AppResult<bool> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) => value.parse::<i64>().map(|n| n != 0).map_err(|_| {
            AppError::invalid_input(format!("{field} must be an integer")).with_field(field)
        }),
    }
}

/// Parse a price given as a JSON number or numeric string
///
/// # Errors
///
/// Returns a `price` field error if the value is not numeric or is out of range
pub fn parse_price(raw: &Value) -> AppResult<Price> {
    match raw {
        Value::Number(n) => n.to_string().parse(),
        Value::String(s) => s.parse(),
        _ => Err(AppError::invalid_input("A valid number is required.").with_field("price")),
    }
}

/// Parse a comma-separated id list such as `tags=1,2`
///
/// # Errors
///
/// Returns a field error if any element is not an integer
pub fn parse_id_list(field: &str, raw: Option<&str>) -> AppResult<Vec<i64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                AppError::invalid_input(format!("{field} must be a comma-separated list of ids"))
                    .with_field(field)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::errors::ErrorCode;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("test"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("test@example"));
        assert!(!is_valid_email("test@.com"));
        assert!(!is_valid_email("te st@example.com"));
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", Some("  Vegan ")).unwrap(), "Vegan");

        let err = require_text("name", Some("   ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.context.field.as_deref(), Some("name"));

        assert!(require_text("name", None).is_err());
        assert!(require_text("name", Some(&"x".repeat(256))).is_err());
    }

    #[test]
    fn test_require_password() {
        assert!(require_password(Some("pw")).is_err());
        assert!(require_password(Some("")).is_err());
        assert!(require_password(None).is_err());
        assert_eq!(require_password(Some("12345")).unwrap(), "12345");
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("assigned_only", None).unwrap());
        assert!(!parse_flag("assigned_only", Some("0")).unwrap());
        assert!(parse_flag("assigned_only", Some("1")).unwrap());
        assert!(parse_flag("assigned_only", Some("yes")).is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("tags", None).unwrap().is_empty());
        assert!(parse_id_list("tags", Some("1,a")).is_err());
    }

    #[test]
    fn test_parse_price_tags_field() {
        assert_eq!(parse_price(&Value::from(5.5)).unwrap().to_string(), "5.50");
        assert_eq!(parse_price(&Value::from("12")).unwrap().to_string(), "12.00");

        for bad in [Value::from("abc"), Value::from(1000), Value::Bool(true), Value::from(-1)] {
            let err = parse_price(&bad).unwrap_err();
            assert_eq!(err.context.field.as_deref(), Some("price"));
        }
    }

    #[test]
    fn test_check_non_negative() {
        assert_eq!(check_non_negative("time_minutes", 0).unwrap(), 0);
        let err = check_non_negative("time_minutes", -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}
