//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: client, truck, site, employee
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, plate
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs (proof photos)
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound for any single money amount
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Latest accepted Unix millis timestamp (9999-12-31T23:59:59.999Z)
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate a money or quantity value is finite, non-negative and bounded.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number"))
            .with_detail("field", field));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        ))
        .with_detail("field", field));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::with_message(
            crate::utils::ErrorCode::ValueOutOfRange,
            format!("{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate a Unix millis timestamp lies in `0..=MAX_TIMESTAMP_MS`.
pub fn validate_timestamp(value: i64, field: &str) -> Result<(), AppError> {
    if !(0..=MAX_TIMESTAMP_MS).contains(&value) {
        return Err(AppError::with_message(
            crate::utils::ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and {MAX_TIMESTAMP_MS}, got {value}"),
        )
        .with_detail("field", field)
        .with_detail("value", value));
    }
    Ok(())
}
