//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on:
//! - What fits on a phone screen for guest names and table labels
//! - Kitchen ticket width for special instructions

use std::collections::HashMap;

use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, menu item, variation, username
pub const MAX_NAME_LEN: usize = 200;

/// Guest display names
pub const MAX_GUEST_NAME_LEN: usize = 100;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 32;

/// Table labels ("T12", "Patio 3")
pub const MAX_TABLE_NUMBER_LEN: usize = 20;

/// Table location descriptions
pub const MAX_LOCATION_LEN: usize = 200;

/// Notes, descriptions, special requests
pub const MAX_NOTE_LEN: usize = 500;

/// Special instructions on a cart line
pub const MAX_INSTRUCTIONS_LEN: usize = 500;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Quantity of a single cart line
pub const MAX_QUANTITY: i32 = 99;

// ── Validation helpers (handlers) ───────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Run `validator` derive rules on a request body
///
/// Field errors are reported under `details.fields` as `{field: [codes]}`.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(validation_error)
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let fields: HashMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            (
                field.to_string(),
                errs.iter().map(|e| e.code.to_string()).collect(),
            )
        })
        .collect();

    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort_unstable();
    let message = format!("Invalid fields: {}", names.join(", "));

    let fields = serde_json::to_value(&fields).unwrap_or(Value::Null);
    AppError::validation(message).with_detail("fields", fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;
    use shared::dto::AddCartItemRequest;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Alice", "guestName", 10).is_ok());
        assert!(validate_required_text("   ", "guestName", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "guestName", 10).is_err());
        // Multi-byte names count characters, not bytes
        assert!(validate_required_text("张三李四", "guestName", 4).is_ok());
    }

    #[test]
    fn test_validate_request_reports_fields() {
        let req = AddCartItemRequest {
            menu_item_id: 1,
            variation_id: None,
            quantity: 0,
            special_instructions: None,
        };
        let err = validate_request(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["fields"]["quantity"][0], "range");
    }
}
