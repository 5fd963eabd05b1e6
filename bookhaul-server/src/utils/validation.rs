//! Input validation helpers
//!
//! Centralized text length constants and validation functions shared by
//! the handlers and by `validator` derive rules on request DTOs.

use validator::Validate;

use crate::utils::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Names: book title, author, customer name, user name parts
pub const MAX_NAME_LEN: usize = 200;

/// Book descriptions, review comments, chat messages
pub const MAX_NOTE_LEN: usize = 5000;

/// Short identifiers: phone, zipcode, transaction ids, tokens
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Usernames
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Address lines
pub const MAX_ADDRESS_LEN: usize = 500;

/// Images attached to one review
pub const MAX_REVIEW_IMAGES: usize = 3;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Run `validator` rules on a DTO and convert failures into a 400.
///
/// The offending field names are listed under `details.fields`.
pub fn validate_dto<T: Validate>(dto: &T) -> AppResult<()> {
    dto.validate().map_err(|e| {
        let mut fields: Vec<String> = e.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        AppError::validation(format!("Invalid request: {}", e)).with_detail("fields", fields)
    })
}

/// Trim an optional string, mapping blank to `None`.
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
        #[validate(length(min = 6))]
        password: String,
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Dune", "title", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "title", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "title", MAX_NAME_LEN).unwrap_err();
        assert!(err.message.contains("too long"));
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "phone", 5).is_ok());
        assert!(validate_optional_text(&Some("12345".into()), "phone", 5).is_ok());
        assert!(validate_optional_text(&Some("123456".into()), "phone", 5).is_err());
    }

    #[test]
    fn test_validate_dto_lists_fields() {
        let dto = Signup {
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let err = validate_dto(&dto).unwrap_err();
        let details = err.details.unwrap();
        assert_eq!(details["fields"], serde_json::json!(["email", "password"]));

        let ok = Signup {
            email: "a@b.com".into(),
            password: "123456".into(),
        };
        assert!(validate_dto(&ok).is_ok());
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }
}
