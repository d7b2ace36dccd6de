//! Common validation utilities.

use validator::ValidationError;

/// Maximum length for task titles.
const MAX_TITLE_LEN: usize = 200;

/// Maximum length for email addresses.
const MAX_EMAIL_LEN: usize = 255;

/// Normalizes an email address for use as a delivery key: trim + lowercase.
///
/// The canonical invite record keeps the case-preserved email; everything
/// keyed by email (the invite inbox) uses this normalized form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that an email is non-empty after normalization.
pub fn validate_email_present(email: &str) -> Result<(), ValidationError> {
    if normalize_email(email).is_empty() {
        let mut err = ValidationError::new("email_required");
        err.message = Some("Email required.".into());
        return Err(err);
    }
    if email.len() > MAX_EMAIL_LEN {
        let mut err = ValidationError::new("email_too_long");
        err.message = Some("Email must be at most 255 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a task title is non-empty after trimming.
pub fn validate_task_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("title_required");
        err.message = Some("Title must not be empty".into());
        return Err(err);
    }
    if trimmed.len() > MAX_TITLE_LEN {
        let mut err = ValidationError::new("title_too_long");
        err.message = Some("Title must be at most 200 characters".into());
        return Err(err);
    }
    Ok(())
}
