//! Input validation for customer create/update payloads.

use crate::error::CoreError;

/// Maximum accepted length for a customer name.
pub const MAX_NAME_LEN: usize = 200;

/// Validate the editable customer fields.
///
/// Names must be non-blank and at most [`MAX_NAME_LEN`] characters. Emails
/// only get a shape check (`local@domain`); deliverability is not our concern.
pub fn validate_customer(name: &str, email: &str) -> Result<(), CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!("invalid email address: {email}"))),
    }
}
