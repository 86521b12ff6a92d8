use crate::domain::ValidationError;

/// Checks that both registration fields were filled in.
///
/// Only presence is checked. The email format is not inspected and
/// whitespace counts as content. The name is checked first, so a form
/// with both fields empty reports `MissingName`.
pub fn validate_registration(name: &str, email: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    Ok(())
}
