//! Client-side validation of forms and requests.

use crate::error::DomainResult;

/// Something that can be checked locally before any service round trip.
///
/// A failing `validate` means the submit action is disabled; it is never
/// sent to the external service.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Reject empty or whitespace-only required text.
pub fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(crate::DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
