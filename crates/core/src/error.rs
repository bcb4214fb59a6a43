//! Errors raised by domain rules.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A rule in the CURA domain refused a value or an operation.
///
/// Only deterministic failures belong here: the same input always fails the
/// same way. Transport failures are `cura_client::ServiceError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input the user can correct, such as a blank reason or a zero quantity.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The data itself is inconsistent, e.g. a sale that would leave
    /// negative stock.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A label (status, role, tab, sort key) that names no variant.
    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("record not found")]
    NotFound,

    /// The session's role may not do this.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }

    /// Whether correcting the form input could make the request succeed.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_value_message_names_kind() {
        let err = DomainError::unknown("inventory status", "sold");
        assert_eq!(err.to_string(), "unknown inventory status: \"sold\"");
        assert!(err.is_user_correctable());
    }

    #[test]
    fn invariant_breaks_are_not_user_correctable() {
        assert!(!DomainError::invariant("stock cannot go negative").is_user_correctable());
        assert!(!DomainError::NotFound.is_user_correctable());
    }
}
