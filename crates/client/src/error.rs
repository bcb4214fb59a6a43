//! Service boundary errors.

use thiserror::Error;

use cura_core::DomainError;

/// Failure of a call to the data provider.
///
/// All variants are recoverable: the caller keeps its form and may resubmit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status without a well-formed error body.
    #[error("API error ({0}): {1}")]
    Api(u16, String),

    /// Body was not a valid response envelope.
    #[error("decode error: {0}")]
    Decode(String),

    /// The service answered with its error arm.
    #[error("rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("client is offline")]
    Offline,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ServiceError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport-level failure (as opposed to an answer from the service).
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Network(_) | ServiceError::Timeout | ServiceError::Offline)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if err.is_connect() {
            ServiceError::Offline
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
