//! Modal form state machine.
//!
//! ```text
//! Closed --open--> Open(form) --begin_submit--> Submitting(form)
//!    ^                 ^                              |
//!    |                 +------- failure (error) ------+
//!    +----------------------- success -----------------+
//! ```
//!
//! Nothing is applied optimistically: the form only goes away once the
//! service confirms.

use thiserror::Error;

use cura_core::{DomainError, Validate};

use crate::error::ServiceError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no form is open")]
    NotOpen,

    #[error("a request is already in flight")]
    AlreadySubmitting,

    #[error(transparent)]
    Validation(DomainError),

    #[error(transparent)]
    Service(ServiceError),
}

impl From<DomainError> for DispatchError {
    fn from(err: DomainError) -> Self {
        DispatchError::Validation(err)
    }
}

impl From<ServiceError> for DispatchError {
    fn from(err: ServiceError) -> Self {
        DispatchError::Service(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<F> {
    Closed,
    Open {
        form: F,
        /// Last submit failure, shown above the form.
        error: Option<DispatchError>,
    },
    Submitting {
        form: F,
    },
}

impl<F> Default for ModalState<F> {
    fn default() -> Self {
        ModalState::Closed
    }
}

impl<F> ModalState<F> {
    pub fn is_closed(&self) -> bool {
        matches!(self, ModalState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, ModalState::Submitting { .. })
    }

    pub fn form(&self) -> Option<&F> {
        match self {
            ModalState::Closed => None,
            ModalState::Open { form, .. } | ModalState::Submitting { form } => Some(form),
        }
    }

    /// Editable only while open; a submitting form is frozen.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self {
            ModalState::Open { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            ModalState::Open { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Open with a fresh form. Refused while a request is in flight.
    pub fn open(&mut self, form: F) -> Result<(), DispatchError> {
        if self.is_submitting() {
            return Err(DispatchError::AlreadySubmitting);
        }
        *self = ModalState::Open { form, error: None };
        Ok(())
    }

    pub fn close(&mut self) {
        *self = ModalState::Closed;
    }

    /// Finish a submit: close on success, reopen with the error on failure.
    ///
    /// A result arriving after the modal was closed (the user navigated
    /// away) is ignored.
    pub fn finish<T>(&mut self, result: Result<T, DispatchError>) -> Result<T, DispatchError> {
        match std::mem::take(self) {
            ModalState::Submitting { form } => {
                if let Err(err) = &result {
                    *self = ModalState::Open {
                        form,
                        error: Some(err.clone()),
                    };
                }
            }
            other => {
                tracing::debug!("submit result arrived for a modal that is no longer submitting");
                *self = other;
            }
        }
        result
    }
}

impl<F: Validate> ModalState<F> {
    /// Open -> Submitting, if the form validates.
    ///
    /// Invalid forms stay open with the validation error attached; no
    /// request is made.
    pub fn begin_submit(&mut self) -> Result<&F, DispatchError> {
        match std::mem::take(self) {
            ModalState::Closed => Err(DispatchError::NotOpen),
            ModalState::Submitting { form } => {
                *self = ModalState::Submitting { form };
                Err(DispatchError::AlreadySubmitting)
            }
            ModalState::Open { form, .. } => match form.validate() {
                Ok(()) => {
                    *self = ModalState::Submitting { form };
                    match self {
                        ModalState::Submitting { form } => Ok(form),
                        _ => Err(DispatchError::NotOpen),
                    }
                }
                Err(err) => {
                    let err = DispatchError::Validation(err);
                    *self = ModalState::Open {
                        form,
                        error: Some(err.clone()),
                    };
                    Err(err)
                }
            },
        }
    }
}
