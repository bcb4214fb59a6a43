//! Session context passed explicitly to views and dispatchers.

use crate::error::DomainError;
use crate::id::{OwnerId, UserId};
use crate::role::{Dashboard, UserRole};

/// Who is signed in, on whose behalf, and in which language.
///
/// Immutable for the lifetime of a session; a new sign-in creates a new
/// context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    owner_id: Option<OwnerId>,
    role: UserRole,
    language: String,
}

impl SessionContext {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self {
            user_id,
            owner_id: None,
            role,
            language: "en".to_string(),
        }
    }

    /// Attach the stock-owning account (pharmacy/vendor).
    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn owner_id(&self) -> Option<OwnerId> {
        self.owner_id
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn dashboard(&self) -> &'static Dashboard {
        self.role.dashboard()
    }

    /// Owner whose inventory this session may manage.
    pub fn inventory_owner(&self) -> Result<OwnerId, DomainError> {
        if !self.role.manages_inventory() {
            return Err(DomainError::Unauthorized);
        }
        self.owner_id
            .ok_or_else(|| DomainError::validation("session has no owning pharmacy or vendor"))
    }
}
