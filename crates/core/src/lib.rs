//! `cura-core`: shared building blocks for the CURA dashboards.
//!
//! This crate contains **pure domain** primitives (no IO, no service calls):
//! identifiers, the domain error model, money, roles and the session context.

pub mod context;
pub mod entity;
pub mod error;
pub mod id;
pub mod label;
pub mod role;
pub mod validate;
pub mod value_object;

pub use context::SessionContext;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    CustomerId, InventoryItemId, MovementId, OrderId, OwnerId, PharmacyId, ProductId, UserId,
};
pub use label::normalize_label;
pub use role::{Dashboard, DashboardSection, UserRole};
pub use validate::{Validate, require_text};
pub use value_object::Money;
