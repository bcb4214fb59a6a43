//! Read-only customer and order-history projections.
//!
//! These records are display snapshots served by the external service.
//! There is no mutation path on the client.

pub mod customer;
pub mod order;

pub use customer::{Customer, CustomerStatus};
pub use order::{OrderStatus, OrderSummary};
