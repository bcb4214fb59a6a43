//! Inventory domain for pharmacy and vendor stock.
//!
//! Records here are snapshots of what the external inventory service holds.
//! The client never mutates them directly; it builds validated requests
//! ([`RestockRequest`], [`StockUpdateRequest`]) and re-reads after the
//! service confirms.

pub mod item;
pub mod movement;
pub mod product;
pub mod request;

pub use item::{InventoryItem, InventoryStatus};
pub use movement::{MovementDirection, MovementType, StockMovement};
pub use product::Product;
pub use request::{InventoryQuery, RestockRequest, StockUpdateRequest};
