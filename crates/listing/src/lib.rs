//! Filtered list views.
//!
//! Every dashboard list (inventory, customers, order history) is the same
//! pattern: a raw collection from the data provider, a transient
//! [`FilterState`], and a pure engine that reduces the two to an ordered
//! visible subset plus summary statistics.
//!
//! Nothing here performs IO. Views are rebuilt from fresh provider data
//! whenever a change notification arrives.

pub mod filter;
pub mod inventory;
pub mod people;
pub mod shell;
pub mod stats;

pub use filter::{FilterState, Filterable, Selection, SortValue, apply, apply_iter};
pub use inventory::{
    InventoryFilter, InventoryRow, InventorySortKey, InventoryTab, categories, join_rows,
};
pub use people::{CustomerSortKey, OrderSortKey};
pub use shell::{InventorySnapshot, InventoryView, ListSnapshot, ListView, MovementRow};
pub use stats::{InventoryStats, StatusCounts};
