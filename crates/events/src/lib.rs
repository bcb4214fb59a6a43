//! Change notification for dashboard collections.
//!
//! The data provider announces that a collection changed; views subscribe
//! and re-fetch. Messages carry identifiers only, never record payloads.

pub mod bus;
pub mod change;
pub mod in_memory_bus;

pub use bus::{Callback, ChangeBus, Subscription, SubscriptionHandle};
pub use change::CollectionChange;
pub use in_memory_bus::{InMemoryBusError, InMemoryChangeBus};
