//! Strongly-typed identifiers used across the dashboards.
//!
//! Every id is a UUIDv7 on the wire (a plain string) and a distinct type in
//! code, so an `OwnerId` can never be passed where an `InventoryItemId` is
//! expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! define_ids {
    ($($(#[$meta:meta])* $t:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.0.fmt(f)
            }
        }

        /// Surrounding whitespace is ignored, as ids often come from env vars.
        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<Uuid>()
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {e}", stringify!($t))))
            }
        }
    )+};
}

define_ids! {
    /// A signed-in user.
    UserId;
    /// The account that owns stock (a pharmacy or a vendor).
    OwnerId;
    /// A product held at one batch/location.
    InventoryItemId;
    ProductId;
    MovementId;
    CustomerId;
    OrderId;
    /// Issued when pharmacy onboarding succeeds.
    PharmacyId;
}
