use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cura_core::{CustomerId, Entity, Money, OrderId, impl_label_enum};

/// Order lifecycle as shown in order history.
///
/// Feeds spell these inconsistently (`"Delivered"`, `"approved"`); parsing
/// normalizes and serialization is always lowercase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum OrderStatus {
    Pending,
    Approved,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Rejected,
}

impl_label_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Approved => "approved",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
    Rejected => "rejected",
});

impl OrderStatus {
    /// No further transitions happen after these.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// One row of a customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub pharmacy_name: String,
    pub status: OrderStatus,
    pub item_count: u32,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub prescription_required: bool,
}

impl Entity for OrderSummary {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
