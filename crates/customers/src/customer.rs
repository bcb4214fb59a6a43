use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cura_core::{CustomerId, Entity, Money, impl_label_enum};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Blocked,
}

impl_label_enum!(CustomerStatus, "customer status", {
    Active => "active",
    Inactive => "inactive",
    Blocked => "blocked",
});

/// Customer as listed on pharmacy and admin dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub status: CustomerStatus,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub total_spent: Money,
    pub joined_at: DateTime<Utc>,
}

impl Customer {
    /// Average spend per order, if the customer ordered at all.
    pub fn average_order_value(&self) -> Option<Money> {
        if self.total_orders == 0 {
            return None;
        }
        Some(Money::from_minor(self.total_spent.minor() / u64::from(self.total_orders)))
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
