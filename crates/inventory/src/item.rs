use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use cura_core::{Entity, InventoryItemId, Money, OwnerId, ProductId, impl_label_enum};

/// Stock status of an inventory item.
///
/// Serialized as kebab-case (`"out-of-stock"`). Parsing is lenient about
/// case and separators (`"OUT_OF_STOCK"`, `"Out of stock"`) so feeds that
/// disagree on spelling collapse to one value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum InventoryStatus {
    InStock,
    LowStock,
    OutOfStock,
    Expired,
    Discontinued,
}

impl_label_enum!(InventoryStatus, "inventory status", {
    InStock => "in-stock",
    LowStock => "low-stock",
    OutOfStock => "out-of-stock",
    Expired => "expired",
    Discontinued => "discontinued",
});

impl InventoryStatus {
    /// Status the system of record assigns for the given facts.
    ///
    /// Precedence: discontinued, expired (expiry strictly before `today`),
    /// out of stock (`stock <= 0`), low stock (`stock <= min_threshold`),
    /// in stock.
    pub fn derive(
        stock: i64,
        min_threshold: i64,
        expiry: Option<NaiveDate>,
        today: NaiveDate,
        discontinued: bool,
    ) -> InventoryStatus {
        if discontinued {
            return InventoryStatus::Discontinued;
        }
        if expiry.is_some_and(|d| d < today) {
            return InventoryStatus::Expired;
        }
        if stock <= 0 {
            InventoryStatus::OutOfStock
        } else if stock <= min_threshold {
            InventoryStatus::LowStock
        } else {
            InventoryStatus::InStock
        }
    }

    /// Needs reordering (low or empty).
    pub fn needs_restock(&self) -> bool {
        matches!(self, InventoryStatus::LowStock | InventoryStatus::OutOfStock)
    }
}

/// A stocked unit of a product at one batch and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub owner_id: OwnerId,
    pub product_id: ProductId,
    pub current_stock: i64,
    pub min_stock_threshold: i64,
    pub max_stock_capacity: i64,
    pub status: InventoryStatus,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub batch_number: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub cost_price: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub location: String,
}

impl InventoryItem {
    /// Stock value at cost.
    pub fn value(&self) -> Money {
        self.cost_price.times(self.current_stock)
    }

    /// Status implied by stock, thresholds and expiry as of `today`.
    ///
    /// `discontinued` is not derivable from stock and is carried over.
    pub fn expected_status(&self, today: NaiveDate) -> InventoryStatus {
        InventoryStatus::derive(
            self.current_stock,
            self.min_stock_threshold,
            self.expiry_date,
            today,
            self.status == InventoryStatus::Discontinued,
        )
    }

    pub fn is_status_consistent(&self, today: NaiveDate) -> bool {
        self.status == self.expected_status(today)
    }

    /// Expires on or before `today + days` but has not expired yet.
    pub fn expires_within(&self, today: NaiveDate, days: u32) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry >= today && expiry <= today + Duration::days(i64::from(days)),
            None => false,
        }
    }

    /// Units that fit before reaching `max_stock_capacity`.
    pub fn headroom(&self) -> i64 {
        self.max_stock_capacity.saturating_sub(self.current_stock).max(0)
    }
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(stock: i64, status: InventoryStatus) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(),
            owner_id: OwnerId::new(),
            product_id: ProductId::new(),
            current_stock: stock,
            min_stock_threshold: 10,
            max_stock_capacity: 200,
            status,
            supplier: "MedSupply".to_string(),
            batch_number: "B-001".to_string(),
            expiry_date: Some(day(2027, 1, 31)),
            cost_price: Money::from_minor(450),
            selling_price: Money::from_minor(600),
            location: "Shelf A".to_string(),
        }
    }

    #[test]
    fn derive_follows_precedence() {
        let today = day(2026, 10, 19);
        let past = Some(day(2026, 10, 18));

        assert_eq!(
            InventoryStatus::derive(50, 10, past, today, true),
            InventoryStatus::Discontinued
        );
        assert_eq!(InventoryStatus::derive(50, 10, past, today, false), InventoryStatus::Expired);
        assert_eq!(InventoryStatus::derive(0, 10, None, today, false), InventoryStatus::OutOfStock);
        assert_eq!(InventoryStatus::derive(10, 10, None, today, false), InventoryStatus::LowStock);
        assert_eq!(InventoryStatus::derive(11, 10, None, today, false), InventoryStatus::InStock);
    }

    #[test]
    fn expiring_today_is_not_expired() {
        let today = day(2026, 10, 19);
        assert_eq!(
            InventoryStatus::derive(50, 10, Some(today), today, false),
            InventoryStatus::InStock
        );
    }

    #[test]
    fn status_parsing_normalizes_spelling() {
        for raw in ["out-of-stock", "out_of_stock", "OUT_OF_STOCK", "Out of stock"] {
            assert_eq!(raw.parse::<InventoryStatus>().unwrap(), InventoryStatus::OutOfStock);
        }
        assert!("sold".parse::<InventoryStatus>().is_err());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&InventoryStatus::LowStock).unwrap();
        assert_eq!(json, "\"low-stock\"");
        let back: InventoryStatus = serde_json::from_str("\"low_stock\"").unwrap();
        assert_eq!(back, InventoryStatus::LowStock);
    }

    #[test]
    fn value_is_stock_at_cost() {
        assert_eq!(item(4, InventoryStatus::LowStock).value(), Money::from_minor(1800));
        assert_eq!(item(-2, InventoryStatus::OutOfStock).value(), Money::ZERO);
    }

    #[test]
    fn consistency_check_detects_stale_status() {
        let today = day(2026, 10, 19);
        assert!(item(5, InventoryStatus::LowStock).is_status_consistent(today));
        assert!(!item(5, InventoryStatus::InStock).is_status_consistent(today));
        assert!(item(5, InventoryStatus::Discontinued).is_status_consistent(today));
    }

    #[test]
    fn expires_within_window() {
        let it = item(20, InventoryStatus::InStock);
        assert!(it.expires_within(day(2027, 1, 1), 30));
        assert!(!it.expires_within(day(2026, 10, 19), 30));
        assert!(!it.expires_within(day(2027, 2, 1), 30));
    }

    #[test]
    fn headroom_stops_at_capacity() {
        assert_eq!(item(150, InventoryStatus::InStock).headroom(), 50);
        assert_eq!(item(260, InventoryStatus::InStock).headroom(), 0);

        let mut odd = item(-5, InventoryStatus::OutOfStock);
        odd.max_stock_capacity = i64::MAX;
        assert_eq!(odd.headroom(), i64::MAX);
    }

    #[test]
    fn item_json_uses_camel_case() {
        let it = item(20, InventoryStatus::InStock);
        let json = serde_json::to_value(&it).unwrap();
        assert_eq!(json["currentStock"], 20);
        assert_eq!(json["status"], "in-stock");
        assert_eq!(json["costPrice"], 450);
        let back: InventoryItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, it);
    }
}
