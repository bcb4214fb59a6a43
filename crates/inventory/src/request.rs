//! Validated mutation requests sent to the inventory service.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cura_core::{DomainError, DomainResult, InventoryItemId, Money, Validate, require_text};

use crate::item::InventoryStatus;
use crate::movement::MovementType;

/// Server-side narrowing for `get_inventory_items`.
///
/// `None` means "no constraint". Client-side filtering still applies on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InventoryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl InventoryQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: InventoryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Case-insensitive text match; blank text matches everything.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query-string pairs, in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// Receive new stock for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub item_id: InventoryItemId,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RestockRequest {
    pub fn new(item_id: InventoryItemId, quantity: i64) -> Self {
        Self {
            item_id,
            quantity,
            supplier: None,
            batch_number: None,
            expiry_date: None,
            cost_price: None,
            notes: None,
        }
    }
}

impl Validate for RestockRequest {
    fn validate(&self) -> DomainResult<()> {
        MovementType::Restock.validate_quantity(self.quantity)?;
        if let Some(supplier) = &self.supplier {
            require_text("supplier", supplier)?;
        }
        if let Some(batch) = &self.batch_number {
            require_text("batch number", batch)?;
        }
        Ok(())
    }
}

/// Record a stock movement of any type.
///
/// `quantity` follows [`MovementType::signed_quantity`]: a magnitude for
/// directional types, a signed delta for adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRequest {
    pub item_id: InventoryItemId,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub reason: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StockUpdateRequest {
    /// Build the request that takes an item from `current_stock` to `new_quantity`.
    pub fn to_target(
        item_id: InventoryItemId,
        current_stock: i64,
        new_quantity: i64,
        movement_type: MovementType,
        reason: impl Into<String>,
    ) -> DomainResult<Self> {
        if new_quantity < 0 {
            return Err(DomainError::validation("new quantity cannot be negative"));
        }
        let delta = new_quantity.checked_sub(current_stock).ok_or_else(|| {
            DomainError::validation(format!(
                "cannot move stock from {current_stock} to {new_quantity}"
            ))
        })?;
        if delta == 0 {
            return Err(DomainError::validation("new quantity equals current stock"));
        }

        let quantity = match movement_type.direction() {
            crate::MovementDirection::Either => delta,
            crate::MovementDirection::Increase if delta > 0 => delta,
            crate::MovementDirection::Decrease if delta < 0 => -delta,
            _ => {
                return Err(DomainError::validation(format!(
                    "{movement_type} cannot move stock from {current_stock} to {new_quantity}"
                )));
            }
        };

        Ok(Self {
            item_id,
            quantity,
            movement_type,
            reason: reason.into(),
            metadata: BTreeMap::new(),
            notes: None,
        })
    }
}

impl Validate for StockUpdateRequest {
    fn validate(&self) -> DomainResult<()> {
        self.movement_type.validate_quantity(self.quantity)?;
        require_text("reason", &self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restock_requires_positive_quantity() {
        let id = InventoryItemId::new();
        assert!(RestockRequest::new(id, 12).is_valid());
        assert!(!RestockRequest::new(id, 0).is_valid());

        let mut blank_supplier = RestockRequest::new(id, 5);
        blank_supplier.supplier = Some("  ".to_string());
        assert!(!blank_supplier.is_valid());
    }

    #[test]
    fn to_target_picks_quantity_by_direction() {
        let id = InventoryItemId::new();

        let adj =
            StockUpdateRequest::to_target(id, 10, 7, MovementType::Adjustment, "count").unwrap();
        assert_eq!(adj.quantity, -3);

        let sale = StockUpdateRequest::to_target(id, 10, 7, MovementType::Sale, "walk-in").unwrap();
        assert_eq!(sale.quantity, 3);

        let ret =
            StockUpdateRequest::to_target(id, 10, 12, MovementType::Returned, "refund").unwrap();
        assert_eq!(ret.quantity, 2);
    }

    #[test]
    fn to_target_rejects_wrong_direction_and_no_change() {
        let id = InventoryItemId::new();
        assert!(StockUpdateRequest::to_target(id, 10, 12, MovementType::Sale, "x").is_err());
        assert!(StockUpdateRequest::to_target(id, 10, 8, MovementType::Returned, "x").is_err());
        assert!(StockUpdateRequest::to_target(id, 10, 10, MovementType::Adjustment, "x").is_err());
        assert!(StockUpdateRequest::to_target(id, 10, -1, MovementType::Adjustment, "x").is_err());
    }

    #[test]
    fn to_target_rejects_out_of_range_deltas() {
        let id = InventoryItemId::new();
        let err = StockUpdateRequest::to_target(id, -1, i64::MAX, MovementType::Adjustment, "x")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let cleared = StockUpdateRequest::to_target(id, i64::MAX, 0, MovementType::Expired, "x");
        assert_eq!(cleared.unwrap().quantity, i64::MAX);
    }

    #[test]
    fn update_requires_a_reason() {
        let id = InventoryItemId::new();
        let req = StockUpdateRequest::to_target(id, 10, 4, MovementType::Damaged, " ").unwrap();
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn query_pairs_skip_unset_fields() {
        let q = InventoryQuery::all().with_status(InventoryStatus::LowStock);
        assert_eq!(q.to_pairs(), vec![("status", "low-stock".to_string())]);
        assert!(InventoryQuery::all().to_pairs().is_empty());

        let q = InventoryQuery::all().with_category("Diabetes").with_search("gluco");
        assert_eq!(
            q.to_pairs(),
            vec![("category", "Diabetes".to_string()), ("search", "gluco".to_string())]
        );
    }
}
