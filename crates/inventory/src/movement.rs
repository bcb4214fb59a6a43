use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cura_core::{DomainError, DomainResult, Entity, InventoryItemId, MovementId, impl_label_enum};

/// Kind of audited stock change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum MovementType {
    Restock,
    Sale,
    Adjustment,
    Damaged,
    Expired,
    Returned,
}

/// Which way a movement type moves stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MovementDirection {
    Increase,
    Decrease,
    /// Sign carried by the quantity itself (manual adjustments).
    Either,
}

impl_label_enum!(MovementType, "movement type", {
    Restock => "restock",
    Sale => "sale",
    Adjustment => "adjustment",
    Damaged => "damaged",
    Expired => "expired",
    Returned => "returned",
});

impl MovementType {
    pub fn direction(&self) -> MovementDirection {
        match self {
            MovementType::Restock | MovementType::Returned => MovementDirection::Increase,
            MovementType::Sale | MovementType::Damaged | MovementType::Expired => {
                MovementDirection::Decrease
            }
            MovementType::Adjustment => MovementDirection::Either,
        }
    }

    /// Stock delta this movement type produces for `quantity`.
    ///
    /// Directional types treat `quantity` as a magnitude; adjustments keep
    /// the sign they were given. Magnitudes saturate at `i64::MAX`.
    pub fn signed_quantity(&self, quantity: i64) -> i64 {
        match self.direction() {
            MovementDirection::Increase => quantity.saturating_abs(),
            MovementDirection::Decrease => -quantity.saturating_abs(),
            MovementDirection::Either => quantity,
        }
    }

    /// Check a requested quantity before sending it anywhere.
    pub fn validate_quantity(&self, quantity: i64) -> DomainResult<()> {
        match self.direction() {
            MovementDirection::Either if quantity == 0 => {
                Err(DomainError::validation("adjustment quantity cannot be zero"))
            }
            MovementDirection::Increase | MovementDirection::Decrease if quantity <= 0 => Err(
                DomainError::validation(format!("{} quantity must be positive", self.as_str())),
            ),
            _ => Ok(()),
        }
    }
}

/// An audited change to an inventory item's quantity.
///
/// Invariant: `new_stock == previous_stock + movement_type.signed_quantity(quantity)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: MovementId,
    pub inventory_item_id: InventoryItemId,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    #[serde(default)]
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StockMovement {
    /// Record a movement against `previous_stock`, computing the new stock.
    ///
    /// Fails if the quantity is invalid for the type, or if the new stock
    /// would be negative or outside `i64`.
    pub fn record(
        inventory_item_id: InventoryItemId,
        movement_type: MovementType,
        quantity: i64,
        previous_stock: i64,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<StockMovement> {
        movement_type.validate_quantity(quantity)?;

        let new_stock = previous_stock
            .checked_add(movement_type.signed_quantity(quantity))
            .ok_or_else(|| {
                DomainError::invariant(format!(
                    "stock overflow ({previous_stock} {movement_type} {quantity})"
                ))
            })?;
        if new_stock < 0 {
            return Err(DomainError::invariant(format!(
                "stock cannot go negative ({previous_stock} {} {quantity})",
                movement_type
            )));
        }

        Ok(StockMovement {
            id: MovementId::new(),
            inventory_item_id,
            movement_type,
            quantity,
            previous_stock,
            new_stock,
            reason: reason.into(),
            timestamp,
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn delta(&self) -> i64 {
        self.movement_type.signed_quantity(self.quantity)
    }

    pub fn check_invariant(&self) -> DomainResult<()> {
        if self.previous_stock.checked_add(self.delta()) != Some(self.new_stock) {
            return Err(DomainError::invariant(format!(
                "movement {}: {} + {} != {}",
                self.id,
                self.previous_stock,
                self.delta(),
                self.new_stock
            )));
        }
        Ok(())
    }
}

impl Entity for StockMovement {
    type Id = MovementId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(t: MovementType, qty: i64, prev: i64) -> DomainResult<StockMovement> {
        StockMovement::record(InventoryItemId::new(), t, qty, prev, "test", Utc::now())
    }

    #[test]
    fn restock_adds_and_sale_subtracts() {
        assert_eq!(record(MovementType::Restock, 20, 5).unwrap().new_stock, 25);
        assert_eq!(record(MovementType::Sale, 3, 5).unwrap().new_stock, 2);
        assert_eq!(record(MovementType::Returned, 1, 0).unwrap().new_stock, 1);
        assert_eq!(record(MovementType::Damaged, 2, 5).unwrap().new_stock, 3);
    }

    #[test]
    fn adjustment_keeps_its_sign() {
        assert_eq!(record(MovementType::Adjustment, -4, 10).unwrap().new_stock, 6);
        assert_eq!(record(MovementType::Adjustment, 4, 10).unwrap().new_stock, 14);
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        assert!(matches!(record(MovementType::Adjustment, 0, 10), Err(DomainError::Validation(_))));
        assert!(matches!(record(MovementType::Sale, -1, 10), Err(DomainError::Validation(_))));
        assert!(matches!(record(MovementType::Restock, 0, 10), Err(DomainError::Validation(_))));
    }

    #[test]
    fn stock_cannot_go_negative() {
        let err = record(MovementType::Sale, 6, 5).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn tampered_movement_fails_invariant_check() {
        let mut m = record(MovementType::Restock, 10, 0).unwrap();
        m.new_stock = 11;
        assert!(m.check_invariant().is_err());
    }

    #[test]
    fn overflowing_quantities_fail_without_panicking() {
        let err = record(MovementType::Restock, i64::MAX, 5).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let err = record(MovementType::Adjustment, i64::MIN, -1).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        assert_eq!(MovementType::Sale.signed_quantity(i64::MIN), -i64::MAX);
        assert!(record(MovementType::Sale, i64::MIN, 5).is_err());
        assert_eq!(record(MovementType::Restock, i64::MAX - 5, 5).unwrap().new_stock, i64::MAX);
    }

    #[test]
    fn invariant_check_survives_extreme_values() {
        let mut m = record(MovementType::Restock, 1, 0).unwrap();
        m.previous_stock = i64::MAX;
        m.new_stock = i64::MIN;
        assert!(m.check_invariant().is_err());
    }

    #[test]
    fn movement_json_uses_type_field() {
        let m = record(MovementType::Expired, 2, 9).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "expired");
        assert_eq!(json["newStock"], 7);
        assert!(json.get("notes").is_none());
    }

    fn movement_type() -> impl Strategy<Value = MovementType> {
        proptest::sample::select(MovementType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn recorded_movements_satisfy_invariant(
            t in movement_type(),
            qty in -500i64..500,
            prev in 0i64..1_000,
        ) {
            if let Ok(m) = record(t, qty, prev) {
                prop_assert!(m.check_invariant().is_ok());
                prop_assert!(m.new_stock >= 0);
                prop_assert_eq!(m.new_stock - m.previous_stock, t.signed_quantity(qty));
            }
        }
    }
}
