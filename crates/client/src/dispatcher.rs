//! Selection/action dispatcher for the inventory page.
//!
//! Maps user actions on a selected row to service calls and owns the modal
//! state of the restock and adjust-stock forms. Every method takes
//! `&mut self`, so one dispatcher can never have two submits in flight.
//! UIs that run the request on a separate task use the split form
//! (`begin_*` then `finish_*`) instead of the `submit_*` helpers.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use cura_core::{DomainResult, InventoryItemId, Money, Validate};
use cura_inventory::{MovementType, RestockRequest, StockMovement, StockUpdateRequest};
use cura_listing::InventoryRow;

use crate::error::{ServiceError, ServiceResult};
use crate::modal::{DispatchError, ModalState};
use crate::service::InventoryService;

/// Restock modal contents. Blank text fields are sent as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockForm {
    pub item_id: InventoryItemId,
    pub quantity: i64,
    pub supplier: String,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub cost_price: Option<Money>,
    pub notes: String,
    /// Units that fit before the item's max capacity, as of opening.
    pub capacity_left: i64,
}

impl RestockForm {
    /// Prefilled from the row: same supplier, no quantity yet.
    pub fn for_row(row: &InventoryRow) -> Self {
        Self {
            item_id: row.item.id,
            quantity: 0,
            supplier: row.item.supplier.clone(),
            batch_number: String::new(),
            expiry_date: None,
            cost_price: None,
            notes: String::new(),
            capacity_left: row.item.headroom(),
        }
    }

    /// Overfilling is allowed; the UI shows a warning instead.
    pub fn exceeds_capacity(&self) -> bool {
        self.quantity > self.capacity_left
    }

    pub fn to_request(&self) -> RestockRequest {
        RestockRequest {
            item_id: self.item_id,
            quantity: self.quantity,
            supplier: non_blank(&self.supplier),
            batch_number: non_blank(&self.batch_number),
            expiry_date: self.expiry_date,
            cost_price: self.cost_price,
            notes: non_blank(&self.notes),
        }
    }
}

impl Validate for RestockForm {
    fn validate(&self) -> DomainResult<()> {
        self.to_request().validate()
    }
}

/// Adjust-stock modal contents: the user enters the target quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustStockForm {
    pub item_id: InventoryItemId,
    /// Stock when the form was opened.
    pub current_stock: i64,
    pub new_quantity: i64,
    pub movement_type: MovementType,
    pub reason: String,
    pub notes: String,
    pub metadata: BTreeMap<String, String>,
}

impl AdjustStockForm {
    pub fn for_row(row: &InventoryRow) -> Self {
        Self {
            item_id: row.item.id,
            current_stock: row.item.current_stock,
            new_quantity: row.item.current_stock,
            movement_type: MovementType::Adjustment,
            reason: String::new(),
            notes: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn to_request(&self) -> DomainResult<StockUpdateRequest> {
        let mut request = StockUpdateRequest::to_target(
            self.item_id,
            self.current_stock,
            self.new_quantity,
            self.movement_type,
            self.reason.trim(),
        )?;
        request.notes = non_blank(&self.notes);
        request.metadata = self.metadata.clone();
        Ok(request)
    }
}

impl Validate for AdjustStockForm {
    fn validate(&self) -> DomainResult<()> {
        self.to_request()?.validate()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug)]
pub struct InventoryDispatcher<S> {
    service: S,
    selected: Option<InventoryItemId>,
    restock: ModalState<RestockForm>,
    adjust: ModalState<AdjustStockForm>,
}

impl<S: InventoryService> InventoryDispatcher<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            selected: None,
            restock: ModalState::Closed,
            adjust: ModalState::Closed,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Select a row for the detail panel.
    pub fn view(&mut self, item_id: InventoryItemId) {
        self.selected = Some(item_id);
    }

    pub fn selected(&self) -> Option<InventoryItemId> {
        self.selected
    }

    pub fn restock_state(&self) -> &ModalState<RestockForm> {
        &self.restock
    }

    pub fn adjust_state(&self) -> &ModalState<AdjustStockForm> {
        &self.adjust
    }

    pub fn restock_form_mut(&mut self) -> Option<&mut RestockForm> {
        self.restock.form_mut()
    }

    pub fn adjust_form_mut(&mut self) -> Option<&mut AdjustStockForm> {
        self.adjust.form_mut()
    }

    pub fn open_restock(&mut self, row: &InventoryRow) -> Result<(), DispatchError> {
        self.restock.open(RestockForm::for_row(row))?;
        self.selected = Some(row.item.id);
        tracing::debug!(item_id = %row.item.id, "restock form opened");
        Ok(())
    }

    pub fn open_adjust(&mut self, row: &InventoryRow) -> Result<(), DispatchError> {
        self.adjust.open(AdjustStockForm::for_row(row))?;
        self.selected = Some(row.item.id);
        tracing::debug!(item_id = %row.item.id, "adjust form opened");
        Ok(())
    }

    pub fn begin_restock(&mut self) -> Result<RestockRequest, DispatchError> {
        let form = self.restock.begin_submit()?;
        if form.exceeds_capacity() {
            tracing::warn!(
                item_id = %form.item_id,
                quantity = form.quantity,
                capacity_left = form.capacity_left,
                "restock exceeds max stock capacity"
            );
        }
        Ok(form.to_request())
    }

    pub fn finish_restock(
        &mut self,
        result: ServiceResult<StockMovement>,
    ) -> Result<StockMovement, DispatchError> {
        log_outcome("restock", &result);
        self.restock.finish(result.map_err(DispatchError::Service))
    }

    pub fn begin_adjust(&mut self) -> Result<StockUpdateRequest, DispatchError> {
        let request = self.adjust.begin_submit()?.to_request();
        match request {
            Ok(request) => Ok(request),
            Err(err) => self.adjust.finish(Err(DispatchError::Validation(err))),
        }
    }

    pub fn finish_adjust(
        &mut self,
        result: ServiceResult<StockMovement>,
    ) -> Result<StockMovement, DispatchError> {
        log_outcome("stock update", &result);
        self.adjust.finish(result.map_err(DispatchError::Service))
    }

    /// Submit the open restock form.
    pub async fn submit_restock(&mut self) -> Result<StockMovement, DispatchError> {
        let request = self.begin_restock()?;
        tracing::info!(
            item_id = %request.item_id,
            quantity = request.quantity,
            "submitting restock"
        );
        let result = self.service.restock_item(request).await;
        self.finish_restock(result)
    }

    /// Submit the open adjust-stock form.
    pub async fn submit_adjust(&mut self) -> Result<StockMovement, DispatchError> {
        let request = self.begin_adjust()?;
        tracing::info!(
            item_id = %request.item_id,
            movement_type = %request.movement_type,
            quantity = request.quantity,
            "submitting stock update"
        );
        let result = self.service.update_stock(request).await;
        self.finish_adjust(result)
    }

    /// Restock `form.quantity` units in one step.
    pub async fn restock(&mut self, form: RestockForm) -> Result<StockMovement, DispatchError> {
        self.restock.open(form)?;
        self.submit_restock().await
    }

    /// Move `row` to `new_quantity` with a movement of `movement_type`.
    pub async fn adjust_stock(
        &mut self,
        row: &InventoryRow,
        new_quantity: i64,
        movement_type: MovementType,
        reason: impl Into<String>,
    ) -> Result<StockMovement, DispatchError> {
        let mut form = AdjustStockForm::for_row(row);
        form.new_quantity = new_quantity;
        form.movement_type = movement_type;
        form.reason = reason.into();
        self.adjust.open(form)?;
        self.submit_adjust().await
    }

    /// Leaving the page closes every modal. In-flight requests run to
    /// completion; their results are ignored.
    pub fn navigate_away(&mut self) {
        self.restock.close();
        self.adjust.close();
        self.selected = None;
    }
}

fn log_outcome(action: &str, result: &ServiceResult<StockMovement>) {
    match result {
        Ok(movement) => tracing::info!(
            action,
            movement_id = %movement.id,
            previous_stock = movement.previous_stock,
            new_stock = movement.new_stock,
            "stock movement recorded"
        ),
        Err(err) => tracing::warn!(
            action,
            error = %err,
            transient = err.is_transient(),
            correctable = matches!(err, ServiceError::Domain(e) if e.is_user_correctable()),
            "stock request failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cura_core::{OwnerId, ProductId};
    use cura_inventory::{InventoryItem, InventoryStatus, Product};

    fn row(stock: i64) -> InventoryRow {
        let product = Product::new(ProductId::new(), "Augmentin 625", "Antibiotics");
        InventoryRow {
            item: InventoryItem {
                id: InventoryItemId::new(),
                owner_id: OwnerId::new(),
                product_id: product.id,
                current_stock: stock,
                min_stock_threshold: 10,
                max_stock_capacity: 200,
                status: InventoryStatus::InStock,
                supplier: "Gulf Drug".into(),
                batch_number: "AUG-77".into(),
                expiry_date: None,
                cost_price: Money::from_minor(1_250),
                selling_price: Money::from_minor(2_000),
                location: "Fridge 2".into(),
            },
            product,
        }
    }

    #[test]
    fn restock_form_drops_blank_fields() {
        let mut form = RestockForm::for_row(&row(4));
        form.quantity = 10;
        form.notes = "   ".into();
        let request = form.to_request();
        assert_eq!(request.supplier.as_deref(), Some("Gulf Drug"));
        assert!(request.batch_number.is_none());
        assert!(request.notes.is_none());
        assert!(form.is_valid());
    }

    #[test]
    fn restock_form_flags_quantities_past_capacity() {
        let mut form = RestockForm::for_row(&row(180));
        assert_eq!(form.capacity_left, 20);

        form.quantity = 20;
        assert!(!form.exceeds_capacity());
        form.quantity = 21;
        assert!(form.exceeds_capacity());
        assert!(form.is_valid());

        assert_eq!(RestockForm::for_row(&row(240)).capacity_left, 0);
    }

    #[test]
    fn fresh_restock_form_is_invalid_until_quantity_set() {
        assert!(!RestockForm::for_row(&row(4)).is_valid());
    }

    #[test]
    fn adjust_form_needs_a_change_and_a_reason() {
        let mut form = AdjustStockForm::for_row(&row(20));
        assert!(!form.is_valid());

        form.new_quantity = 18;
        assert!(!form.is_valid());

        form.reason = "cycle count".into();
        let request = form.to_request().unwrap();
        assert_eq!(request.quantity, -2);
        assert_eq!(request.reason, "cycle count");

        form.movement_type = MovementType::Returned;
        assert!(!form.is_valid());
    }
}
