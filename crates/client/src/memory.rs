//! In-process data provider for tests and offline demos.
//!
//! Behaves like the system of record: every mutation goes through
//! [`StockMovement::record`], item status is re-derived after each change,
//! and a [`CollectionChange`] is published once the state lock is released
//! (so callbacks may call back into the service).

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cura_core::{CustomerId, DomainError, InventoryItemId, OwnerId, PharmacyId, Validate};
use cura_customers::{Customer, OrderSummary};
use cura_events::{Callback, ChangeBus, CollectionChange, InMemoryChangeBus, SubscriptionHandle};
use cura_inventory::{
    InventoryItem, InventoryQuery, InventoryStatus, MovementType, Product, RestockRequest,
    StockMovement, StockUpdateRequest,
};

use crate::error::{ServiceError, ServiceResult};
use crate::onboarding::PharmacyApplication;
use crate::service::{CustomerService, InventoryService, OnboardingService, OrderService};

#[derive(Default)]
struct State {
    items: Vec<InventoryItem>,
    products: HashMap<OwnerId, Vec<Product>>,
    movements: Vec<StockMovement>,
    customers: HashMap<OwnerId, Vec<Customer>>,
    orders: HashMap<CustomerId, Vec<OrderSummary>>,
    pharmacies: Vec<(PharmacyId, PharmacyApplication)>,
    /// Failures handed out to the next calls, oldest first.
    failures: VecDeque<ServiceError>,
}

pub struct InMemoryInventoryService {
    state: Mutex<State>,
    bus: InMemoryChangeBus<CollectionChange>,
    clock: fn() -> DateTime<Utc>,
}

impl Default for InMemoryInventoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryInventoryService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryInventoryService").finish_non_exhaustive()
    }
}

impl InMemoryInventoryService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            bus: InMemoryChangeBus::new(),
            clock: Utc::now,
        }
    }

    /// Fix the clock used for movement timestamps and status derivation.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn state(&self) -> ServiceResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ServiceError::Domain(DomainError::invariant("provider state poisoned")))
    }

    /// Pop an injected failure, if any.
    fn injected(&self) -> ServiceResult<()> {
        match self.state()?.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn announce(&self, change: CollectionChange) {
        if let Err(err) = self.bus.publish(change) {
            tracing::warn!(error = ?err, "change notification dropped");
        }
    }

    pub fn insert_product(&self, owner_id: OwnerId, product: Product) -> ServiceResult<()> {
        self.state()?.products.entry(owner_id).or_default().push(product);
        self.announce(CollectionChange::CatalogChanged { owner_id });
        Ok(())
    }

    pub fn insert_item(&self, item: InventoryItem) -> ServiceResult<()> {
        let change = CollectionChange::InventoryChanged {
            owner_id: item.owner_id,
            item_id: Some(item.id),
        };
        self.state()?.items.push(item);
        self.announce(change);
        Ok(())
    }

    pub fn insert_customer(&self, owner_id: OwnerId, customer: Customer) -> ServiceResult<()> {
        let customer_id = customer.id;
        self.state()?.customers.entry(owner_id).or_default().push(customer);
        self.announce(CollectionChange::CustomerChanged { customer_id });
        Ok(())
    }

    pub fn insert_order(&self, order: OrderSummary) -> ServiceResult<()> {
        let customer_id = order.customer_id;
        self.state()?.orders.entry(customer_id).or_default().push(order);
        self.announce(CollectionChange::CustomerChanged { customer_id });
        Ok(())
    }

    /// Make the next call fail with `err`. Calls queue up in order.
    pub fn fail_next(&self, err: ServiceError) -> ServiceResult<()> {
        self.state()?.failures.push_back(err);
        Ok(())
    }

    pub fn item(&self, id: InventoryItemId) -> ServiceResult<Option<InventoryItem>> {
        Ok(self.state()?.items.iter().find(|i| i.id == id).cloned())
    }

    /// Every movement recorded so far, oldest first.
    pub fn movements(&self) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.state()?.movements.clone())
    }

    pub fn registered_pharmacies(&self) -> ServiceResult<usize> {
        Ok(self.state()?.pharmacies.len())
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.callback_count()
    }

    /// Record `movement_type`/`quantity` against an item and apply it.
    fn apply_movement(
        &self,
        item_id: InventoryItemId,
        movement_type: MovementType,
        quantity: i64,
        reason: String,
        notes: Option<String>,
        prepare: impl FnOnce(&mut InventoryItem),
    ) -> ServiceResult<StockMovement> {
        let now = (self.clock)();
        let (movement, owner_id) = {
            let mut state = self.state()?;
            let item = state
                .items
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or(ServiceError::Domain(DomainError::NotFound))?;

            let movement = StockMovement::record(
                item_id,
                movement_type,
                quantity,
                item.current_stock,
                reason,
                now,
            )?
            .with_notes(notes);

            prepare(item);
            item.current_stock = movement.new_stock;
            item.status = InventoryStatus::derive(
                item.current_stock,
                item.min_stock_threshold,
                item.expiry_date,
                now.date_naive(),
                item.status == InventoryStatus::Discontinued,
            );
            let owner_id = item.owner_id;
            state.movements.push(movement.clone());
            (movement, owner_id)
        };

        tracing::debug!(
            item_id = %item_id,
            movement_type = %movement_type,
            previous_stock = movement.previous_stock,
            new_stock = movement.new_stock,
            "movement applied"
        );
        self.announce(CollectionChange::MovementRecorded {
            owner_id,
            item_id,
            movement_id: movement.id,
        });
        Ok(movement)
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn get_inventory_items(
        &self,
        owner_id: OwnerId,
        query: &InventoryQuery,
    ) -> ServiceResult<Vec<InventoryItem>> {
        self.injected()?;
        let state = self.state()?;
        let catalog = state.products.get(&owner_id);
        let product_of = |item: &InventoryItem| {
            catalog.and_then(|products| products.iter().find(|p| p.id == item.product_id))
        };
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(state
            .items
            .iter()
            .filter(|item| item.owner_id == owner_id)
            .filter(|item| query.status.is_none_or(|s| item.status == s))
            .filter(|item| {
                query
                    .category
                    .as_deref()
                    .is_none_or(|c| product_of(item).map(|p| p.category.as_str()) == Some(c))
            })
            .filter(|item| {
                needle
                    .as_deref()
                    .is_none_or(|needle| search_hits(item, product_of(item), needle))
            })
            .cloned()
            .collect())
    }

    async fn get_products(&self, owner_id: OwnerId) -> ServiceResult<Vec<Product>> {
        self.injected()?;
        Ok(self.state()?.products.get(&owner_id).cloned().unwrap_or_default())
    }

    async fn get_inventory_movements(
        &self,
        owner_id: OwnerId,
    ) -> ServiceResult<Vec<StockMovement>> {
        self.injected()?;
        let state = self.state()?;
        Ok(state
            .movements
            .iter()
            .filter(|m| {
                state
                    .items
                    .iter()
                    .any(|i| i.id == m.inventory_item_id && i.owner_id == owner_id)
            })
            .cloned()
            .collect())
    }

    async fn restock_item(&self, request: RestockRequest) -> ServiceResult<StockMovement> {
        request.validate()?;
        self.injected()?;

        let reason = match &request.supplier {
            Some(supplier) => format!("restock from {supplier}"),
            None => "restock".to_string(),
        };
        let RestockRequest {
            item_id,
            quantity,
            supplier,
            batch_number,
            expiry_date,
            cost_price,
            notes,
        } = request;

        self.apply_movement(item_id, MovementType::Restock, quantity, reason, notes, |item| {
            if let Some(supplier) = supplier {
                item.supplier = supplier;
            }
            if let Some(batch) = batch_number {
                item.batch_number = batch;
            }
            if let Some(expiry) = expiry_date {
                item.expiry_date = Some(expiry);
            }
            if let Some(cost) = cost_price {
                item.cost_price = cost;
            }
        })
    }

    async fn update_stock(&self, request: StockUpdateRequest) -> ServiceResult<StockMovement> {
        request.validate()?;
        self.injected()?;
        self.apply_movement(
            request.item_id,
            request.movement_type,
            request.quantity,
            request.reason,
            request.notes,
            |_| {},
        )
    }

    fn subscribe(&self, callback: Callback<CollectionChange>) -> SubscriptionHandle {
        self.bus.subscribe_fn(callback)
    }
}

#[async_trait]
impl CustomerService for InMemoryInventoryService {
    async fn get_customers(&self, owner_id: OwnerId) -> ServiceResult<Vec<Customer>> {
        self.injected()?;
        Ok(self.state()?.customers.get(&owner_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OrderService for InMemoryInventoryService {
    async fn get_order_history(&self, customer_id: CustomerId) -> ServiceResult<Vec<OrderSummary>> {
        self.injected()?;
        Ok(self.state()?.orders.get(&customer_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OnboardingService for InMemoryInventoryService {
    async fn register_pharmacy(
        &self,
        application: &PharmacyApplication,
    ) -> ServiceResult<PharmacyId> {
        application.validate()?;
        self.injected()?;
        let mut state = self.state()?;
        let name = application.business.pharmacy_name.trim();
        if state
            .pharmacies
            .iter()
            .any(|(_, a)| a.business.pharmacy_name.trim().eq_ignore_ascii_case(name))
        {
            return Err(ServiceError::rejected(
                "DUPLICATE_PHARMACY",
                format!("{name} is already registered"),
            ));
        }
        let id = PharmacyId::new();
        state.pharmacies.push((id, application.clone()));
        Ok(id)
    }
}

/// Same fields the inventory table searches: product name, generic name,
/// batch, supplier and location.
fn search_hits(item: &InventoryItem, product: Option<&Product>, needle: &str) -> bool {
    let product_fields = product
        .into_iter()
        .flat_map(|p| [Some(p.name.as_str()), p.generic_name.as_deref()])
        .flatten();
    [item.batch_number.as_str(), item.supplier.as_str(), item.location.as_str()]
        .into_iter()
        .chain(product_fields)
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, TimeZone};
    use cura_core::{Money, ProductId};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
    }

    fn seeded(stock: i64) -> (InMemoryInventoryService, OwnerId, InventoryItemId) {
        let service = InMemoryInventoryService::new().with_clock(fixed_now);
        let owner = OwnerId::new();
        let product = Product::new(ProductId::new(), "Glucophage 500", "Diabetes");
        let item = InventoryItem {
            id: InventoryItemId::new(),
            owner_id: owner,
            product_id: product.id,
            current_stock: stock,
            min_stock_threshold: 10,
            max_stock_capacity: 100,
            status: InventoryStatus::derive(stock, 10, None, fixed_now().date_naive(), false),
            supplier: "Julphar".into(),
            batch_number: "G-1".into(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 3, 1),
            cost_price: Money::from_minor(900),
            selling_price: Money::from_minor(1_400),
            location: "B3".into(),
        };
        let id = item.id;
        service.insert_product(owner, product).unwrap();
        service.insert_item(item).unwrap();
        (service, owner, id)
    }

    #[tokio::test]
    async fn restock_updates_stock_and_status() {
        let (service, _, id) = seeded(4);
        let mut request = RestockRequest::new(id, 30);
        request.batch_number = Some("G-2".into());

        let movement = service.restock_item(request).await.unwrap();
        assert_eq!((movement.previous_stock, movement.new_stock), (4, 34));
        assert_eq!(movement.timestamp, fixed_now());

        let item = service.item(id).unwrap().unwrap();
        assert_eq!(item.current_stock, 34);
        assert_eq!(item.status, InventoryStatus::InStock);
        assert_eq!(item.batch_number, "G-2");
    }

    #[tokio::test]
    async fn sale_below_zero_is_rejected_without_side_effects() {
        let (service, _, id) = seeded(3);
        let request =
            StockUpdateRequest::to_target(id, 3, 0, MovementType::Sale, "walk-in").unwrap();
        let mut too_much = request.clone();
        too_much.quantity = 5;

        assert!(matches!(
            service.update_stock(too_much).await,
            Err(ServiceError::Domain(DomainError::InvariantViolation(_)))
        ));
        assert!(service.movements().unwrap().is_empty());

        service.update_stock(request).await.unwrap();
        assert_eq!(service.item(id).unwrap().unwrap().status, InventoryStatus::OutOfStock);
    }

    #[tokio::test]
    async fn discontinued_stays_discontinued() {
        let (service, _, id) = seeded(50);
        service.state().unwrap().items[0].status = InventoryStatus::Discontinued;
        service.restock_item(RestockRequest::new(id, 5)).await.unwrap();
        assert_eq!(service.item(id).unwrap().unwrap().status, InventoryStatus::Discontinued);
    }

    #[tokio::test]
    async fn mutations_notify_subscribers_until_dropped() {
        let (service, owner, id) = seeded(20);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let handle = service.subscribe(Arc::new(move |change: &CollectionChange| {
            if change.affects_owner(owner) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        service.restock_item(RestockRequest::new(id, 1)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        drop(handle);
        service.restock_item(RestockRequest::new(id, 1)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(service.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn injected_failures_are_served_once() {
        let (service, owner, _) = seeded(20);
        service.fail_next(ServiceError::Timeout).unwrap();
        assert_eq!(service.get_products(owner).await, Err(ServiceError::Timeout));
        assert_eq!(service.get_products(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn query_narrows_by_status_and_category() {
        let (service, owner, _) = seeded(2);
        let low = InventoryQuery::all().with_status(InventoryStatus::LowStock);
        assert_eq!(service.get_inventory_items(owner, &low).await.unwrap().len(), 1);

        let other = InventoryQuery::all().with_category("Vitamins");
        assert!(service.get_inventory_items(owner, &other).await.unwrap().is_empty());

        let stranger = service.get_inventory_items(OwnerId::new(), &InventoryQuery::all()).await;
        assert!(stranger.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_matches_product_and_item_fields() {
        let (service, owner, id) = seeded(40);
        for term in ["julph", "GLUCO", "  b3 ", "g-1"] {
            let query = InventoryQuery::all().with_search(term);
            let found = service.get_inventory_items(owner, &query).await.unwrap();
            assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![id], "{term}");
        }

        let none = InventoryQuery::all().with_search("insulin");
        assert!(service.get_inventory_items(owner, &none).await.unwrap().is_empty());

        let blank = InventoryQuery::all().with_search("   ");
        assert_eq!(service.get_inventory_items(owner, &blank).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn oversized_restock_fails_and_provider_stays_usable() {
        let (service, owner, id) = seeded(4);
        let err = service.restock_item(RestockRequest::new(id, i64::MAX)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvariantViolation(_))));
        assert!(service.movements().unwrap().is_empty());

        let movement = service.restock_item(RestockRequest::new(id, 6)).await.unwrap();
        assert_eq!(movement.new_stock, 10);
        let items = service.get_inventory_items(owner, &InventoryQuery::all()).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (service, _, _) = seeded(2);
        let err = service
            .restock_item(RestockRequest::new(InventoryItemId::new(), 2))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::NotFound));
    }

    fn operation() -> impl proptest::strategy::Strategy<Value = (MovementType, i64)> {
        use proptest::prelude::*;
        (
            prop::sample::select(MovementType::ALL.to_vec()),
            prop_oneof![-40i64..0, 1i64..40],
        )
    }

    proptest::proptest! {
        #[test]
        fn recorded_movements_chain_and_never_go_negative(
            start in 0i64..60,
            ops in proptest::collection::vec(operation(), 1..25),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (service, _, id) = seeded(start);

            runtime.block_on(async {
                for (movement_type, quantity) in ops {
                    let quantity = match movement_type {
                        MovementType::Adjustment => quantity,
                        _ => quantity.abs(),
                    };
                    let request = StockUpdateRequest {
                        item_id: id,
                        quantity,
                        movement_type,
                        reason: "property".into(),
                        metadata: Default::default(),
                        notes: None,
                    };
                    let _ = service.update_stock(request).await;
                }
            });

            let movements = service.movements().unwrap();
            let mut stock = start;
            for m in &movements {
                proptest::prop_assert_eq!(m.previous_stock, stock);
                proptest::prop_assert!(m.check_invariant().is_ok());
                proptest::prop_assert!(m.new_stock >= 0);
                stock = m.new_stock;
            }
            proptest::prop_assert_eq!(service.item(id).unwrap().unwrap().current_stock, stock);
        }
    }
}
