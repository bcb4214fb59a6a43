//! Data provider traits.
//!
//! The external CURA service owns every record. These traits are the only
//! way the dashboards reach it; [`HttpInventoryService`] talks to the real
//! API and [`InMemoryInventoryService`] stands in for it in tests and
//! offline demos.
//!
//! [`HttpInventoryService`]: crate::http::HttpInventoryService
//! [`InMemoryInventoryService`]: crate::memory::InMemoryInventoryService

use std::sync::Arc;

use async_trait::async_trait;

use cura_core::{CustomerId, OwnerId, PharmacyId};
use cura_customers::{Customer, OrderSummary};
use cura_events::{Callback, CollectionChange, SubscriptionHandle};
use cura_inventory::{
    InventoryItem, InventoryQuery, Product, RestockRequest, StockMovement, StockUpdateRequest,
};
use cura_listing::{InventoryRow, join_rows};

use crate::error::ServiceResult;
use crate::onboarding::PharmacyApplication;

#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn get_inventory_items(
        &self,
        owner_id: OwnerId,
        query: &InventoryQuery,
    ) -> ServiceResult<Vec<InventoryItem>>;

    /// Catalog entries the owner's items join against.
    async fn get_products(&self, owner_id: OwnerId) -> ServiceResult<Vec<Product>>;

    async fn get_inventory_movements(&self, owner_id: OwnerId) -> ServiceResult<Vec<StockMovement>>;

    async fn restock_item(&self, request: RestockRequest) -> ServiceResult<StockMovement>;

    async fn update_stock(&self, request: StockUpdateRequest) -> ServiceResult<StockMovement>;

    /// Register for change notifications. Dropping the handle unsubscribes.
    fn subscribe(&self, callback: Callback<CollectionChange>) -> SubscriptionHandle;
}

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn get_customers(&self, owner_id: OwnerId) -> ServiceResult<Vec<Customer>>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn get_order_history(&self, customer_id: CustomerId) -> ServiceResult<Vec<OrderSummary>>;
}

#[async_trait]
pub trait OnboardingService: Send + Sync {
    async fn register_pharmacy(
        &self,
        application: &PharmacyApplication,
    ) -> ServiceResult<PharmacyId>;
}

#[async_trait]
impl<S: InventoryService + ?Sized> InventoryService for Arc<S> {
    async fn get_inventory_items(
        &self,
        owner_id: OwnerId,
        query: &InventoryQuery,
    ) -> ServiceResult<Vec<InventoryItem>> {
        (**self).get_inventory_items(owner_id, query).await
    }

    async fn get_products(&self, owner_id: OwnerId) -> ServiceResult<Vec<Product>> {
        (**self).get_products(owner_id).await
    }

    async fn get_inventory_movements(
        &self,
        owner_id: OwnerId,
    ) -> ServiceResult<Vec<StockMovement>> {
        (**self).get_inventory_movements(owner_id).await
    }

    async fn restock_item(&self, request: RestockRequest) -> ServiceResult<StockMovement> {
        (**self).restock_item(request).await
    }

    async fn update_stock(&self, request: StockUpdateRequest) -> ServiceResult<StockMovement> {
        (**self).update_stock(request).await
    }

    fn subscribe(&self, callback: Callback<CollectionChange>) -> SubscriptionHandle {
        (**self).subscribe(callback)
    }
}

/// Everything an inventory page renders from: joined rows plus movements.
#[derive(Debug, Clone, Default)]
pub struct InventoryData {
    pub rows: Vec<InventoryRow>,
    pub movements: Vec<StockMovement>,
}

/// Fetch items, products and movements concurrently and join them.
///
/// Items without a catalog product are dropped here, once, so no view or
/// statistic ever sees them.
pub async fn load_inventory<S>(
    service: &S,
    owner_id: OwnerId,
    query: &InventoryQuery,
) -> ServiceResult<InventoryData>
where
    S: InventoryService + ?Sized,
{
    let (items, products, movements) = tokio::try_join!(
        service.get_inventory_items(owner_id, query),
        service.get_products(owner_id),
        service.get_inventory_movements(owner_id),
    )?;

    tracing::debug!(
        owner_id = %owner_id,
        items = items.len(),
        products = products.len(),
        movements = movements.len(),
        "inventory loaded"
    );

    Ok(InventoryData {
        rows: join_rows(items, &products),
        movements,
    })
}
