//! HTTP provider for the CURA REST API.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use cura_core::{CustomerId, InventoryItemId, OwnerId, PharmacyId, Validate};
use cura_customers::{Customer, OrderSummary};
use cura_events::{Callback, ChangeBus, CollectionChange, InMemoryChangeBus, SubscriptionHandle};
use cura_inventory::{
    InventoryItem, InventoryQuery, Product, RestockRequest, StockMovement, StockUpdateRequest,
};

use crate::config::ClientConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::onboarding::PharmacyApplication;
use crate::response::{ServiceResponse, decode};
use crate::service::{CustomerService, InventoryService, OnboardingService, OrderService};

/// Talks to the CURA API over REST.
///
/// Requests are never retried: stock mutations are not idempotent. Change
/// notifications are published locally after each confirmed mutation.
pub struct HttpInventoryService {
    client: Client,
    base_url: String,
    token: Option<String>,
    bus: InMemoryChangeBus<CollectionChange>,
    /// Owner of every item seen in a listing, so mutations can say whose
    /// inventory changed.
    owners: RwLock<HashMap<InventoryItemId, OwnerId>>,
}

impl core::fmt::Debug for HttpInventoryService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpInventoryService")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpInventoryService {
    pub fn new(config: &ClientConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
            bus: InMemoryChangeBus::new(),
            owners: RwLock::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.authorize(self.client.get(&url).query(query)).send().await?;
        Self::read(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.authorize(self.client.post(&url).json(body)).send().await?;
        Self::read(response).await
    }

    /// Unwrap the response envelope. Error statuses still carry an envelope
    /// when the service produced them; anything else becomes `Api`.
    async fn read<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return decode(&body);
        }

        match serde_json::from_slice::<ServiceResponse<serde::de::IgnoredAny>>(&body) {
            Ok(ServiceResponse::Error { code, message }) => {
                Err(ServiceError::Rejected { code, message })
            }
            _ => Err(ServiceError::Api(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            )),
        }
    }

    /// `GET /health`; any failure counts as offline.
    pub async fn check_connectivity(&self) -> bool {
        let request = self.authorize(self.client.get(self.url("health")));
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, base_url = %self.base_url, "API unreachable");
                false
            }
        }
    }

    fn remember_owners(&self, items: &[InventoryItem]) {
        if let Ok(mut owners) = self.owners.write() {
            owners.extend(items.iter().map(|i| (i.id, i.owner_id)));
        }
    }

    fn owner_of(&self, item_id: InventoryItemId) -> Option<OwnerId> {
        self.owners.read().ok()?.get(&item_id).copied()
    }

    fn announce_movement(&self, movement: &StockMovement) {
        let item_id = movement.inventory_item_id;
        let Some(owner_id) = self.owner_of(item_id) else {
            tracing::debug!(
                item_id = %item_id,
                "movement for an item never listed; no notification"
            );
            return;
        };
        let change = CollectionChange::MovementRecorded {
            owner_id,
            item_id,
            movement_id: movement.id,
        };
        if let Err(err) = self.bus.publish(change) {
            tracing::warn!(error = ?err, "change notification dropped");
        }
    }
}

#[async_trait]
impl InventoryService for HttpInventoryService {
    async fn get_inventory_items(
        &self,
        owner_id: OwnerId,
        query: &InventoryQuery,
    ) -> ServiceResult<Vec<InventoryItem>> {
        let items: Vec<InventoryItem> = self
            .get(&format!("owners/{owner_id}/inventory"), &query.to_pairs())
            .await?;
        self.remember_owners(&items);
        Ok(items)
    }

    async fn get_products(&self, owner_id: OwnerId) -> ServiceResult<Vec<Product>> {
        self.get(&format!("owners/{owner_id}/products"), &[]).await
    }

    async fn get_inventory_movements(
        &self,
        owner_id: OwnerId,
    ) -> ServiceResult<Vec<StockMovement>> {
        self.get(&format!("owners/{owner_id}/inventory/movements"), &[])
            .await
    }

    async fn restock_item(&self, request: RestockRequest) -> ServiceResult<StockMovement> {
        request.validate()?;
        let movement: StockMovement = self
            .post(&format!("inventory/{}/restock", request.item_id), &request)
            .await?;
        self.announce_movement(&movement);
        Ok(movement)
    }

    async fn update_stock(&self, request: StockUpdateRequest) -> ServiceResult<StockMovement> {
        request.validate()?;
        let movement: StockMovement = self
            .post(&format!("inventory/{}/stock", request.item_id), &request)
            .await?;
        self.announce_movement(&movement);
        Ok(movement)
    }

    fn subscribe(&self, callback: Callback<CollectionChange>) -> SubscriptionHandle {
        self.bus.subscribe_fn(callback)
    }
}

#[async_trait]
impl CustomerService for HttpInventoryService {
    async fn get_customers(&self, owner_id: OwnerId) -> ServiceResult<Vec<Customer>> {
        self.get(&format!("owners/{owner_id}/customers"), &[]).await
    }
}

#[async_trait]
impl OrderService for HttpInventoryService {
    async fn get_order_history(&self, customer_id: CustomerId) -> ServiceResult<Vec<OrderSummary>> {
        self.get(&format!("customers/{customer_id}/orders"), &[]).await
    }
}

#[async_trait]
impl OnboardingService for HttpInventoryService {
    async fn register_pharmacy(
        &self,
        application: &PharmacyApplication,
    ) -> ServiceResult<PharmacyId> {
        application.validate()?;
        let id: PharmacyId = self.post("pharmacies/applications", application).await?;
        tracing::info!(pharmacy_id = %id, "pharmacy application accepted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn service(url: &str) -> HttpInventoryService {
        let config = ClientConfig::new(url)
            .with_token("t0ken")
            .with_timeout(Duration::from_millis(200));
        HttpInventoryService::new(&config).unwrap()
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let svc = service("http://cura.test/api/");
        assert_eq!(svc.base_url(), "http://cura.test/api");
        assert_eq!(svc.url("/health"), "http://cura.test/api/health");
        assert_eq!(svc.url("owners/x/inventory"), "http://cura.test/api/owners/x/inventory");
    }

    #[tokio::test]
    async fn invalid_requests_never_leave_the_client() {
        // Nothing listens on this port; a request that got sent would fail
        // with a transport error rather than a domain one.
        let svc = service("http://127.0.0.1:9");
        let err = svc
            .restock_item(RestockRequest::new(InventoryItemId::new(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(_)));
    }

    #[tokio::test]
    async fn unreachable_api_is_offline() {
        let svc = service("http://127.0.0.1:9");
        assert!(!svc.check_connectivity().await);
        let err = svc.get_products(OwnerId::new()).await.unwrap_err();
        assert!(err.is_transient(), "{err:?}");
    }
}
