use serde::{Deserialize, Serialize};

use cura_core::{CustomerId, InventoryItemId, MovementId, OwnerId};

/// A collection owned by the data provider changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CollectionChange {
    /// One item (or, with `item_id: None`, the whole list) changed.
    InventoryChanged {
        owner_id: OwnerId,
        item_id: Option<InventoryItemId>,
    },
    /// A stock movement was recorded against an item.
    MovementRecorded {
        owner_id: OwnerId,
        item_id: InventoryItemId,
        movement_id: MovementId,
    },
    CatalogChanged { owner_id: OwnerId },
    CustomerChanged { customer_id: CustomerId },
}

impl CollectionChange {
    /// Owner whose inventory views should refresh, if any.
    pub fn inventory_owner(&self) -> Option<OwnerId> {
        match self {
            CollectionChange::InventoryChanged { owner_id, .. }
            | CollectionChange::MovementRecorded { owner_id, .. }
            | CollectionChange::CatalogChanged { owner_id } => Some(*owner_id),
            CollectionChange::CustomerChanged { .. } => None,
        }
    }

    pub fn affects_owner(&self, owner_id: OwnerId) -> bool {
        self.inventory_owner() == Some(owner_id)
    }
}
