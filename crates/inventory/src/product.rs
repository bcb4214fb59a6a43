use serde::{Deserialize, Serialize};

use cura_core::{Entity, ProductId};

/// Catalog record an inventory item joins against for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub requires_prescription: bool,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            generic_name: None,
            category: category.into(),
            manufacturer: None,
            requires_prescription: false,
        }
    }

    pub fn with_generic_name(mut self, generic_name: impl Into<String>) -> Self {
        self.generic_name = Some(generic_name.into());
        self
    }

    pub fn prescription_only(mut self) -> Self {
        self.requires_prescription = true;
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
