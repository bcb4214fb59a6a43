//! Inventory rows: items joined with their catalog products.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::NaiveDate;

use cura_core::{Entity, InventoryItemId, ProductId, impl_label_enum};
use cura_inventory::{InventoryItem, InventoryStatus, Product};

use crate::filter::{FilterState, Filterable, SortValue};

/// An inventory item with its product resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub item: InventoryItem,
    pub product: Product,
}

impl Entity for InventoryRow {
    type Id = InventoryItemId;

    fn id(&self) -> InventoryItemId {
        self.item.id
    }
}

/// Join items to products; items whose product is unknown are dropped.
///
/// A missing product means the row is malformed. It is excluded from every
/// view (and every statistic) rather than raised as an error.
pub fn join_rows(items: Vec<InventoryItem>, products: &[Product]) -> Vec<InventoryRow> {
    let catalog: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let total = items.len();
    let rows: Vec<InventoryRow> = items
        .into_iter()
        .filter_map(|item| match catalog.get(&item.product_id) {
            Some(product) => Some(InventoryRow {
                product: (*product).clone(),
                item,
            }),
            None => {
                tracing::debug!(
                    item_id = %item.id,
                    product_id = %item.product_id,
                    "dropping inventory row without catalog product"
                );
                None
            }
        })
        .collect();

    if rows.len() < total {
        tracing::warn!(dropped = total - rows.len(), total, "inventory rows missing products");
    }
    rows
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum InventorySortKey {
    #[default]
    Name,
    Stock,
    /// Stock value at cost.
    Value,
    Expiry,
}

impl_label_enum!(InventorySortKey, "inventory sort key", {
    Name => "name",
    Stock => "stock",
    Value => "value",
    Expiry => "expiry",
});

pub type InventoryFilter = FilterState<InventoryStatus, InventorySortKey>;

impl Filterable for InventoryRow {
    type Status = InventoryStatus;
    type SortKey = InventorySortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.product.name.as_str()),
            Cow::Borrowed(self.item.batch_number.as_str()),
            Cow::Borrowed(self.item.supplier.as_str()),
            Cow::Borrowed(self.item.location.as_str()),
        ];
        if let Some(generic) = &self.product.generic_name {
            fields.push(Cow::Borrowed(generic.as_str()));
        }
        fields
    }

    fn status(&self) -> InventoryStatus {
        self.item.status
    }

    fn category(&self) -> Option<&str> {
        Some(self.product.category.as_str())
    }

    fn sort_value(&self, key: InventorySortKey) -> SortValue<'_> {
        match key {
            InventorySortKey::Name => SortValue::text(&self.product.name),
            InventorySortKey::Stock => SortValue::number(self.item.current_stock),
            InventorySortKey::Value => SortValue::number(self.item.value().minor()),
            InventorySortKey::Expiry => SortValue::day(self.item.expiry_date),
        }
    }
}

/// Tabs of the inventory page. Each item tab narrows the filtered rows further.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum InventoryTab {
    #[default]
    All,
    /// Low or out of stock.
    LowStock,
    /// Expiring within the configured window (not yet expired).
    Expiring,
    /// Recent stock movements instead of items.
    Movements,
}

impl_label_enum!(InventoryTab, "inventory tab", {
    All => "all",
    LowStock => "low-stock",
    Expiring => "expiring",
    Movements => "movements",
});

impl InventoryTab {
    /// Whether `row` belongs on this tab.
    pub fn admits(&self, row: &InventoryRow, today: NaiveDate, expiry_window_days: u32) -> bool {
        match self {
            InventoryTab::All => true,
            InventoryTab::LowStock => row.item.status.needs_restock(),
            InventoryTab::Expiring => row.item.expires_within(today, expiry_window_days),
            InventoryTab::Movements => false,
        }
    }

    pub fn shows_movements(&self) -> bool {
        matches!(self, InventoryTab::Movements)
    }
}

/// Distinct product categories, sorted, for the category dropdown.
pub fn categories(rows: &[InventoryRow]) -> Vec<&str> {
    let mut categories: Vec<&str> = rows.iter().map(|r| r.product.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}


#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;
    use crate::filter::apply;

    #[test]
    fn join_drops_items_without_products() {
        let kept = row("Panadol", 20, InventoryStatus::InStock);
        let orphan = row("Ghost", 5, InventoryStatus::LowStock);

        let rows = join_rows(
            vec![kept.item.clone(), orphan.item.clone()],
            std::slice::from_ref(&kept.product),
        );

        assert_eq!(rows, vec![kept]);
    }

    #[test]
    fn out_of_stock_filter_yields_exactly_one() {
        let rows = vec![
            row("Amoxil", 5, InventoryStatus::LowStock),
            row("Brufen", 0, InventoryStatus::OutOfStock),
        ];
        let filter = InventoryFilter::new().with_status(InventoryStatus::OutOfStock);

        let visible = apply(&rows, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].product.name, "Brufen");
    }

    #[test]
    fn supplier_match_returns_item() {
        let mut r = row("Ventolin", 40, InventoryStatus::InStock);
        r.item.supplier = "GulfMed Distribution".to_string();
        let rows = vec![r, row("Zyrtec", 40, InventoryStatus::InStock)];

        let visible = apply(&rows, &InventoryFilter::new().with_search("gulfmed"));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].product.name, "Ventolin");
    }

    #[test]
    fn generic_name_is_searchable() {
        let mut r = row("Panadol", 40, InventoryStatus::InStock);
        r.product = r.product.clone().with_generic_name("Paracetamol");
        let rows = vec![r];
        assert_eq!(apply(&rows, &InventoryFilter::new().with_search("paracet")).len(), 1);
    }

    #[test]
    fn stock_sort_is_descending() {
        let rows = vec![
            row("a", 3, InventoryStatus::LowStock),
            row("b", 30, InventoryStatus::InStock),
            row("c", 12, InventoryStatus::InStock),
        ];
        let sorted = apply(&rows, &InventoryFilter::new().sorted_by(InventorySortKey::Stock));
        let names: Vec<_> = sorted.iter().map(|r| r.product.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn value_sort_uses_cost() {
        let mut cheap = row("cheap", 50, InventoryStatus::InStock);
        cheap.item.cost_price = cura_core::Money::from_minor(10);
        let dear = row("dear", 20, InventoryStatus::InStock);
        let rows = vec![cheap, dear];

        let sorted = apply(&rows, &InventoryFilter::new().sorted_by(InventorySortKey::Value));
        assert_eq!(sorted[0].product.name, "dear");
    }

    #[test]
    fn tabs_narrow_rows() {
        let today = NaiveDate::from_ymd_opt(2027, 6, 10).unwrap();
        let low = row("low", 2, InventoryStatus::LowStock);
        let fine = row("fine", 80, InventoryStatus::InStock);

        assert!(InventoryTab::LowStock.admits(&low, today, 30));
        assert!(!InventoryTab::LowStock.admits(&fine, today, 30));
        assert!(InventoryTab::Expiring.admits(&fine, today, 30));
        assert!(!InventoryTab::Expiring.admits(&fine, today, 10));
        assert!(!InventoryTab::Movements.admits(&fine, today, 30));
    }

    #[test]
    fn sort_keys_parse_from_labels() {
        assert_eq!("Stock".parse::<InventorySortKey>().unwrap(), InventorySortKey::Stock);
        assert_eq!("low_stock".parse::<InventoryTab>().unwrap(), InventoryTab::LowStock);
    }

    #[test]
    fn categories_are_distinct() {
        let mut other = row("x", 1, InventoryStatus::LowStock);
        other.product.category = "Antibiotics".to_string();
        let rows = vec![
            row("a", 1, InventoryStatus::LowStock),
            other,
            row("b", 1, InventoryStatus::LowStock),
        ];
        assert_eq!(categories(&rows), vec!["Analgesics", "Antibiotics"]);
    }
}
