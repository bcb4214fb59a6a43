//! Presentation shell: raw collection plus transient filter state.
//!
//! A view holds nothing else. Every render re-derives the visible subset and
//! the stat cards from those two, so there is no cached state to go stale.

use std::collections::HashMap;

use chrono::NaiveDate;

use cura_core::{Entity, InventoryItemId};
use cura_inventory::StockMovement;

use crate::filter::{FilterState, Filterable, apply, apply_iter};
use crate::inventory::{InventoryFilter, InventoryRow, InventoryTab};
use crate::stats::{InventoryStats, StatusCounts};

pub const DEFAULT_EXPIRY_WINDOW_DAYS: u32 = 30;

/// A stock movement joined to the product it moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRow<'a> {
    pub movement: &'a StockMovement,
    pub product_name: &'a str,
}

/// One rendered frame of the inventory page.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot<'a> {
    /// Over the unfiltered collection.
    pub global: InventoryStats,
    /// Over the rows on the current tab.
    pub scoped: InventoryStats,
    pub visible: Vec<&'a InventoryRow>,
    /// Newest first; only populated on the movements tab.
    pub movements: Vec<MovementRow<'a>>,
}

#[derive(Debug, Clone)]
pub struct InventoryView {
    rows: Vec<InventoryRow>,
    movements: Vec<StockMovement>,
    filter: InventoryFilter,
    tab: InventoryTab,
    expiry_window_days: u32,
}

impl Default for InventoryView {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY_WINDOW_DAYS)
    }
}

impl InventoryView {
    pub fn new(expiry_window_days: u32) -> Self {
        Self {
            rows: Vec::new(),
            movements: Vec::new(),
            filter: InventoryFilter::new(),
            tab: InventoryTab::default(),
            expiry_window_days,
        }
    }

    /// Swap in a freshly fetched collection. Filter state is kept.
    pub fn replace(&mut self, rows: Vec<InventoryRow>, movements: Vec<StockMovement>) {
        tracing::debug!(rows = rows.len(), movements = movements.len(), "inventory view refreshed");
        self.rows = rows;
        self.movements = movements;
    }

    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    pub fn row(&self, item_id: InventoryItemId) -> Option<&InventoryRow> {
        find(&self.rows, item_id)
    }

    pub fn filter(&self) -> &InventoryFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut InventoryFilter {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: InventoryFilter) {
        self.filter = filter;
    }

    pub fn tab(&self) -> InventoryTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: InventoryTab) {
        self.tab = tab;
    }

    pub fn expiry_window_days(&self) -> u32 {
        self.expiry_window_days
    }

    /// Called on navigation: filters and tab go back to defaults.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.tab = InventoryTab::default();
    }

    pub fn render(&self, today: NaiveDate) -> InventorySnapshot<'_> {
        let window = self.expiry_window_days;
        let filtered = apply(&self.rows, &self.filter);

        let (visible, movements) = if self.tab.shows_movements() {
            (Vec::new(), self.movement_rows(&filtered))
        } else {
            let visible: Vec<&InventoryRow> = filtered
                .into_iter()
                .filter(|row| self.tab.admits(row, today, window))
                .collect();
            (visible, Vec::new())
        };

        InventorySnapshot {
            global: InventoryStats::collect(&self.rows, today, window),
            scoped: InventoryStats::collect(visible.iter().copied(), today, window),
            visible,
            movements,
        }
    }

    /// Movements of the filtered rows, newest first. Movements of unknown
    /// items are dropped like any other malformed row.
    fn movement_rows<'a>(&'a self, filtered: &[&'a InventoryRow]) -> Vec<MovementRow<'a>> {
        let names: HashMap<InventoryItemId, &str> = filtered
            .iter()
            .map(|r| (r.item.id, r.product.name.as_str()))
            .collect();

        let mut rows: Vec<MovementRow<'a>> = self
            .movements
            .iter()
            .filter_map(|movement| {
                names.get(&movement.inventory_item_id).map(|&product_name| MovementRow {
                    movement,
                    product_name,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.movement.timestamp.cmp(&a.movement.timestamp));
        rows
    }
}

/// Rendered frame of a read-only list (customers, order history).
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<'a, T: Filterable> {
    pub global: StatusCounts<T::Status>,
    pub scoped: StatusCounts<T::Status>,
    pub visible: Vec<&'a T>,
}

#[derive(Debug, Clone)]
pub struct ListView<T: Filterable> {
    records: Vec<T>,
    filter: FilterState<T::Status, T::SortKey>,
}

impl<T: Filterable> Default for ListView<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            filter: FilterState::default(),
        }
    }
}

impl<T: Filterable> ListView<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            filter: FilterState::default(),
        }
    }

    pub fn replace(&mut self, records: Vec<T>) {
        self.records = records;
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Find a record again after a refresh, e.g. to keep a detail panel open.
    pub fn get(&self, id: T::Id) -> Option<&T>
    where
        T: Entity,
    {
        find(&self.records, id)
    }

    pub fn filter_mut(&mut self) -> &mut FilterState<T::Status, T::SortKey> {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState<T::Status, T::SortKey>) {
        self.filter = filter;
    }

    pub fn reset(&mut self) {
        self.filter.reset();
    }

    pub fn render(&self) -> ListSnapshot<'_, T> {
        let visible = apply_iter(self.records.iter(), &self.filter);
        ListSnapshot {
            global: StatusCounts::collect(&self.records),
            scoped: StatusCounts::collect(visible.iter().copied()),
            visible,
        }
    }
}

fn find<T: Entity>(records: &[T], id: T::Id) -> Option<&T> {
    records.iter().find(|r| r.id() == id)
}
