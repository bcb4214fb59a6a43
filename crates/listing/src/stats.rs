//! Summary statistics for stat cards.
//!
//! Both collectors make a single pass. Which set they are fed decides what
//! the card means: the raw collection for global cards, the visible subset
//! for tab-scoped cards.

use chrono::NaiveDate;

use cura_core::Money;
use cura_inventory::InventoryStatus;

use crate::filter::Filterable;
use crate::inventory::InventoryRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_items: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expired: usize,
    pub discontinued: usize,
    /// Not yet expired, but expiring within the window.
    pub expiring_soon: usize,
    /// Sum of positive stock levels.
    pub total_units: i64,
    /// Stock value at cost.
    pub total_value: Money,
}

impl InventoryStats {
    pub fn collect<'a>(
        rows: impl IntoIterator<Item = &'a InventoryRow>,
        today: NaiveDate,
        expiry_window_days: u32,
    ) -> Self {
        let mut stats = InventoryStats::default();
        for row in rows {
            stats.total_items += 1;
            match row.item.status {
                InventoryStatus::InStock => stats.in_stock += 1,
                InventoryStatus::LowStock => stats.low_stock += 1,
                InventoryStatus::OutOfStock => stats.out_of_stock += 1,
                InventoryStatus::Expired => stats.expired += 1,
                InventoryStatus::Discontinued => stats.discontinued += 1,
            }
            if row.item.expires_within(today, expiry_window_days) {
                stats.expiring_soon += 1;
            }
            stats.total_units = stats.total_units.saturating_add(row.item.current_stock.max(0));
            stats.total_value = stats.total_value.saturating_add(row.item.value());
        }
        stats
    }

    pub fn count(&self, status: InventoryStatus) -> usize {
        match status {
            InventoryStatus::InStock => self.in_stock,
            InventoryStatus::LowStock => self.low_stock,
            InventoryStatus::OutOfStock => self.out_of_stock,
            InventoryStatus::Expired => self.expired,
            InventoryStatus::Discontinued => self.discontinued,
        }
    }

    /// Items that need reordering.
    pub fn needs_restock(&self) -> usize {
        self.low_stock + self.out_of_stock
    }
}

/// Record counts per status, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCounts<S> {
    pub total: usize,
    counts: Vec<(S, usize)>,
}

impl<S> Default for StatusCounts<S> {
    fn default() -> Self {
        Self {
            total: 0,
            counts: Vec::new(),
        }
    }
}

impl<S: Copy + PartialEq> StatusCounts<S> {
    pub fn collect<'a, T>(records: impl IntoIterator<Item = &'a T>) -> Self
    where
        T: Filterable<Status = S> + 'a,
    {
        let mut counts = StatusCounts::default();
        for record in records {
            counts.add(record.status());
        }
        counts
    }

    fn add(&mut self, status: S) {
        self.total += 1;
        match self.counts.iter_mut().find(|(s, _)| *s == status) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((status, 1)),
        }
    }

    pub fn count(&self, status: S) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        self.counts.iter().copied()
    }
}
