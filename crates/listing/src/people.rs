//! Customer list and order history.

use std::borrow::Cow;

use cura_core::impl_label_enum;
use cura_customers::{Customer, CustomerStatus, OrderStatus, OrderSummary};

use crate::filter::{Filterable, SortValue};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CustomerSortKey {
    #[default]
    Name,
    Orders,
    Spent,
    Joined,
}

impl_label_enum!(CustomerSortKey, "customer sort key", {
    Name => "name",
    Orders => "orders",
    Spent => "spent",
    Joined => "joined",
});

impl Filterable for Customer {
    type Status = CustomerStatus;
    type SortKey = CustomerSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.email.as_str()),
        ];
        fields.extend(self.phone.as_deref().map(Cow::Borrowed));
        fields.extend(self.city.as_deref().map(Cow::Borrowed));
        fields
    }

    fn status(&self) -> CustomerStatus {
        self.status
    }

    /// Customers are grouped by city.
    fn category(&self) -> Option<&str> {
        self.city.as_deref()
    }

    fn sort_value(&self, key: CustomerSortKey) -> SortValue<'_> {
        match key {
            CustomerSortKey::Name => SortValue::text(&self.name),
            CustomerSortKey::Orders => SortValue::number(self.total_orders),
            CustomerSortKey::Spent => SortValue::number(self.total_spent.minor()),
            CustomerSortKey::Joined => SortValue::instant(self.joined_at),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum OrderSortKey {
    #[default]
    Date,
    Total,
    Pharmacy,
}

impl_label_enum!(OrderSortKey, "order sort key", {
    Date => "date",
    Total => "total",
    Pharmacy => "pharmacy",
});

impl Filterable for OrderSummary {
    type Status = OrderStatus;
    type SortKey = OrderSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.id.to_string()),
            Cow::Borrowed(self.pharmacy_name.as_str()),
        ]
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn sort_value(&self, key: OrderSortKey) -> SortValue<'_> {
        match key {
            OrderSortKey::Date => SortValue::instant(self.placed_at),
            OrderSortKey::Total => SortValue::number(self.total.minor()),
            OrderSortKey::Pharmacy => SortValue::text(&self.pharmacy_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use cura_core::{CustomerId, Money, OrderId};

    use super::*;
    use crate::filter::{FilterState, apply};

    fn customer(name: &str, city: Option<&str>, orders: u32, status: CustomerStatus) -> Customer {
        Customer {
            id: CustomerId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: Some("+971500000000".to_string()),
            city: city.map(str::to_string),
            status,
            total_orders: orders,
            total_spent: Money::from_minor(u64::from(orders) * 1_000),
            joined_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn order(pharmacy: &str, day: u32, total: u64, status: OrderStatus) -> OrderSummary {
        OrderSummary {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            pharmacy_name: pharmacy.to_string(),
            status,
            item_count: 1,
            total: Money::from_minor(total),
            placed_at: Utc.with_ymd_and_hms(2026, 9, day, 12, 0, 0).unwrap(),
            prescription_required: false,
        }
    }

    #[test]
    fn customers_filter_by_city_and_search_email() {
        let rows = vec![
            customer("Layla", Some("Dubai"), 3, CustomerStatus::Active),
            customer("Karim", Some("Sharjah"), 8, CustomerStatus::Active),
            customer("Noor", None, 1, CustomerStatus::Blocked),
        ];

        let in_dubai = FilterState::<CustomerStatus, CustomerSortKey>::new().with_category("Dubai");
        assert_eq!(apply(&rows, &in_dubai).len(), 1);

        let by_email = FilterState::<CustomerStatus, CustomerSortKey>::new().with_search("karim@");
        assert_eq!(apply(&rows, &by_email)[0].name, "Karim");
    }

    #[test]
    fn customers_sort_by_orders_descending() {
        let rows = vec![
            customer("Layla", None, 3, CustomerStatus::Active),
            customer("Karim", None, 8, CustomerStatus::Active),
        ];
        let state = FilterState::<CustomerStatus, CustomerSortKey>::new()
            .sorted_by(CustomerSortKey::Orders);
        assert_eq!(apply(&rows, &state)[0].name, "Karim");
    }

    #[test]
    fn orders_sort_by_date_ascending() {
        let rows = vec![
            order("Green Cross", 20, 1_000, OrderStatus::Delivered),
            order("Life Pharmacy", 2, 3_000, OrderStatus::Pending),
        ];
        let state = FilterState::<OrderStatus, OrderSortKey>::new();
        assert_eq!(apply(&rows, &state)[0].pharmacy_name, "Life Pharmacy");

        let by_total = state.clone().sorted_by(OrderSortKey::Total);
        assert_eq!(apply(&rows, &by_total)[0].total, Money::from_minor(3_000));
    }

    #[test]
    fn orders_filter_by_normalized_status() {
        let rows = vec![
            order("Green Cross", 20, 1_000, OrderStatus::Delivered),
            order("Life Pharmacy", 2, 3_000, OrderStatus::Pending),
        ];
        let status: OrderStatus = "Delivered".parse().unwrap();
        let state = FilterState::<OrderStatus, OrderSortKey>::new().with_status(status);
        assert_eq!(apply(&rows, &state)[0].pharmacy_name, "Green Cross");
    }

    #[test]
    fn orders_are_searchable_by_id() {
        let target = order("Green Cross", 20, 1_000, OrderStatus::Delivered);
        let needle = target.id.to_string().to_uppercase();
        let rows = vec![target, order("Life Pharmacy", 2, 3_000, OrderStatus::Pending)];
        let state = FilterState::<OrderStatus, OrderSortKey>::new().with_search(needle);
        assert_eq!(apply(&rows, &state).len(), 1);
    }
}
