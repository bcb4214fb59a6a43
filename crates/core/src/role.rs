//! User roles and the dashboards they resolve to.
//!
//! Roles form a closed set. Each role maps to exactly one [`Dashboard`]
//! through a static lookup table; callers never branch on role strings.

use serde::{Deserialize, Serialize};

use crate::impl_label_enum;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UserRole {
    Customer,
    Pharmacy,
    Vendor,
    Admin,
}

/// A section (page group) of a dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardSection {
    Orders,
    Prescriptions,
    Profile,
    Inventory,
    Customers,
    Products,
    Pharmacies,
    Analytics,
}

/// Static description of one role's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dashboard {
    pub role: UserRole,
    pub title: &'static str,
    pub sections: &'static [DashboardSection],
}

impl Dashboard {
    pub fn has_section(&self, section: DashboardSection) -> bool {
        self.sections.contains(&section)
    }

    /// Section shown when the dashboard first opens.
    pub fn landing(&self) -> DashboardSection {
        self.sections[0]
    }
}

use DashboardSection as S;

static DASHBOARDS: [Dashboard; 4] = [
    Dashboard {
        role: UserRole::Customer,
        title: "My Health",
        sections: &[S::Orders, S::Prescriptions, S::Profile],
    },
    Dashboard {
        role: UserRole::Pharmacy,
        title: "Pharmacy",
        sections: &[S::Inventory, S::Orders, S::Prescriptions, S::Customers],
    },
    Dashboard {
        role: UserRole::Vendor,
        title: "Vendor",
        sections: &[S::Inventory, S::Products, S::Orders],
    },
    Dashboard {
        role: UserRole::Admin,
        title: "Administration",
        sections: &[S::Pharmacies, S::Customers, S::Orders, S::Analytics],
    },
];

impl_label_enum!(UserRole, "user role", {
    Customer => "customer",
    Pharmacy => "pharmacy",
    Vendor => "vendor",
    Admin => "admin",
});

impl UserRole {
    fn table_index(self) -> usize {
        match self {
            UserRole::Customer => 0,
            UserRole::Pharmacy => 1,
            UserRole::Vendor => 2,
            UserRole::Admin => 3,
        }
    }

    pub fn dashboard(self) -> &'static Dashboard {
        &DASHBOARDS[self.table_index()]
    }

    /// Roles that hold stock and may restock/adjust it.
    pub fn manages_inventory(self) -> bool {
        self.dashboard().has_section(DashboardSection::Inventory)
    }
}
