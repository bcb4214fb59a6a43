//! `cura-client`
//!
//! Service boundary and interaction state for the CURA dashboards:
//!
//! - typed service traits and two providers (REST and in-memory)
//! - the response envelope validated at the boundary
//! - modal and dispatcher state for stock actions
//! - the pharmacy onboarding wizard
//! - configuration from the environment
//!
//! Views themselves (filtering, sorting, stat cards) live in `cura-listing`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod memory;
pub mod modal;
pub mod onboarding;
pub mod response;
pub mod service;

pub use config::{ClientConfig, ConfigError};
pub use dispatcher::{AdjustStockForm, InventoryDispatcher, RestockForm};
pub use error::{ServiceError, ServiceResult};
pub use http::HttpInventoryService;
pub use memory::InMemoryInventoryService;
pub use modal::{DispatchError, ModalState};
pub use onboarding::{
    BusinessDetails, LicenseDetails, LocationDetails, OnboardingStep, OnboardingWizard,
    PharmacyApplication,
};
pub use response::ServiceResponse;
pub use service::{
    CustomerService, InventoryData, InventoryService, OnboardingService, OrderService,
    load_inventory,
};
