//! Pharmacy onboarding wizard.
//!
//! Four steps, `business -> license -> location -> review`. Moving forward
//! validates the step being left; moving back never does. Only the review
//! step can submit, and submission follows the same discipline as the
//! inventory modals: refused while invalid or in flight, form kept on
//! failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cura_core::{DomainError, DomainResult, PharmacyId, Validate, impl_label_enum, require_text};

use crate::modal::DispatchError;
use crate::service::OnboardingService;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum OnboardingStep {
    #[default]
    Business,
    License,
    Location,
    Review,
}

impl_label_enum!(OnboardingStep, "onboarding step", {
    Business => "business",
    License => "license",
    Location => "location",
    Review => "review",
});

impl OnboardingStep {
    pub fn next(self) -> Option<OnboardingStep> {
        let i = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(i + 1).copied()
    }

    pub fn previous(self) -> Option<OnboardingStep> {
        let i = Self::ALL.iter().position(|s| *s == self)?;
        i.checked_sub(1).and_then(|p| Self::ALL.get(p).copied())
    }

    /// 1-based position, for "step 2 of 4".
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    pub pharmacy_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
}

impl Validate for BusinessDetails {
    fn validate(&self) -> DomainResult<()> {
        require_text("pharmacy name", &self.pharmacy_name)?;
        require_text("owner name", &self.owner_name)?;
        require_text("phone", &self.phone)?;
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(DomainError::validation(format!("{email:?} is not an email address"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDetails {
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub pharmacist_in_charge: String,
}

impl LicenseDetails {
    fn validate_on(&self, today: NaiveDate) -> DomainResult<()> {
        require_text("license number", &self.license_number)?;
        require_text("pharmacist in charge", &self.pharmacist_in_charge)?;
        match self.license_expiry {
            None => Err(DomainError::validation("license expiry is required")),
            Some(expiry) if expiry <= today => {
                Err(DomainError::validation(format!("license expired on {expiry}")))
            }
            Some(_) => Ok(()),
        }
    }
}

impl Validate for LicenseDetails {
    fn validate(&self) -> DomainResult<()> {
        self.validate_on(chrono::Utc::now().date_naive())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// 0 means pickup only.
    pub delivery_radius_km: u32,
}

impl Validate for LocationDetails {
    fn validate(&self) -> DomainResult<()> {
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        if self.delivery_radius_km > 100 {
            return Err(DomainError::validation("delivery radius cannot exceed 100 km"));
        }
        Ok(())
    }
}

/// Everything the service needs to register a pharmacy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyApplication {
    pub business: BusinessDetails,
    pub license: LicenseDetails,
    pub location: LocationDetails,
}

impl PharmacyApplication {
    fn validate_step(&self, step: OnboardingStep) -> DomainResult<()> {
        match step {
            OnboardingStep::Business => self.business.validate(),
            OnboardingStep::License => self.license.validate(),
            OnboardingStep::Location => self.location.validate(),
            OnboardingStep::Review => self.validate(),
        }
    }
}

impl Validate for PharmacyApplication {
    fn validate(&self) -> DomainResult<()> {
        self.business.validate()?;
        self.license.validate()?;
        self.location.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Editing { error: Option<DispatchError> },
    Submitting,
    Finished(PharmacyId),
}

#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    application: PharmacyApplication,
    phase: Phase,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::default(),
            application: PharmacyApplication::default(),
            phase: Phase::Editing { error: None },
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn application(&self) -> &PharmacyApplication {
        &self.application
    }

    /// Editable unless a submit is in flight or the wizard finished.
    pub fn application_mut(&mut self) -> Option<&mut PharmacyApplication> {
        match self.phase {
            Phase::Editing { .. } => Some(&mut self.application),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match &self.phase {
            Phase::Editing { error } => error.as_ref(),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Id issued by the service once registration succeeded.
    pub fn registered(&self) -> Option<PharmacyId> {
        match self.phase {
            Phase::Finished(id) => Some(id),
            _ => None,
        }
    }

    fn ensure_editing(&self) -> Result<(), DispatchError> {
        match self.phase {
            Phase::Editing { .. } => Ok(()),
            Phase::Submitting => Err(DispatchError::AlreadySubmitting),
            Phase::Finished(_) => Err(DispatchError::NotOpen),
        }
    }

    /// Validate the current step and advance.
    pub fn next(&mut self) -> Result<OnboardingStep, DispatchError> {
        self.ensure_editing()?;
        if let Err(err) = self.application.validate_step(self.step) {
            let err = DispatchError::Validation(err);
            self.phase = Phase::Editing {
                error: Some(err.clone()),
            };
            return Err(err);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        self.phase = Phase::Editing { error: None };
        Ok(self.step)
    }

    /// Go back one step. Never validates.
    pub fn back(&mut self) -> Result<OnboardingStep, DispatchError> {
        self.ensure_editing()?;
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        Ok(self.step)
    }

    /// Review -> submitting, returning the application to send.
    pub fn begin_submit(&mut self) -> Result<PharmacyApplication, DispatchError> {
        self.ensure_editing()?;
        if self.step != OnboardingStep::Review {
            return Err(DispatchError::Validation(DomainError::validation(format!(
                "cannot submit from the {} step",
                self.step
            ))));
        }
        if let Err(err) = self.application.validate() {
            let err = DispatchError::Validation(err);
            self.phase = Phase::Editing {
                error: Some(err.clone()),
            };
            return Err(err);
        }
        self.phase = Phase::Submitting;
        Ok(self.application.clone())
    }

    pub fn finish_submit(
        &mut self,
        result: Result<PharmacyId, DispatchError>,
    ) -> Result<PharmacyId, DispatchError> {
        if !self.is_submitting() {
            tracing::debug!("registration result arrived for a wizard that is not submitting");
            return result;
        }
        self.phase = match &result {
            Ok(id) => {
                tracing::info!(pharmacy_id = %id, "pharmacy registered");
                Phase::Finished(*id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "pharmacy registration failed");
                Phase::Editing {
                    error: Some(err.clone()),
                }
            }
        };
        result
    }

    pub async fn submit<S>(&mut self, service: &S) -> Result<PharmacyId, DispatchError>
    where
        S: OnboardingService + ?Sized,
    {
        let application = self.begin_submit()?;
        let result = service
            .register_pharmacy(&application)
            .await
            .map_err(DispatchError::Service);
        self.finish_submit(result)
    }
}
