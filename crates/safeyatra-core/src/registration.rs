//! Four-step tourist registration wizard.
//!
//! Steps:
//! 1. Personal details
//! 2. Location access or travel region (plus travel purpose and stay)
//! 3. Medical and emergency contact
//! 4. Identity document
//!
//! [`RegistrationWizard::next`] validates the current step before advancing;
//! [`RegistrationWizard::complete`] validates every step and produces a
//! [`TouristProfile`] with a freshly generated tourist id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{region_briefing, RegionBriefing};
use crate::error::ValidationError;
use crate::profile::{EmergencyContact, LastKnownLocation, SubjectId, TouristProfile};

/// Wizard step, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    Personal,
    Location,
    Medical,
    Identity,
}

impl RegistrationStep {
    pub const ALL: [RegistrationStep; 4] = [
        RegistrationStep::Personal,
        RegistrationStep::Location,
        RegistrationStep::Medical,
        RegistrationStep::Identity,
    ];

    pub fn number(self) -> u8 {
        match self {
            RegistrationStep::Personal => 1,
            RegistrationStep::Location => 2,
            RegistrationStep::Medical => 3,
            RegistrationStep::Identity => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            RegistrationStep::Personal => Some(RegistrationStep::Location),
            RegistrationStep::Location => Some(RegistrationStep::Medical),
            RegistrationStep::Medical => Some(RegistrationStep::Identity),
            RegistrationStep::Identity => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            RegistrationStep::Personal => None,
            RegistrationStep::Location => Some(RegistrationStep::Personal),
            RegistrationStep::Medical => Some(RegistrationStep::Location),
            RegistrationStep::Identity => Some(RegistrationStep::Medical),
        }
    }
}

/// The tourist's answer to the location prompt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LocationDecision {
    #[default]
    Undecided,
    Granted { lat: f64, lng: f64 },
    /// Access denied (or geolocation failed); a region must be chosen.
    Denied,
}

/// Raw form input. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub nationality: String,
    pub travel_purpose: String,
    pub stay_duration: String,
    pub blood_group: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub medical_conditions: String,
    pub allergies: String,
    pub medications: String,
    pub id_type: String,
    pub id_number: String,
}

impl RegistrationForm {
    /// Required fields for `step`, by name.
    fn required(&self, step: RegistrationStep) -> Vec<(&'static str, &str)> {
        match step {
            RegistrationStep::Personal => vec![
                ("full_name", self.full_name.as_str()),
                ("email", self.email.as_str()),
                ("phone", self.phone.as_str()),
                ("nationality", self.nationality.as_str()),
            ],
            RegistrationStep::Location => Vec::new(),
            RegistrationStep::Medical => vec![
                ("blood_group", self.blood_group.as_str()),
                ("emergency_contact_name", self.emergency_contact_name.as_str()),
                ("emergency_contact_phone", self.emergency_contact_phone.as_str()),
            ],
            RegistrationStep::Identity => vec![
                ("id_type", self.id_type.as_str()),
                ("id_number", self.id_number.as_str()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationWizard {
    step: RegistrationStep,
    form: RegistrationForm,
    location: LocationDecision,
    region: Option<String>,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self {
            step: RegistrationStep::Personal,
            form: RegistrationForm::default(),
            location: LocationDecision::Undecided,
            region: None,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    pub fn location(&self) -> &LocationDecision {
        &self.location
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Location access granted with a fix.
    pub fn allow_location(&mut self, lat: f64, lng: f64) {
        self.location = LocationDecision::Granted { lat, lng };
    }

    /// Access denied, or the platform could not produce a fix.
    pub fn deny_location(&mut self) {
        self.location = LocationDecision::Denied;
    }

    /// Record the travel region and return its briefing. Blank input clears it.
    pub fn select_region(&mut self, region: &str) -> Option<RegionBriefing> {
        let region = region.trim();
        if region.is_empty() {
            self.region = None;
            return None;
        }
        self.region = Some(region.to_string());
        Some(region_briefing(region))
    }

    /// Validate one step.
    ///
    /// # Errors
    /// The first missing field, or the location rule on step 2.
    pub fn validate_step(&self, step: RegistrationStep) -> Result<(), ValidationError> {
        if let Some((field, _)) = self
            .form
            .required(step)
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
        {
            return Err(ValidationError::MissingField {
                step: step.number(),
                field: field.to_string(),
            });
        }
        if step == RegistrationStep::Location {
            match self.location {
                LocationDecision::Undecided => return Err(ValidationError::LocationUndecided),
                LocationDecision::Denied if self.region.is_none() => {
                    return Err(ValidationError::RegionRequired)
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the current step and advance. Stays put on the last step.
    ///
    /// # Errors
    /// Returns the validation failure; the step does not change.
    pub fn next(&mut self) -> Result<RegistrationStep, ValidationError> {
        self.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step without validating.
    pub fn prev(&mut self) -> RegistrationStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Validate everything and build the profile.
    ///
    /// # Errors
    /// The first failing step's error.
    pub fn complete(&self, now: DateTime<Utc>) -> Result<TouristProfile, ValidationError> {
        for step in RegistrationStep::ALL {
            self.validate_step(step)?;
        }
        let form = &self.form;
        let location = match (&self.location, &self.region) {
            (LocationDecision::Granted { lat, lng }, _) => LastKnownLocation::Coordinates {
                lat: *lat,
                lng: *lng,
            },
            (_, Some(region)) => LastKnownLocation::region(region.clone()),
            _ => LastKnownLocation::Unknown,
        };
        let profile = TouristProfile {
            tourist_id: SubjectId::generate(),
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            nationality: form.nationality.trim().to_string(),
            travel_purpose: optional(&form.travel_purpose),
            stay_duration: optional(&form.stay_duration),
            blood_group: optional(&form.blood_group),
            emergency_contact: Some(EmergencyContact {
                name: form.emergency_contact_name.trim().to_string(),
                phone: form.emergency_contact_phone.trim().to_string(),
            }),
            medical_conditions: optional(&form.medical_conditions),
            allergies: optional(&form.allergies),
            medications: optional(&form.medications),
            id_type: optional(&form.id_type),
            id_number: optional(&form.id_number),
            location,
            registered_at: now,
        };
        tracing::info!(tourist = %profile.tourist_id, "registration completed");
        Ok(profile)
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
