//! Emergency records and the SOS side channel.
//!
//! An [`EmergencyEvent`] is built once, when a check-in escalates or a panic
//! is confirmed, and is never modified afterwards. Missing profile data never
//! blocks it: absent fields are carried as `None` and an unknown location as
//! [`LastKnownLocation::Unknown`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::profile::{LastKnownLocation, SubjectId, TouristProfile};

/// Why an emergency record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyTrigger {
    /// Check-in window elapsed with no answer.
    Timeout,
    /// Subject pressed "need help" on the check-in prompt.
    HelpRequested,
    /// Subject confirmed the panic button.
    Panic,
}

/// Profile fields responders need. Each may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmergencyProfile {
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_conditions: Option<String>,
}

impl EmergencyProfile {
    pub fn from_profile(profile: Option<&TouristProfile>) -> Self {
        match profile {
            Some(p) => Self {
                blood_group: non_blank(p.blood_group.as_deref()),
                emergency_contact: p
                    .emergency_contact
                    .as_ref()
                    .map(|c| c.phone.clone())
                    .filter(|s| !s.trim().is_empty()),
                medical_conditions: non_blank(p.medical_conditions.as_deref()),
            },
            None => Self::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.blood_group.is_some()
            && self.emergency_contact.is_some()
            && self.medical_conditions.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Immutable emergency record handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    id: Uuid,
    subject_id: SubjectId,
    trigger: EmergencyTrigger,
    location: LastKnownLocation,
    profile: EmergencyProfile,
    at: DateTime<Utc>,
}

impl EmergencyEvent {
    /// Snapshot the subject's profile into a new record.
    pub fn new(
        subject_id: SubjectId,
        trigger: EmergencyTrigger,
        profile: Option<&TouristProfile>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            trigger,
            location: profile.map(|p| p.location.clone()).unwrap_or_default(),
            profile: EmergencyProfile::from_profile(profile),
            at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn trigger(&self) -> EmergencyTrigger {
        self.trigger
    }

    pub fn location(&self) -> &LastKnownLocation {
        &self.location
    }

    pub fn profile(&self) -> &EmergencyProfile {
        &self.profile
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Outcome recorded for each concluded check-in or panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Safe,
    Emergency,
}

/// Safety response log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyResponse {
    pub subject_id: SubjectId,
    pub response: ResponseKind,
    pub at: DateTime<Utc>,
}

// ── SOS ──────────────────────────────────────────────────────────────

/// Something that can hand a `tel:` URI to the platform.
pub trait CallLauncher: Send + Sync {
    fn launch(&self, uri: &Url) -> std::io::Result<()>;
}

/// Uses the OS URL handler (`open` crate).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl CallLauncher for SystemLauncher {
    fn launch(&self, uri: &Url) -> std::io::Result<()> {
        open::that(uri.as_str())
    }
}

/// Direct call to a fixed emergency number. No check-in state is touched.
pub struct SosDialer<L: CallLauncher = SystemLauncher> {
    number: String,
    launcher: L,
}

impl SosDialer<SystemLauncher> {
    pub fn new(number: impl Into<String>) -> Self {
        Self::with_launcher(number, SystemLauncher)
    }
}

impl<L: CallLauncher> SosDialer<L> {
    pub fn with_launcher(number: impl Into<String>, launcher: L) -> Self {
        Self {
            number: number.into(),
            launcher,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// The `tel:` URI for the configured number.
    ///
    /// # Errors
    /// Returns [`DispatchError::InvalidNumber`] if the number is empty or
    /// contains anything besides digits, `+`, `-` and spaces.
    pub fn uri(&self) -> Result<Url, DispatchError> {
        let trimmed = self.number.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '));
        if !valid {
            return Err(DispatchError::InvalidNumber(self.number.clone()));
        }
        let compact: String = trimmed.chars().filter(|c| *c != ' ').collect();
        Url::parse(&format!("tel:{compact}"))
            .map_err(|_| DispatchError::InvalidNumber(self.number.clone()))
    }

    /// Start the call.
    ///
    /// # Errors
    /// Returns an error if the number is invalid or the platform refuses the URI.
    pub fn dial(&self) -> Result<Url, DispatchError> {
        let uri = self.uri()?;
        tracing::warn!(number = %self.number, "SOS call initiated");
        self.launcher
            .launch(&uri)
            .map_err(|source| DispatchError::DialFailed {
                uri: uri.to_string(),
                source,
            })?;
        Ok(uri)
    }
}
