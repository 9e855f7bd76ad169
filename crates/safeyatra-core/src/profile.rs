//! Tourist profiles and the read-only store the check-in engine consults
//! when it has to build an emergency record.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a tracked person (`TOUR-1234` for registered tourists).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a tourist id in the `TOUR-NNNN` range (1000..=9999).
    pub fn generate() -> Self {
        let n: u16 = rand::thread_rng().gen_range(1000..=9999);
        Self(format!("TOUR-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Where the subject was last known to be.
///
/// A profile carries coordinates (location access granted) or a free-text
/// travel region (access denied), never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LastKnownLocation {
    Coordinates { lat: f64, lng: f64 },
    Region { name: String },
    #[default]
    Unknown,
}

impl LastKnownLocation {
    pub fn region(name: impl Into<String>) -> Self {
        LastKnownLocation::Region { name: name.into() }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LastKnownLocation::Unknown)
    }
}

impl fmt::Display for LastKnownLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastKnownLocation::Coordinates { lat, lng } => write!(f, "{lat:.5},{lng:.5}"),
            LastKnownLocation::Region { name } => f.write_str(name),
            LastKnownLocation::Unknown => f.write_str("unknown"),
        }
    }
}

/// Person to call on the tourist's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

impl fmt::Display for EmergencyContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.phone)
    }
}

/// Everything the registration wizard captured about a tourist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouristProfile {
    pub tourist_id: SubjectId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub nationality: String,
    #[serde(default)]
    pub travel_purpose: Option<String>,
    #[serde(default)]
    pub stay_duration: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub id_type: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub location: LastKnownLocation,
    pub registered_at: DateTime<Utc>,
}

/// Read-only source of profile data.
pub trait ProfileStore: Send + Sync {
    /// Look up a profile. `None` when the subject never registered.
    fn profile(&self, subject: &SubjectId) -> Option<TouristProfile>;
}

/// Process-local profile store. Nothing is written to disk.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<SubjectId, TouristProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile, keyed by its tourist id.
    pub fn insert(&self, profile: TouristProfile) {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        profiles.insert(profile.tourist_id.clone(), profile);
    }

    /// Record a fresher location. Returns `false` for unknown subjects.
    pub fn update_location(&self, subject: &SubjectId, location: LastKnownLocation) -> bool {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        match profiles.get_mut(subject) {
            Some(profile) => {
                profile.location = location;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn profile(&self, subject: &SubjectId) -> Option<TouristProfile> {
        self.profiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(subject)
            .cloned()
    }
}

#[cfg(test)]
pub(crate) fn sample_profile(id: &str) -> TouristProfile {
    TouristProfile {
        tourist_id: SubjectId::new(id),
        full_name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        phone: "+91-98100-00000".into(),
        nationality: "Indian".into(),
        travel_purpose: Some("Leisure".into()),
        stay_duration: Some("7 days".into()),
        blood_group: Some("O+".into()),
        emergency_contact: Some(EmergencyContact {
            name: "Ravi Rao".into(),
            phone: "+91-98100-11111".into(),
        }),
        medical_conditions: Some("Asthma".into()),
        allergies: None,
        medications: None,
        id_type: Some("Passport".into()),
        id_number: Some("Z1234567".into()),
        location: LastKnownLocation::region("Delhi NCR"),
        registered_at: Utc::now(),
    }
}
