//! Static safety directory: nearby facilities, police stations that accept
//! chat, quick-message templates, the safety news feed and region briefings.

pub mod briefing;
pub mod news;

pub use briefing::{region_briefing, RegionBriefing, KNOWN_REGIONS};
pub use news::{format_time_ago, safety_news, NewsCategory, NewsFilter, NewsItem, Severity};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Kind of facility listed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Police,
    Hospital,
    SafePlace,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 3] = [
        FacilityKind::Police,
        FacilityKind::Hospital,
        FacilityKind::SafePlace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FacilityKind::Police => "Police Stations",
            FacilityKind::Hospital => "Hospitals",
            FacilityKind::SafePlace => "Safe Places",
        }
    }
}

impl FromStr for FacilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "police" => Ok(FacilityKind::Police),
            "hospital" | "hospitals" => Ok(FacilityKind::Hospital),
            "safe" | "safe_place" | "safe-place" | "safe_places" => Ok(FacilityKind::SafePlace),
            other => Err(format!("unknown facility kind: {other}")),
        }
    }
}

/// A facility near the tourist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub kind: FacilityKind,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub distance_km: f64,
}

impl Facility {
    fn new(kind: FacilityKind, name: &str, address: &str, phone: &str, distance_km: f64) -> Self {
        Self {
            kind,
            name: name.to_string(),
            address: address.to_string(),
            phone: phone.to_string(),
            distance_km,
        }
    }

    /// `tel:` link for the call button.
    pub fn tel_uri(&self) -> Option<Url> {
        Url::parse(&format!("tel:{}", self.phone)).ok()
    }

    /// Map search link for the directions button.
    pub fn directions_url(&self) -> Option<Url> {
        Url::parse_with_params("https://maps.google.com/", &[("q", self.address.as_str())]).ok()
    }
}

/// Facilities of one kind, nearest first.
pub fn nearby_facilities(kind: FacilityKind) -> Vec<Facility> {
    use FacilityKind::*;
    let mut facilities = match kind {
        Police => vec![
            Facility::new(Police, "Central Police Station", "MG Road, Delhi", "+91-11-2334-5678", 0.5),
            Facility::new(Police, "Tourist Police Booth", "India Gate, Delhi", "+91-11-2334-9876", 1.2),
            Facility::new(Police, "Cyber Crime Police", "CP Metro, Delhi", "+91-11-2334-1111", 2.1),
        ],
        Hospital => vec![
            Facility::new(Hospital, "AIIMS Emergency", "Ansari Nagar, Delhi", "+91-11-2658-8500", 1.8),
            Facility::new(Hospital, "Max Hospital", "Saket, Delhi", "+91-11-2651-5050", 3.2),
            Facility::new(Hospital, "Apollo Hospital", "Mathura Road, Delhi", "+91-11-2692-5858", 4.1),
        ],
        SafePlace => vec![
            Facility::new(SafePlace, "US Embassy", "Chanakyapuri, Delhi", "+91-11-2419-8000", 2.5),
            Facility::new(SafePlace, "Tourist Help Center", "Janpath, Delhi", "+91-11-2332-0005", 0.8),
            Facility::new(SafePlace, "Railway Police Station", "New Delhi Station", "+91-11-2340-3456", 1.5),
        ],
    };
    facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    facilities
}

/// Whether a station is staffed for chat right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Online,
    Offline,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationStatus::Online => f.write_str("online"),
            StationStatus::Offline => f.write_str("offline"),
        }
    }
}

/// A police station reachable through chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliceStation {
    pub id: String,
    pub name: String,
    pub status: StationStatus,
    /// Typical response time; `None` while offline.
    pub response_time: Option<String>,
}

impl PoliceStation {
    /// Response time as shown in the station list.
    pub fn response_label(&self) -> &str {
        self.response_time.as_deref().unwrap_or("N/A")
    }
}

pub fn police_stations() -> Vec<PoliceStation> {
    let station = |id: &str, name: &str, status, response: Option<&str>| PoliceStation {
        id: id.to_string(),
        name: name.to_string(),
        status,
        response_time: response.map(str::to_string),
    };
    vec![
        station("ps1", "Central Police Station", StationStatus::Online, Some("< 5 mins")),
        station("ps2", "Tourist Police Booth", StationStatus::Online, Some("< 3 mins")),
        station("ps3", "Cyber Crime Police", StationStatus::Offline, None),
    ]
}

pub fn find_station(id: &str) -> Option<PoliceStation> {
    police_stations().into_iter().find(|s| s.id == id)
}

/// One-tap chat messages.
pub const QUICK_MESSAGES: [&str; 5] = [
    "I need immediate help",
    "Lost passport/documents",
    "Reporting suspicious activity",
    "Need directions to safe location",
    "Medical emergency assistance",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facilities_are_sorted_by_distance() {
        let safe = nearby_facilities(FacilityKind::SafePlace);
        assert_eq!(safe.len(), 3);
        assert_eq!(safe[0].name, "Tourist Help Center");
        assert!(safe.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(safe.iter().all(|f| f.kind == FacilityKind::SafePlace));
    }

    #[test]
    fn facility_links() {
        let hospital = &nearby_facilities(FacilityKind::Hospital)[0];
        assert_eq!(hospital.tel_uri().unwrap().as_str(), "tel:+91-11-2658-8500");
        let directions = hospital.directions_url().unwrap();
        assert_eq!(directions.host_str(), Some("maps.google.com"));
        let q: Vec<_> = directions.query_pairs().collect();
        assert_eq!(q[0].1, "Ansari Nagar, Delhi");
    }

    #[test]
    fn facility_kind_parses_cli_spellings() {
        assert_eq!("police".parse::<FacilityKind>(), Ok(FacilityKind::Police));
        assert_eq!("Hospitals".parse::<FacilityKind>(), Ok(FacilityKind::Hospital));
        assert_eq!("safe-place".parse::<FacilityKind>(), Ok(FacilityKind::SafePlace));
        assert!("embassy".parse::<FacilityKind>().is_err());
    }

    #[test]
    fn offline_station_has_no_response_time() {
        let cyber = find_station("ps3").unwrap();
        assert_eq!(cyber.status, StationStatus::Offline);
        assert_eq!(cyber.response_label(), "N/A");
        assert_eq!(find_station("ps2").unwrap().response_label(), "< 3 mins");
        assert!(find_station("ps9").is_none());
    }
}
