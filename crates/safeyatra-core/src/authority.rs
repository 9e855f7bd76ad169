//! Authority dashboard: tourist monitoring, emergency alerts, device
//! battery status and active chat sessions.
//!
//! Data is static. Every status maps to a [`StatusTone`] for display.

use serde::{Deserialize, Serialize};

use crate::profile::SubjectId;

/// Display tone of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitoringStatus {
    Safe,
    Alert,
    Emergency,
}

impl MonitoringStatus {
    pub fn tone(self) -> StatusTone {
        match self {
            MonitoringStatus::Safe => StatusTone::Success,
            MonitoringStatus::Alert => StatusTone::Warning,
            MonitoringStatus::Emergency => StatusTone::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredTourist {
    pub id: SubjectId,
    pub name: String,
    pub status: MonitoringStatus,
    pub last_check_in: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Medium,
    High,
}

impl AlertPriority {
    pub fn tone(self) -> StatusTone {
        match self {
            AlertPriority::High => StatusTone::Error,
            AlertPriority::Medium => StatusTone::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityAlert {
    pub id: String,
    pub tourist: String,
    pub kind: String,
    pub time: String,
    pub priority: AlertPriority,
}

/// Battery bucket: high above 50%, medium above 25%, otherwise low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryLevel {
    High,
    Medium,
    Low,
}

impl BatteryLevel {
    pub fn classify(percent: u8) -> Self {
        if percent > 50 {
            BatteryLevel::High
        } else if percent > 25 {
            BatteryLevel::Medium
        } else {
            BatteryLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub id: SubjectId,
    pub name: String,
    pub battery: u8,
    pub device: String,
    pub browser: String,
    pub last_seen: String,
}

impl DeviceStatus {
    pub fn battery_level(&self) -> BatteryLevel {
        BatteryLevel::classify(self.battery)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatSessionStatus {
    Active,
    Pending,
    Resolved,
}

impl ChatSessionStatus {
    pub fn tone(self) -> StatusTone {
        match self {
            ChatSessionStatus::Active => StatusTone::Success,
            ChatSessionStatus::Pending => StatusTone::Warning,
            ChatSessionStatus::Resolved => StatusTone::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub user: String,
    pub station: String,
    pub status: ChatSessionStatus,
    pub last_message: String,
}

pub fn monitored_tourists() -> Vec<MonitoredTourist> {
    let tourist = |id: &str, name: &str, status, last: &str, location: &str| MonitoredTourist {
        id: SubjectId::from(id),
        name: name.to_string(),
        status,
        last_check_in: last.to_string(),
        location: location.to_string(),
    };
    vec![
        tourist("TOUR-7834", "John Smith", MonitoringStatus::Safe, "2 mins ago", "India Gate"),
        tourist("TOUR-9156", "Emma Johnson", MonitoringStatus::Alert, "15 mins ago", "Red Fort"),
        tourist("TOUR-3421", "Michael Brown", MonitoringStatus::Safe, "1 min ago", "Connaught Place"),
        tourist("TOUR-5678", "Sarah Davis", MonitoringStatus::Emergency, "5 mins ago", "Karol Bagh"),
    ]
}

pub fn authority_alerts() -> Vec<AuthorityAlert> {
    let alert = |id: &str, tourist: &str, kind: &str, time: &str, priority| AuthorityAlert {
        id: id.to_string(),
        tourist: tourist.to_string(),
        kind: kind.to_string(),
        time: time.to_string(),
        priority,
    };
    vec![
        alert("ALERT-001", "Sarah Davis (TOUR-5678)", "No Response", "5 mins ago", AlertPriority::High),
        alert("ALERT-002", "Emma Johnson (TOUR-9156)", "Low Battery", "15 mins ago", AlertPriority::Medium),
        alert("ALERT-003", "Alex Wilson (TOUR-4567)", "Geo-fence Breach", "1 hour ago", AlertPriority::High),
    ]
}

pub fn device_statuses() -> Vec<DeviceStatus> {
    let device = |id: &str, name: &str, battery, model: &str, browser: &str, seen: &str| DeviceStatus {
        id: SubjectId::from(id),
        name: name.to_string(),
        battery,
        device: model.to_string(),
        browser: browser.to_string(),
        last_seen: seen.to_string(),
    };
    vec![
        device("TOUR-7834", "John Smith", 85, "iPhone 14", "Safari", "2 mins ago"),
        device("TOUR-9156", "Emma Johnson", 23, "Samsung Galaxy", "Chrome", "5 mins ago"),
        device("TOUR-3421", "Michael Brown", 67, "OnePlus 11", "Chrome", "1 min ago"),
        device("TOUR-5678", "Sarah Davis", 12, "iPhone 13", "Safari", "15 mins ago"),
    ]
}

pub fn chat_sessions() -> Vec<ChatSession> {
    let session = |id: &str, user: &str, station: &str, status, last: &str| ChatSession {
        id: id.to_string(),
        user: user.to_string(),
        station: station.to_string(),
        status,
        last_message: last.to_string(),
    };
    vec![
        session("CHAT-001", "John Smith", "Central Police", ChatSessionStatus::Active, "2 mins ago"),
        session("CHAT-002", "Emma Johnson", "Tourist Police", ChatSessionStatus::Pending, "5 mins ago"),
        session("CHAT-003", "Michael Brown", "Cyber Crime", ChatSessionStatus::Resolved, "1 hour ago"),
    ]
}

/// Headline counts for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySummary {
    pub tourists: usize,
    pub in_emergency: usize,
    pub high_priority_alerts: usize,
    pub low_battery_devices: usize,
    pub active_chats: usize,
}

pub fn summary() -> AuthoritySummary {
    let tourists = monitored_tourists();
    AuthoritySummary {
        tourists: tourists.len(),
        in_emergency: tourists
            .iter()
            .filter(|t| t.status == MonitoringStatus::Emergency)
            .count(),
        high_priority_alerts: authority_alerts()
            .iter()
            .filter(|a| a.priority == AlertPriority::High)
            .count(),
        low_battery_devices: device_statuses()
            .iter()
            .filter(|d| d.battery_level() == BatteryLevel::Low)
            .count(),
        active_chats: chat_sessions()
            .iter()
            .filter(|s| s.status == ChatSessionStatus::Active)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_thresholds() {
        assert_eq!(BatteryLevel::classify(51), BatteryLevel::High);
        assert_eq!(BatteryLevel::classify(50), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::classify(26), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::classify(25), BatteryLevel::Low);
        assert_eq!(BatteryLevel::classify(0), BatteryLevel::Low);
    }

    #[test]
    fn status_tones() {
        assert_eq!(MonitoringStatus::Alert.tone(), StatusTone::Warning);
        assert_eq!(MonitoringStatus::Emergency.tone(), StatusTone::Error);
        assert_eq!(AlertPriority::High.tone(), StatusTone::Error);
        assert_eq!(ChatSessionStatus::Resolved.tone(), StatusTone::Info);
    }

    #[test]
    fn summary_counts() {
        assert_eq!(
            summary(),
            AuthoritySummary {
                tourists: 4,
                in_emergency: 1,
                high_priority_alerts: 2,
                low_battery_devices: 2,
                active_chats: 1,
            }
        );
    }

    #[test]
    fn device_levels_match_fixture() {
        let levels: Vec<_> = device_statuses().iter().map(DeviceStatus::battery_level).collect();
        assert_eq!(
            levels,
            vec![
                BatteryLevel::High,
                BatteryLevel::Low,
                BatteryLevel::High,
                BatteryLevel::Low
            ]
        );
    }
}
