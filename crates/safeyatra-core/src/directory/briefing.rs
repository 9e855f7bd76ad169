//! Weather and safety-alert briefing shown after picking a travel region.

use serde::{Deserialize, Serialize};

/// Regions offered by the registration form.
pub const KNOWN_REGIONS: [&str; 4] = ["Delhi NCR", "Mumbai", "Bangalore", "Chennai"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBriefing {
    pub region: String,
    pub weather: Vec<String>,
    pub alerts: Vec<String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn weather_for(region: &str) -> Vec<String> {
    match region {
        "Delhi NCR" => lines(&["Partly cloudy, 28°C", "Humidity: 65%", "Air Quality: Moderate"]),
        "Mumbai" => lines(&["Light rain, 26°C", "Humidity: 80%", "Air Quality: Good"]),
        "Bangalore" => lines(&["Cloudy, 24°C", "Humidity: 70%", "Air Quality: Good"]),
        "Chennai" => lines(&["Sunny, 32°C", "Humidity: 75%", "Air Quality: Moderate"]),
        _ => lines(&["Pleasant weather, 25°C", "Humidity: 60%", "Air Quality: Good"]),
    }
}

fn alerts_for(region: &str) -> Vec<String> {
    match region {
        "Delhi NCR" => lines(&[
            "High security at metro stations",
            "Traffic diversions on MG Road",
            "Medical camps available",
        ]),
        "Mumbai" => lines(&[
            "High tide warning at beaches",
            "Local train delays expected",
            "Monsoon safety advisory",
        ]),
        "Bangalore" => lines(&[
            "Heavy traffic on Outer Ring Road",
            "Heat wave advisory",
            "Stay hydrated",
        ]),
        _ => lines(&[
            "No major alerts",
            "Normal security levels",
            "Emergency services active",
        ]),
    }
}

/// Briefing for `region`. Unlisted regions get a generic one.
pub fn region_briefing(region: &str) -> RegionBriefing {
    let region = region.trim();
    RegionBriefing {
        region: region.to_string(),
        weather: weather_for(region),
        alerts: alerts_for(region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_region_has_specific_lines() {
        let b = region_briefing("Mumbai");
        assert_eq!(b.weather[0], "Light rain, 26°C");
        assert_eq!(b.alerts[0], "High tide warning at beaches");
    }

    #[test]
    fn chennai_has_weather_but_generic_alerts() {
        let b = region_briefing("Chennai");
        assert_eq!(b.weather[0], "Sunny, 32°C");
        assert_eq!(b.alerts[0], "No major alerts");
    }

    #[test]
    fn unknown_region_falls_back() {
        let b = region_briefing("  Goa ");
        assert_eq!(b.region, "Goa");
        assert_eq!(b.weather[0], "Pleasant weather, 25°C");
        assert_eq!(b.alerts.len(), 3);
    }
}
