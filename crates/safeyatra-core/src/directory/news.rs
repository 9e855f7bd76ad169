//! Safety news feed with category/severity filtering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NewsCategory {
    Security,
    Weather,
    Health,
    Travel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NewsCategory::Security => "Security",
            NewsCategory::Weather => "Weather",
            NewsCategory::Health => "Health",
            NewsCategory::Travel => "Travel",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "security" => Ok(NewsCategory::Security),
            "weather" => Ok(NewsCategory::Weather),
            "health" => Ok(NewsCategory::Health),
            "travel" => Ok(NewsCategory::Travel),
            other => Err(format!("unknown news category: {other}")),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub category: NewsCategory,
    pub severity: Severity,
    pub title: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub region: String,
}

/// `None` on either axis means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsFilter {
    pub category: Option<NewsCategory>,
    pub severity: Option<Severity>,
}

impl NewsFilter {
    pub fn matches(&self, item: &NewsItem) -> bool {
        self.category.map_or(true, |c| item.category == c)
            && self.severity.map_or(true, |s| item.severity == s)
    }

    pub fn apply<'a>(&self, items: &'a [NewsItem]) -> Vec<&'a NewsItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

fn published(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 14, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn safety_news() -> Vec<NewsItem> {
    let item = |id: &str,
                category,
                severity,
                title: &str,
                content: &str,
                timestamp,
                source: &str| NewsItem {
        id: id.to_string(),
        category,
        severity,
        title: title.to_string(),
        content: content.to_string(),
        timestamp,
        source: source.to_string(),
        region: "Delhi NCR".to_string(),
    };
    vec![
        item(
            "news1",
            NewsCategory::Security,
            Severity::High,
            "Increased Security at Tourist Sites",
            "Enhanced security measures implemented at major tourist locations due to festival season.",
            published(10, 30),
            "Delhi Police",
        ),
        item(
            "news2",
            NewsCategory::Weather,
            Severity::Medium,
            "Monsoon Alert",
            "Heavy rainfall expected in Delhi NCR. Avoid low-lying areas and use public transport.",
            published(8, 15),
            "IMD",
        ),
        item(
            "news3",
            NewsCategory::Health,
            Severity::Low,
            "Air Quality Advisory",
            "Air quality moderate. People with respiratory issues should take precautions.",
            published(6, 0),
            "CPCB",
        ),
        item(
            "news4",
            NewsCategory::Travel,
            Severity::Medium,
            "Metro Service Update",
            "Blue Line metro services running with 10-minute delays due to technical maintenance.",
            published(7, 45),
            "Delhi Metro",
        ),
    ]
}

/// `N mins ago` under an hour, `N hours ago` under a day, else `N days ago`.
/// Future timestamps read as `0 mins ago`.
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes} mins ago")
    } else if minutes < 24 * 60 {
        format!("{} hours ago", minutes / 60)
    } else {
        format!("{} days ago", minutes / (24 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn filter_by_category_and_severity() {
        let news = safety_news();
        assert_eq!(NewsFilter::default().apply(&news).len(), 4);

        let medium = NewsFilter {
            severity: Some(Severity::Medium),
            ..NewsFilter::default()
        };
        let ids: Vec<_> = medium.apply(&news).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["news2", "news4"]);

        let both = NewsFilter {
            category: Some(NewsCategory::Weather),
            severity: Some(Severity::High),
        };
        assert!(both.apply(&news).is_empty());
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::minutes(59), now), "59 mins ago");
        assert_eq!(format_time_ago(now - Duration::minutes(60), now), "1 hours ago");
        assert_eq!(format_time_ago(now - Duration::minutes(1439), now), "23 hours ago");
        assert_eq!(format_time_ago(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_time_ago(now + Duration::minutes(5), now), "0 mins ago");
    }

    #[test]
    fn parse_filters_case_insensitively() {
        assert_eq!("WEATHER".parse::<NewsCategory>(), Ok(NewsCategory::Weather));
        assert_eq!("high".parse::<Severity>(), Ok(Severity::High));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn feed_timestamps_are_fixed() {
        let news = safety_news();
        assert_eq!(news[0].timestamp.to_rfc3339(), "2025-09-14T10:30:00+00:00");
    }
}
