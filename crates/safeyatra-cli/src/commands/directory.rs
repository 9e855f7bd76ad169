use chrono::Utc;
use clap::{Args, Subcommand};
use safeyatra_core::directory::{
    format_time_ago, nearby_facilities, police_stations, region_briefing, safety_news,
    FacilityKind, NewsCategory, NewsFilter, Severity, QUICK_MESSAGES,
};
use serde_json::json;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum DirectoryAction {
    /// Nearby facilities, nearest first
    Facilities {
        /// police, hospital or safe (all kinds when omitted)
        #[arg(long)]
        kind: Option<FacilityKind>,
    },
    /// Police stations available for chat
    Stations,
    /// One-tap chat messages
    QuickMessages,
    /// Weather and safety alerts for a region
    Briefing {
        region: String,
    },
}

#[derive(Args)]
pub struct NewsArgs {
    /// Security, Weather, Health or Travel ("all" for every category)
    #[arg(long, default_value = "all")]
    category: String,
    /// low, medium or high ("all" for every severity)
    #[arg(long, default_value = "all")]
    severity: String,
}

pub fn run(action: DirectoryAction) -> CliResult {
    match action {
        DirectoryAction::Facilities { kind } => {
            let kinds = kind.map_or_else(|| FacilityKind::ALL.to_vec(), |k| vec![k]);
            let facilities: Vec<_> = kinds
                .into_iter()
                .flat_map(nearby_facilities)
                .map(|f| {
                    json!({
                        "kind": f.kind,
                        "name": f.name,
                        "address": f.address,
                        "phone": f.phone,
                        "distance_km": f.distance_km,
                        "call": f.tel_uri().map(|u| u.to_string()),
                        "directions": f.directions_url().map(|u| u.to_string()),
                    })
                })
                .collect();
            print_json(&facilities)
        }
        DirectoryAction::Stations => print_json(&police_stations()),
        DirectoryAction::QuickMessages => {
            for (i, message) in QUICK_MESSAGES.iter().enumerate() {
                println!("{}. {message}", i + 1);
            }
            Ok(())
        }
        DirectoryAction::Briefing { region } => print_json(&region_briefing(&region)),
    }
}

fn parse_filter<T: std::str::FromStr<Err = String>>(value: &str) -> Result<Option<T>, String> {
    if value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

pub fn news(args: NewsArgs) -> CliResult {
    let filter = NewsFilter {
        category: parse_filter::<NewsCategory>(&args.category)?,
        severity: parse_filter::<Severity>(&args.severity)?,
    };
    let now = Utc::now();
    let feed = safety_news();
    let items: Vec<_> = filter
        .apply(&feed)
        .into_iter()
        .map(|n| {
            json!({
                "id": n.id,
                "category": n.category,
                "severity": n.severity,
                "title": n.title,
                "content": n.content,
                "source": n.source,
                "region": n.region,
                "published": format_time_ago(n.timestamp, now),
            })
        })
        .collect();
    print_json(&items)
}
