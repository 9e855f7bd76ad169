use clap::Subcommand;
use safeyatra_core::authority::{
    authority_alerts, chat_sessions, device_statuses, monitored_tourists, summary,
};
use serde_json::json;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum AuthorityAction {
    /// Monitored tourists with their status
    Tourists,
    /// Emergency alerts by priority
    Alerts,
    /// Device battery levels
    Devices,
    /// Police chat sessions
    Chats,
    /// Headline counts
    Summary,
}

pub fn run(action: AuthorityAction) -> CliResult {
    match action {
        AuthorityAction::Tourists => {
            let rows: Vec<_> = monitored_tourists()
                .into_iter()
                .map(|t| json!({ "tone": t.status.tone(), "tourist": t }))
                .collect();
            print_json(&rows)
        }
        AuthorityAction::Alerts => {
            let rows: Vec<_> = authority_alerts()
                .into_iter()
                .map(|a| json!({ "tone": a.priority.tone(), "alert": a }))
                .collect();
            print_json(&rows)
        }
        AuthorityAction::Devices => {
            let rows: Vec<_> = device_statuses()
                .into_iter()
                .map(|d| json!({ "battery_level": d.battery_level(), "device": d }))
                .collect();
            print_json(&rows)
        }
        AuthorityAction::Chats => {
            let rows: Vec<_> = chat_sessions()
                .into_iter()
                .map(|s| json!({ "tone": s.status.tone(), "session": s }))
                .collect();
            print_json(&rows)
        }
        AuthorityAction::Summary => print_json(&summary()),
    }
}
