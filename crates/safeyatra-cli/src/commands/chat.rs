use chrono::Utc;
use clap::Args;
use safeyatra_core::chat::PoliceChat;
use safeyatra_core::directory::{find_station, QUICK_MESSAGES};
use safeyatra_core::ChatError;

use super::{print_json, CliResult};

#[derive(Args)]
pub struct ChatArgs {
    /// Station id (see `directory stations`)
    #[arg(long)]
    station: Option<String>,
    /// Free-text message (repeatable)
    #[arg(long = "message", short = 'm')]
    messages: Vec<String>,
    /// Quick message number, 1-based (see `directory quick-messages`)
    #[arg(long)]
    quick: Option<usize>,
}

/// Prints the whole transcript as JSON.
pub fn run(args: ChatArgs) -> CliResult {
    let mut chat = PoliceChat::new();
    if let Some(id) = args.station.as_deref() {
        let station = find_station(id).ok_or_else(|| ChatError::UnknownStation(id.to_string()))?;
        chat.select_station(station, Utc::now());
    }

    let mut rng = rand::thread_rng();
    for message in &args.messages {
        chat.send(message, Utc::now(), &mut rng)?;
    }
    if let Some(n) = args.quick {
        let text = n
            .checked_sub(1)
            .and_then(|i| QUICK_MESSAGES.get(i))
            .ok_or_else(|| format!("quick message must be between 1 and {}", QUICK_MESSAGES.len()))?;
        chat.send_quick(text, Utc::now())?;
    }

    print_json(&chat)
}
