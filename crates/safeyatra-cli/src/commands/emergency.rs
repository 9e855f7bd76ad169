use std::sync::Arc;

use clap::Args;
use safeyatra_core::{CheckInService, Config, InMemoryProfileStore, SosDialer};

use super::{demo_profile, print_json, CliResult};

#[derive(Args)]
pub struct PanicArgs {
    /// Confirm the alert (required unless disabled in config)
    #[arg(long, short = 'y')]
    yes: bool,
    /// Tourist id to use
    #[arg(long)]
    tourist: Option<String>,
}

#[derive(Args)]
pub struct SosArgs {
    /// Print the call URI without opening it
    #[arg(long)]
    dry_run: bool,
    /// Override the configured emergency number
    #[arg(long)]
    number: Option<String>,
}

pub fn panic(args: PanicArgs) -> CliResult {
    let config = Config::load_or_default();
    let profile = demo_profile(args.tourist.as_deref())?;
    let subject = profile.tourist_id.clone();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.insert(profile);

    let mut service = CheckInService::from_config(&config, profiles);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match runtime.block_on(service.trigger_panic(&subject, args.yes)) {
        Some(emergency) => print_json(&emergency),
        None => Err("panic alert not sent: pass --yes to confirm".into()),
    }
}

pub fn sos(args: SosArgs) -> CliResult {
    let config = Config::load_or_default();
    let number = args.number.unwrap_or(config.emergency.sos_number);
    let dialer = SosDialer::new(number);
    let uri = if args.dry_run {
        dialer.uri()?
    } else {
        dialer.dial()?
    };
    println!("{uri}");
    Ok(())
}
