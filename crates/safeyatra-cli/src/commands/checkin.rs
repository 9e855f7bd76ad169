use std::sync::Arc;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use safeyatra_core::checkin::driver;
use safeyatra_core::notify::NotificationSink;
use safeyatra_core::{
    CheckInObserver, CheckInService, Config, EscalationPolicy, Event, InMemoryProfileStore,
    LogSink, NullSink, SubjectId, TokioClock,
};
use tokio::sync::Mutex;

use super::{demo_profile, CliResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Response {
    /// Press "I'm safe"
    Safe,
    /// Press "Need help"
    Help,
    /// Ignore the prompt and let it escalate
    None,
}

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Run one check-in cycle end to end and print its events as JSON lines
    Run {
        /// Scripted answer to the prompt
        #[arg(long, value_enum, default_value = "safe")]
        respond: Response,
        /// Seconds to wait before answering
        #[arg(long, default_value = "1")]
        respond_after: u64,
        /// Response window in seconds (defaults to config)
        #[arg(long)]
        window: Option<u64>,
        /// Delay before the first check-in in seconds
        #[arg(long, default_value = "0")]
        initial_delay: u64,
        /// Driver tick interval in milliseconds (defaults to config)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Tourist id to use
        #[arg(long)]
        tourist: Option<String>,
        /// Also print countdown ticks
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective check-in policy
    Policy,
}

/// Prints user-facing notices to stderr.
struct ConsoleObserver;

impl CheckInObserver for ConsoleObserver {
    fn notice(&self, subject: &SubjectId, message: &str, _level: safeyatra_core::checkin::NoticeLevel) {
        eprintln!("[{subject}] {message}");
    }
}

pub fn run(action: CheckinAction) -> CliResult {
    let config = Config::load_or_default();
    match action {
        CheckinAction::Policy => {
            let policy = EscalationPolicy::from(&config.checkin);
            println!("{}", serde_json::to_string_pretty(&policy)?);
            Ok(())
        }
        CheckinAction::Run {
            respond,
            respond_after,
            window,
            initial_delay,
            tick_ms,
            tourist,
            verbose,
        } => {
            let mut policy = EscalationPolicy::from(&config.checkin);
            if let Some(window) = window {
                policy.response_window_secs = window;
            }
            policy.initial_delay_secs = initial_delay;
            policy.validate()?;
            let tick = tick_ms.map_or_else(|| config.tick_interval(), Duration::from_millis);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_cycle(
                &config,
                policy,
                tick,
                tourist.as_deref(),
                respond,
                Duration::from_secs(respond_after),
                verbose,
            ))
        }
    }
}

async fn run_cycle(
    config: &Config,
    policy: EscalationPolicy,
    tick: Duration,
    tourist: Option<&str>,
    respond: Response,
    respond_after: Duration,
    verbose: bool,
) -> CliResult {
    let profile = demo_profile(tourist)?;
    let subject = profile.tourist_id.clone();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.insert(profile);

    let sink: Arc<dyn NotificationSink> = if config.notifications.enabled {
        Arc::new(LogSink)
    } else {
        Arc::new(NullSink)
    };
    let service = CheckInService::new(policy, profiles, sink)
        .with_clock(Arc::new(TokioClock::new()))
        .with_observer(Arc::new(ConsoleObserver))
        .require_panic_confirmation(config.emergency.require_panic_confirmation);
    let service = Arc::new(Mutex::new(service));

    let (handle, mut events, task) = driver::spawn(service.clone(), tick);
    handle.activate(&subject).await?;

    while let Some(event) = events.recv().await {
        if verbose || !matches!(event, Event::CountdownTick { .. }) {
            println!("{}", serde_json::to_string(&event)?);
        }
        match event {
            Event::CheckInStarted { .. } if respond != Response::None => {
                let handle = handle.clone();
                let subject = subject.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(respond_after).await;
                    let sent = match respond {
                        Response::Safe => handle.confirm_safe(&subject).await,
                        _ => handle.request_help(&subject).await,
                    };
                    if let Err(e) = sent {
                        tracing::warn!(error = %e, "scripted response not delivered");
                    }
                });
            }
            // The response log entry is the last event of a concluded cycle.
            Event::ResponseLogged { .. } => break,
            _ => {}
        }
    }

    handle.shutdown().await?;
    task.await?;
    let snapshot = service.lock().await.snapshot(&subject);
    println!("{}", serde_json::to_string(&snapshot)?);
    Ok(())
}
