//! Tokio driver for [`CheckInService`].
//!
//! One task owns the tick interval and serializes user commands against it,
//! so a confirmation and an expiry for the same subject never interleave.
//! Events drained after each step are forwarded on an unbounded channel.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::service::CheckInService;
use crate::events::Event;
use crate::profile::SubjectId;

/// User-initiated input to the driver loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Activate(SubjectId),
    Deactivate(SubjectId),
    StartCycle(SubjectId),
    ConfirmSafe(SubjectId),
    RequestHelp(SubjectId),
    Panic { subject: SubjectId, confirmed: bool },
    Shutdown,
}

/// The driver task has exited and no longer accepts commands.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("check-in driver has stopped")]
pub struct DriverStopped;

/// Cloneable sender side of a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<Command>,
}

impl DriverHandle {
    pub async fn send(&self, command: Command) -> Result<(), DriverStopped> {
        self.tx.send(command).await.map_err(|_| DriverStopped)
    }

    pub async fn activate(&self, subject: &SubjectId) -> Result<(), DriverStopped> {
        self.send(Command::Activate(subject.clone())).await
    }

    pub async fn deactivate(&self, subject: &SubjectId) -> Result<(), DriverStopped> {
        self.send(Command::Deactivate(subject.clone())).await
    }

    pub async fn start_cycle(&self, subject: &SubjectId) -> Result<(), DriverStopped> {
        self.send(Command::StartCycle(subject.clone())).await
    }

    pub async fn confirm_safe(&self, subject: &SubjectId) -> Result<(), DriverStopped> {
        self.send(Command::ConfirmSafe(subject.clone())).await
    }

    pub async fn request_help(&self, subject: &SubjectId) -> Result<(), DriverStopped> {
        self.send(Command::RequestHelp(subject.clone())).await
    }

    pub async fn panic(&self, subject: &SubjectId, confirmed: bool) -> Result<(), DriverStopped> {
        self.send(Command::Panic {
            subject: subject.clone(),
            confirmed,
        })
        .await
    }

    pub async fn shutdown(&self) -> Result<(), DriverStopped> {
        self.send(Command::Shutdown).await
    }
}

const COMMAND_BUFFER: usize = 32;

/// Spawn the driver loop on the current runtime.
pub fn spawn(
    service: Arc<Mutex<CheckInService>>,
    tick_interval: Duration,
) -> (DriverHandle, mpsc::UnboundedReceiver<Event>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(service, rx, events_tx, tick_interval));
    (DriverHandle { tx }, events_rx, task)
}

async fn run(
    service: Arc<Mutex<CheckInService>>,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
    tick_interval: Duration,
) {
    let mut interval = tokio::time::interval(tick_interval.max(Duration::from_millis(10)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::debug!(interval_ms = tick_interval.as_millis() as u64, "check-in driver started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut svc = service.lock().await;
                svc.on_tick().await;
                forward(&mut svc, &events);
            }
            command = commands.recv() => {
                let command = match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => command,
                };
                let mut svc = service.lock().await;
                handle(&mut svc, command).await;
                forward(&mut svc, &events);
            }
        }
    }
    tracing::debug!("check-in driver stopped");
}

async fn handle(svc: &mut CheckInService, command: Command) {
    match command {
        Command::Activate(subject) => {
            svc.activate_dashboard(&subject);
        }
        Command::Deactivate(subject) => {
            svc.deactivate_dashboard(&subject).await;
        }
        Command::StartCycle(subject) => {
            svc.start_cycle(&subject).await;
        }
        Command::ConfirmSafe(subject) => {
            svc.confirm_safe(&subject).await;
        }
        Command::RequestHelp(subject) => {
            svc.request_help(&subject).await;
        }
        Command::Panic { subject, confirmed } => {
            svc.trigger_panic(&subject, confirmed).await;
        }
        Command::Shutdown => {}
    }
}

fn forward(svc: &mut CheckInService, events: &mpsc::UnboundedSender<Event>) {
    for event in svc.drain_events() {
        // Nobody listening is fine; the service keeps running.
        let _ = events.send(event);
    }
}
