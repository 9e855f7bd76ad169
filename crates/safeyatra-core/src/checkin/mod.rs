//! Safety check-in engine.
//!
//! A wall-clock state machine per subject (`Idle → AwaitingResponse →
//! Confirmed | Escalated`), the timing policy that drives it, a service that
//! turns transitions into side effects, and a tokio driver that ticks it.

pub mod driver;
pub mod engine;
pub mod escalation;
pub mod service;

pub use driver::{Command, DriverHandle, DriverStopped};
pub use engine::{
    CheckInSession, CheckInState, Countdown, Rejection, Tick, Transition, TransitionOutcome,
    Trigger,
};
pub use escalation::{format_remaining, Cadence, EscalationPolicy, PromptUrgency, UrgencyThresholds};
pub use service::{CheckInObserver, CheckInService, NoticeLevel, OUTBOX_LIMIT};
