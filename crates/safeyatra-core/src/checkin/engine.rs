//! Check-in session state machine.
//!
//! One [`CheckInSession`] exists per tracked subject. It is wall-clock based
//! and owns no timers: every operation takes `now`, and the caller is
//! responsible for calling [`CheckInSession::tick`] periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> AwaitingResponse -> (Confirmed | Escalated) -> Idle
//! ```
//!
//! A terminal state stays observable until the next cycle starts, at which
//! point the session passes back through `Idle`. Remaining time is always
//! derived from the stored deadline, so late or missed ticks never drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = CheckInSession::new(subject, EscalationPolicy::default());
//! session.start(now, Trigger::Manual);
//! // In a loop:
//! match session.tick(Utc::now()) {
//!     Tick::Countdown(c) => render(c.display),
//!     Tick::Expired(t) => escalate(t),
//!     Tick::Inactive => {}
//! }
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::escalation::{format_remaining, EscalationPolicy, PromptUrgency};
use crate::emergency::EmergencyTrigger;
use crate::events::Event;
use crate::profile::SubjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInState {
    Idle,
    AwaitingResponse,
    Confirmed,
    Escalated,
}

impl CheckInState {
    /// `Confirmed` or `Escalated`.
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckInState::Confirmed | CheckInState::Escalated)
    }
}

impl fmt::Display for CheckInState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckInState::Idle => "idle",
            CheckInState::AwaitingResponse => "awaiting_response",
            CheckInState::Confirmed => "confirmed",
            CheckInState::Escalated => "escalated",
        };
        f.write_str(s)
    }
}

/// What caused a transition (or an attempted one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// First check-in after the dashboard opened.
    InitialCheckIn,
    /// Recurring check-in while the dashboard is open.
    PeriodicCheckIn,
    /// Explicit start requested by the caller.
    Manual,
    ConfirmSafe,
    RequestHelp,
    DeadlineExpired,
    /// Dashboard closed (logout) while a prompt was pending.
    DashboardClosed,
}

/// Why a trigger had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// A cycle is already waiting for an answer.
    AlreadyPending,
    /// Nothing to confirm or escalate.
    NoActiveSession,
    AlreadyConfirmed,
    AlreadyEscalated,
    /// Check-ins only run while the subject's dashboard is open.
    DashboardInactive,
    /// Panic pressed without the confirmation step.
    NotConfirmed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::AlreadyPending => "a check-in is already awaiting a response",
            Rejection::NoActiveSession => "no check-in is awaiting a response",
            Rejection::AlreadyConfirmed => "this check-in was already confirmed",
            Rejection::AlreadyEscalated => "this check-in was already escalated",
            Rejection::DashboardInactive => "the subject's dashboard is not active",
            Rejection::NotConfirmed => "panic requires explicit confirmation",
        };
        f.write_str(s)
    }
}

/// A state change that actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub subject_id: SubjectId,
    /// Cycle number, starting at 1 for the subject's first check-in.
    pub cycle: u64,
    pub from: CheckInState,
    pub to: CheckInState,
    pub trigger: Trigger,
    pub at: DateTime<Utc>,
}

impl Transition {
    /// Emergency classification when this transition escalated.
    pub fn emergency_trigger(&self) -> Option<EmergencyTrigger> {
        if self.to != CheckInState::Escalated {
            return None;
        }
        match self.trigger {
            Trigger::RequestHelp => Some(EmergencyTrigger::HelpRequested),
            _ => Some(EmergencyTrigger::Timeout),
        }
    }
}

/// Result of asking the machine to change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied(Transition),
    Ignored { reason: Rejection },
}

impl TransitionOutcome {
    pub fn ignored(reason: Rejection) -> Self {
        TransitionOutcome::Ignored { reason }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }

    pub fn transition(&self) -> Option<&Transition> {
        match self {
            TransitionOutcome::Applied(t) => Some(t),
            TransitionOutcome::Ignored { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            TransitionOutcome::Applied(_) => None,
            TransitionOutcome::Ignored { reason } => Some(*reason),
        }
    }
}

/// Remaining-time view of a pending check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining_secs: u64,
    /// `M:SS`
    pub display: String,
    pub deadline: DateTime<Utc>,
    pub urgency: PromptUrgency,
}

/// Outcome of a countdown tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// No check-in pending.
    Inactive,
    Countdown(Countdown),
    /// Deadline passed; the session is now `Escalated`.
    Expired(Transition),
}

/// Per-subject check-in state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInSession {
    subject_id: SubjectId,
    policy: EscalationPolicy,
    state: CheckInState,
    cycle: u64,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    /// Only set while `AwaitingResponse`.
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
}

impl CheckInSession {
    /// Create an idle session.
    pub fn new(subject_id: SubjectId, policy: EscalationPolicy) -> Self {
        Self {
            subject_id,
            policy,
            state: CheckInState::Idle,
            cycle: 0,
            started_at: None,
            deadline: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn state(&self) -> CheckInState {
        self.state
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Number of cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.state == CheckInState::AwaitingResponse
    }

    /// Time left before escalation, clamped at zero. `None` unless pending.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let deadline = self.pending_deadline()?;
        Some((deadline - now).max(Duration::zero()))
    }

    /// Countdown view, or `None` unless pending.
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        let deadline = self.pending_deadline()?;
        let remaining_ms = (deadline - now).num_milliseconds().max(0) as u64;
        // Round up so the display only reads 0:00 once the deadline is reached.
        let remaining_secs = remaining_ms.div_ceil(1000);
        let elapsed = self
            .started_at
            .map(|s| now - s)
            .unwrap_or_else(Duration::zero);
        Some(Countdown {
            remaining_secs,
            display: format_remaining(remaining_secs),
            deadline,
            urgency: self.policy.urgency_at(elapsed),
        })
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let countdown = self.countdown(now);
        Event::StateSnapshot {
            subject_id: self.subject_id.clone(),
            state: self.state,
            cycle: self.cycle,
            remaining_secs: countdown.as_ref().map(|c| c.remaining_secs),
            countdown: countdown.map(|c| c.display),
            deadline: self.pending_deadline(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a new cycle. Rejected while one is already pending.
    pub fn start(&mut self, now: DateTime<Utc>, trigger: Trigger) -> TransitionOutcome {
        match self.state {
            CheckInState::AwaitingResponse => TransitionOutcome::ignored(Rejection::AlreadyPending),
            CheckInState::Idle | CheckInState::Confirmed | CheckInState::Escalated => {
                // Terminal states pass back through Idle first.
                self.clear();
                self.cycle += 1;
                self.started_at = Some(now);
                self.deadline = Some(self.policy.deadline_from(now));
                self.transition(CheckInState::AwaitingResponse, trigger, now)
            }
        }
    }

    /// "I'm safe". A confirmation at or after the deadline loses to expiry.
    pub fn confirm_safe(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        match self.state {
            CheckInState::AwaitingResponse => {
                if self.is_expired(now) {
                    return self.escalate(now, Trigger::DeadlineExpired);
                }
                self.deadline = None;
                self.transition(CheckInState::Confirmed, Trigger::ConfirmSafe, now)
            }
            other => TransitionOutcome::ignored(Self::not_pending(other)),
        }
    }

    /// "Need help": escalate immediately.
    pub fn request_help(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        match self.state {
            CheckInState::AwaitingResponse => {
                let trigger = if self.is_expired(now) {
                    Trigger::DeadlineExpired
                } else {
                    Trigger::RequestHelp
                };
                self.escalate(now, trigger)
            }
            other => TransitionOutcome::ignored(Self::not_pending(other)),
        }
    }

    /// Call periodically. Escalates exactly once when the deadline passes.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if !self.is_pending() {
            return Tick::Inactive;
        }
        if self.is_expired(now) {
            return match self.escalate(now, Trigger::DeadlineExpired) {
                TransitionOutcome::Applied(t) => Tick::Expired(t),
                TransitionOutcome::Ignored { .. } => Tick::Inactive,
            };
        }
        self.countdown(now).map_or(Tick::Inactive, Tick::Countdown)
    }

    /// Drop a pending prompt without escalating (dashboard closed).
    /// A prompt whose deadline has already passed escalates instead.
    pub fn close(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        match self.state {
            CheckInState::AwaitingResponse => {
                if self.is_expired(now) {
                    return self.escalate(now, Trigger::DeadlineExpired);
                }
                self.deadline = None;
                self.transition(CheckInState::Idle, Trigger::DashboardClosed, now)
            }
            CheckInState::Confirmed | CheckInState::Escalated => {
                self.clear();
                TransitionOutcome::ignored(Rejection::NoActiveSession)
            }
            CheckInState::Idle => TransitionOutcome::ignored(Rejection::NoActiveSession),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn pending_deadline(&self) -> Option<DateTime<Utc>> {
        if self.is_pending() {
            self.deadline
        } else {
            None
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.pending_deadline().is_some_and(|d| now >= d)
    }

    fn escalate(&mut self, now: DateTime<Utc>, trigger: Trigger) -> TransitionOutcome {
        self.deadline = None;
        self.transition(CheckInState::Escalated, trigger, now)
    }

    fn clear(&mut self) {
        self.state = CheckInState::Idle;
        self.started_at = None;
        self.deadline = None;
    }

    fn transition(&mut self, to: CheckInState, trigger: Trigger, at: DateTime<Utc>) -> TransitionOutcome {
        let from = self.state;
        self.state = to;
        TransitionOutcome::Applied(Transition {
            subject_id: self.subject_id.clone(),
            cycle: self.cycle,
            from,
            to,
            trigger,
            at,
        })
    }

    fn not_pending(state: CheckInState) -> Rejection {
        match state {
            CheckInState::Confirmed => Rejection::AlreadyConfirmed,
            CheckInState::Escalated => Rejection::AlreadyEscalated,
            _ => Rejection::NoActiveSession,
        }
    }
}
