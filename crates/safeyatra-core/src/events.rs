use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkin::{CheckInState, PromptUrgency, Rejection, Trigger};
use crate::emergency::{EmergencyEvent, EmergencyTrigger, ResponseKind};
use crate::profile::SubjectId;

/// Every state change in the system produces an Event.
/// The presentation layer drains them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DashboardActivated {
        subject_id: SubjectId,
        at: DateTime<Utc>,
    },
    DashboardDeactivated {
        subject_id: SubjectId,
        at: DateTime<Utc>,
    },
    /// Check-in prompt shown; countdown running.
    CheckInStarted {
        subject_id: SubjectId,
        cycle: u64,
        trigger: Trigger,
        deadline: DateTime<Utc>,
        window_secs: u64,
        at: DateTime<Utc>,
    },
    /// Once-per-second remaining time while a prompt is open.
    CountdownTick {
        subject_id: SubjectId,
        remaining_secs: u64,
        display: String,
        urgency: PromptUrgency,
        at: DateTime<Utc>,
    },
    SafetyConfirmed {
        subject_id: SubjectId,
        cycle: u64,
        at: DateTime<Utc>,
    },
    CheckInEscalated {
        subject_id: SubjectId,
        cycle: u64,
        trigger: EmergencyTrigger,
        at: DateTime<Utc>,
    },
    /// Pending prompt dropped because the dashboard closed.
    CheckInCancelled {
        subject_id: SubjectId,
        cycle: u64,
        at: DateTime<Utc>,
    },
    /// Emergency record handed to the notification sink.
    EmergencyRaised {
        emergency: EmergencyEvent,
    },
    /// Safety response log entry.
    ResponseLogged {
        subject_id: SubjectId,
        response: ResponseKind,
        at: DateTime<Utc>,
    },
    /// A trigger arrived in a state where it has no effect.
    TriggerIgnored {
        subject_id: SubjectId,
        trigger: Trigger,
        reason: Rejection,
        at: DateTime<Utc>,
    },
    /// Panic pressed without confirmation.
    PanicCancelled {
        subject_id: SubjectId,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        subject_id: SubjectId,
        state: CheckInState,
        cycle: u64,
        remaining_secs: Option<u64>,
        countdown: Option<String>,
        deadline: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Subject the event concerns.
    pub fn subject_id(&self) -> &SubjectId {
        match self {
            Event::DashboardActivated { subject_id, .. }
            | Event::DashboardDeactivated { subject_id, .. }
            | Event::CheckInStarted { subject_id, .. }
            | Event::CountdownTick { subject_id, .. }
            | Event::SafetyConfirmed { subject_id, .. }
            | Event::CheckInEscalated { subject_id, .. }
            | Event::CheckInCancelled { subject_id, .. }
            | Event::ResponseLogged { subject_id, .. }
            | Event::TriggerIgnored { subject_id, .. }
            | Event::PanicCancelled { subject_id, .. }
            | Event::StateSnapshot { subject_id, .. } => subject_id,
            Event::EmergencyRaised { emergency } => emergency.subject_id(),
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Event::EmergencyRaised { .. })
    }
}
