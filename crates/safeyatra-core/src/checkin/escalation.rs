//! Escalation policy for safety check-ins.
//!
//! Decides when a check-in is due, how long the subject has to answer, and
//! how urgently the prompt should be presented while the window runs down.
//!
//! ## Cadence
//!
//! - **Initial**: fires once, `initial_delay` after the dashboard opens
//! - **Periodic**: fires every `period` while the dashboard stays open
//!
//! ## Prompt urgency
//!
//! - **Nudge**: window just opened
//! - **Alert**: `alert_after` has elapsed without an answer
//! - **Final**: `final_after` has elapsed; escalation is imminent

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::engine::Trigger;
use crate::error::ValidationError;
use crate::storage::CheckInConfig;

/// How insistently the check-in prompt is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptUrgency {
    /// Level 0: prompt just appeared
    Nudge,
    /// Level 1: subject has been silent for a while
    Alert,
    /// Level 2: last stretch before escalation
    Final,
}

impl PromptUrgency {
    /// Get numeric level value (0-2)
    pub fn as_u8(self) -> u8 {
        match self {
            PromptUrgency::Nudge => 0,
            PromptUrgency::Alert => 1,
            PromptUrgency::Final => 2,
        }
    }

    /// Convert from numeric level value
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => PromptUrgency::Nudge,
            1 => PromptUrgency::Alert,
            _ => PromptUrgency::Final,
        }
    }
}

/// Elapsed-time thresholds for each urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    /// Seconds before Alert (default: 3 minutes)
    pub alert_after_secs: u64,
    /// Seconds before Final (default: 4 minutes)
    pub final_after_secs: u64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            alert_after_secs: 3 * 60,
            final_after_secs: 4 * 60,
        }
    }
}

/// Timing rules for one subject's check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Delay between dashboard entry and the first check-in.
    pub initial_delay_secs: u64,
    /// Interval between periodic check-ins.
    pub period_secs: u64,
    /// How long the subject has to answer before escalation.
    pub response_window_secs: u64,
    #[serde(default)]
    pub urgency: UrgencyThresholds,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            initial_delay_secs: 5,
            period_secs: 10 * 60,
            response_window_secs: 5 * 60,
            urgency: UrgencyThresholds::default(),
        }
    }
}

impl From<&CheckInConfig> for EscalationPolicy {
    fn from(cfg: &CheckInConfig) -> Self {
        Self {
            initial_delay_secs: cfg.initial_delay_secs,
            period_secs: cfg.period_secs,
            response_window_secs: cfg.response_window_secs,
            urgency: UrgencyThresholds {
                alert_after_secs: cfg.alert_after_secs,
                final_after_secs: cfg.final_after_secs,
            },
        }
    }
}

impl EscalationPolicy {
    /// Policy with a custom response window and default cadence.
    pub fn with_window(response_window_secs: u64) -> Self {
        Self {
            response_window_secs,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        secs(self.initial_delay_secs)
    }

    pub fn period(&self) -> Duration {
        secs(self.period_secs)
    }

    pub fn response_window(&self) -> Duration {
        secs(self.response_window_secs)
    }

    /// Deadline for a cycle opened at `started`.
    pub fn deadline_from(&self, started: DateTime<Utc>) -> DateTime<Utc> {
        started + self.response_window()
    }

    /// Urgency for a prompt that has been open for `elapsed`.
    pub fn urgency_at(&self, elapsed: Duration) -> PromptUrgency {
        let elapsed_secs = elapsed.num_seconds().max(0) as u64;
        if elapsed_secs >= self.urgency.final_after_secs {
            PromptUrgency::Final
        } else if elapsed_secs >= self.urgency.alert_after_secs {
            PromptUrgency::Alert
        } else {
            PromptUrgency::Nudge
        }
    }

    /// Reject policies that could never give the subject a chance to answer.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.response_window_secs == 0 {
            return Err(invalid("response_window_secs", "must be greater than zero"));
        }
        if self.period_secs == 0 {
            return Err(invalid("period_secs", "must be greater than zero"));
        }
        if self.urgency.alert_after_secs > self.urgency.final_after_secs {
            return Err(invalid(
                "alert_after_secs",
                "must not exceed final_after_secs",
            ));
        }
        Ok(())
    }
}

/// Upper bound for configured durations (ten years).
const MAX_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn secs(value: u64) -> Duration {
    Duration::seconds(value.min(MAX_SECS) as i64)
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Tracks when the next check-in is due for an open dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cadence {
    activated_at: DateTime<Utc>,
    initial_due: Option<DateTime<Utc>>,
    next_periodic: DateTime<Utc>,
}

impl Cadence {
    pub fn new(activated_at: DateTime<Utc>, policy: &EscalationPolicy) -> Self {
        Self {
            activated_at,
            initial_due: Some(activated_at + policy.initial_delay()),
            next_periodic: activated_at + policy.period(),
        }
    }

    pub fn activated_at(&self) -> DateTime<Utc> {
        self.activated_at
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        match self.initial_due {
            Some(initial) => initial.min(self.next_periodic),
            None => self.next_periodic,
        }
    }

    /// Returns the trigger that has come due, at most one per call.
    ///
    /// Missed periods are collapsed: after a long stall only one periodic
    /// trigger fires and the next one is scheduled after `now`.
    pub fn poll(&mut self, now: DateTime<Utc>, policy: &EscalationPolicy) -> Option<Trigger> {
        if let Some(initial) = self.initial_due {
            if now >= initial {
                self.initial_due = None;
                return Some(Trigger::InitialCheckIn);
            }
        }
        if now >= self.next_periodic {
            let period = policy.period().max(Duration::seconds(1));
            while self.next_periodic <= now {
                self.next_periodic += period;
            }
            return Some(Trigger::PeriodicCheckIn);
        }
        None
    }
}

/// Render remaining seconds as `M:SS`.
pub fn format_remaining(remaining_secs: u64) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}
