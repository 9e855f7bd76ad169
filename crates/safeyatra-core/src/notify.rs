//! Notification port.
//!
//! The check-in service hands every emergency record and every safety
//! response to a [`NotificationSink`]. Sinks are asynchronous so a real
//! dispatcher can do network I/O without the state machine noticing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::emergency::{EmergencyEvent, SafetyResponse};
use crate::error::DispatchError;

/// Receives emergency records and response log entries.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Deliver an emergency record to responders.
    async fn emergency(&self, event: &EmergencyEvent) -> Result<(), DispatchError>;

    /// Record how a check-in (or panic) concluded.
    async fn safety_response(&self, _response: &SafetyResponse) -> Result<(), DispatchError> {
        Ok(()) // default no-op
    }
}

/// Writes everything to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn emergency(&self, event: &EmergencyEvent) -> Result<(), DispatchError> {
        tracing::error!(
            id = %event.id(),
            subject = %event.subject_id(),
            trigger = ?event.trigger(),
            location = %event.location(),
            blood_group = event.profile().blood_group.as_deref().unwrap_or("-"),
            emergency_contact = event.profile().emergency_contact.as_deref().unwrap_or("-"),
            medical_conditions = event.profile().medical_conditions.as_deref().unwrap_or("None reported"),
            "emergency response triggered"
        );
        Ok(())
    }

    async fn safety_response(&self, response: &SafetyResponse) -> Result<(), DispatchError> {
        tracing::info!(
            subject = %response.subject_id,
            response = ?response.response,
            "safety response logged"
        );
        Ok(())
    }
}

/// Drops everything. Used when notifications are disabled in config.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn emergency(&self, _event: &EmergencyEvent) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// Keeps every delivery in memory.
///
/// A sink built with [`RecordingSink::failing`] records and then reports a
/// failure, which exercises the dispatch-error path.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emergencies: Mutex<Vec<EmergencyEvent>>,
    responses: Mutex<Vec<SafetyResponse>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn emergencies(&self) -> Vec<EmergencyEvent> {
        self.emergencies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn responses(&self) -> Vec<SafetyResponse> {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn outcome(&self) -> Result<(), DispatchError> {
        if self.fail {
            Err(DispatchError::SinkFailed {
                sink: "recording".into(),
                message: "configured to fail".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn emergency(&self, event: &EmergencyEvent) -> Result<(), DispatchError> {
        self.emergencies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        self.outcome()
    }

    async fn safety_response(&self, response: &SafetyResponse) -> Result<(), DispatchError> {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(response.clone());
        self.outcome()
    }
}
