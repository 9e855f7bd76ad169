//! Simulated chat with a police station.
//!
//! Replies are produced locally from canned text; nothing leaves the process.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::directory::PoliceStation;
use crate::error::ChatError;

const REPLIES: [&str; 5] = [
    "We've received your message and are processing it.",
    "Our team is on the way to assist you.",
    "Thank you for reaching out. Stay safe.",
    "We'll contact you shortly with more information.",
    "Your safety is our priority. Help is coming.",
];

const QUICK_REPLY: &str = "We understand your situation. Our team is responding immediately.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub direction: Direction,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(direction: Direction, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            direction,
            text: text.into(),
            at,
        }
    }
}

/// One conversation, reset whenever a different station is selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliceChat {
    station: Option<PoliceStation>,
    messages: Vec<ChatMessage>,
}

impl PoliceChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station(&self) -> Option<&PoliceStation> {
        self.station.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Open a conversation with `station`; the station greets first.
    pub fn select_station(&mut self, station: PoliceStation, now: DateTime<Utc>) -> &ChatMessage {
        tracing::debug!(station = %station.id, status = %station.status, "chat station selected");
        let greeting = format!(
            "Hello! This is {}. How can we assist you today?",
            station.name
        );
        self.station = Some(station);
        self.messages.clear();
        self.push(Direction::Received, greeting, now)
    }

    /// Send free text. Returns the station's reply.
    ///
    /// # Errors
    /// [`ChatError::NoStationSelected`] before a station is chosen,
    /// [`ChatError::EmptyMessage`] for blank text.
    pub fn send<R: Rng + ?Sized>(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<&ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.ensure_station()?;
        self.push(Direction::Sent, text, now);
        let reply = REPLIES.choose(rng).copied().unwrap_or(REPLIES[0]);
        Ok(self.push(Direction::Received, reply, now))
    }

    /// Send a one-tap template. The station acknowledges with a fixed reply.
    ///
    /// # Errors
    /// [`ChatError::NoStationSelected`] before a station is chosen.
    pub fn send_quick(&mut self, text: &str, now: DateTime<Utc>) -> Result<&ChatMessage, ChatError> {
        self.ensure_station()?;
        self.push(Direction::Sent, text, now);
        Ok(self.push(Direction::Received, QUICK_REPLY, now))
    }

    /// Drop the conversation (logout).
    pub fn reset(&mut self) {
        self.station = None;
        self.messages.clear();
    }

    fn ensure_station(&self) -> Result<(), ChatError> {
        if self.station.is_none() {
            tracing::debug!("chat message without a selected station");
            return Err(ChatError::NoStationSelected);
        }
        Ok(())
    }

    fn push(&mut self, direction: Direction, text: impl Into<String>, at: DateTime<Utc>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(direction, text, at));
        &self.messages[self.messages.len() - 1]
    }
}
