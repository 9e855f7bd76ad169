//! # SafeYatra Core Library
//!
//! This library provides the core logic for SafeYatra, a tourist safety
//! companion. It follows a CLI-first approach: every operation is available
//! through the standalone `safeyatra-cli` binary, and any richer front end is a
//! thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Check-in engine**: A wall-clock state machine per tourist. The caller
//!   passes `now` to every operation and ticks it periodically; a tokio driver
//!   does both in production
//! - **Emergency dispatch**: Emergency records and response log entries go to
//!   an async [`NotificationSink`]; SOS calls open a `tel:` URI
//! - **Storage**: TOML-based configuration
//! - **Directory**: Nearby facilities, police stations, safety news and region
//!   briefings
//!
//! ## Key Components
//!
//! - [`CheckInService`]: Check-in orchestration for all tourists
//! - [`CheckInSession`]: Single-tourist state machine
//! - [`RegistrationWizard`]: Four-step registration producing a [`TouristProfile`]
//! - [`Config`]: Application configuration management

pub mod authority;
pub mod chat;
pub mod checkin;
pub mod clock;
pub mod directory;
pub mod emergency;
pub mod error;
pub mod events;
pub mod notify;
pub mod profile;
pub mod registration;
pub mod storage;

pub use checkin::{
    CheckInObserver, CheckInService, CheckInSession, CheckInState, Countdown, EscalationPolicy,
    PromptUrgency, Rejection, TransitionOutcome, Trigger,
};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use emergency::{EmergencyEvent, EmergencyProfile, EmergencyTrigger, SosDialer};
pub use error::{ChatError, ConfigError, CoreError, DispatchError, ValidationError};
pub use events::Event;
pub use notify::{LogSink, NotificationSink, NullSink, RecordingSink};
pub use profile::{InMemoryProfileStore, LastKnownLocation, ProfileStore, SubjectId, TouristProfile};
pub use registration::{RegistrationStep, RegistrationWizard};
pub use storage::Config;
