//! Core error types for safeyatra-core.
//!
//! Invalid check-in transitions are *not* errors: they are routinely reachable
//! through double clicks and timer races, so the engine reports them as
//! [`crate::checkin::TransitionOutcome::Ignored`]. The types here cover the
//! failures that genuinely need propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for safeyatra-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Police chat errors
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be determined or created
    #[error("Configuration directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left blank
    #[error("Missing required field '{field}' in step {step}")]
    MissingField { step: u8, field: String },

    /// Location step completed without a location decision
    #[error("Location access or a travel region is required")]
    LocationUndecided,

    /// Location denied and no region selected
    #[error("Travel region is required when location access is denied")]
    RegionRequired,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by a notification sink or side-channel dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The sink refused or failed to deliver
    #[error("Notification sink '{sink}' failed: {message}")]
    SinkFailed { sink: String, message: String },

    /// The platform opener could not start the emergency call
    #[error("Failed to open {uri}: {source}")]
    DialFailed {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    /// The dial target could not be turned into a URI
    #[error("Invalid dial target '{0}'")]
    InvalidNumber(String),
}

/// Police chat errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// A message was sent before choosing a station
    #[error("Please select a police station first")]
    NoStationSelected,

    /// Unknown station id
    #[error("Unknown police station '{0}'")]
    UnknownStation(String),

    /// Blank message
    #[error("Message is empty")]
    EmptyMessage,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
