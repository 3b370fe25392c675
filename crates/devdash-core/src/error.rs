//! Core error types for devdash-core.
//!
//! Transport failures are absorbed by the session recorder and never reach
//! the timer; everything else propagates through [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerStatus;

/// Core error type for devdash-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote store errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A timer command arrived in a state that cannot accept it
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Unknown dot-separated key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Failures talking to the remote session store.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication required (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl TransportError {
    /// Whether the failure means the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, TransportError::Unauthorized { .. })
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Session type other than "work" or "break"
    #[error("Unknown session type: {0}")]
    UnknownSessionType(String),

    /// Timestamp that is neither RFC 3339 nor naive ISO-8601
    #[error("Unparseable timestamp: {0}")]
    Timestamp(String),
}

/// `tick()` or another internal operation invoked in the wrong state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid timer transition: {operation} while {state:?}")]
pub struct InvalidTransition {
    pub operation: &'static str,
    pub state: TimerStatus,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
