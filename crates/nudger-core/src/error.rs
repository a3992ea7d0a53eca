//! Core error types for nudger-core.
//!
//! Each concern gets its own thiserror enum; [`CoreError`] aggregates them
//! for library entry points that can fail. The sync controllers never
//! return these past their boundary, they fold them into status text and
//! structured outcomes instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nudger-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reconciliation errors
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a backend gateway call.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never produced a response (connectivity, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("{status} - {body}")]
    Server { status: u16, body: String },

    /// The backend has nothing stored for this identity.
    ///
    /// Only list operations produce this; callers treat it as an empty result.
    #[error("no entries found")]
    NotFound,

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The base URL cannot carry path segments.
    #[error("Invalid backend URL '{0}'")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Whether this is the expected-empty signal rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound)
    }
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

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Validation errors for a preference about to be scheduled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank
    #[error("{field} is required")]
    Blank { field: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Reconciliation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A backend entry carries a recurrence kind this client does not know.
    #[error("unknown frequency '{frequency}' on entry {entry_id}")]
    UnknownFrequency { entry_id: i64, frequency: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
