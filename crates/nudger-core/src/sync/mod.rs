//! Sync controllers.
//!
//! Each controller owns the client-side view of one concern (reminders, tone),
//! drives the backend gateway, and publishes its state through a
//! `tokio::sync::watch` channel that the rendering layer subscribes to.

pub mod preferences;
pub mod status;
pub mod tone;
pub mod types;

#[cfg(test)]
mod preferences_tests;

pub use preferences::PreferenceController;
pub use status::{Status, DEFAULT_CLEAR_AFTER, SUCCESS_MARK};
pub use tone::ToneController;
pub use types::{
    FailedStep, LoadOutcome, OperationFailure, PreferencesState, RemoveOutcome, SaveOutcome,
    ToneLoadOutcome, ToneOutcome, ToneState,
};
