//! # Nudger Core Library
//!
//! Client-side logic for scheduled "nudge" reminders kept on a remote
//! scheduling backend and addressed by a device push token. Rendering lives
//! elsewhere; the standalone `nudger` CLI is one consumer of this crate.
//!
//! ## Architecture
//!
//! - **Schedule**: the [`NotificationPreference`] model, the recurrence
//!   expander that turns one preference into backend requests, and the
//!   reconciliation engine that folds backend entries back into preferences
//! - **Gateway**: the [`Gateway`] trait and its reqwest-based [`HttpGateway`]
//! - **Sync**: [`PreferenceController`] and [`ToneController`], which apply the
//!   partial-failure policy and publish state through watch channels
//! - **Storage**: TOML-based [`ClientConfig`]

pub mod error;
pub mod gateway;
pub mod schedule;
pub mod storage;
pub mod sync;
pub mod tone;

pub use error::{ConfigError, CoreError, GatewayError, ReconcileError, Result, ValidationError};
pub use gateway::{BackendEntry, Gateway, HttpGateway, ScheduleRequest, ScheduleResponse};
pub use schedule::{expand, reconcile, Frequency, NotificationPreference};
pub use storage::ClientConfig;
pub use sync::{
    FailedStep, LoadOutcome, OperationFailure, PreferenceController, PreferencesState,
    RemoveOutcome, SaveOutcome, Status, ToneController, ToneLoadOutcome, ToneOutcome, ToneState,
};
pub use tone::{ToneOption, TonePreference};
