//! State snapshots and operation outcomes for the sync controllers.

use serde::Serialize;

use super::status::{HasStatus, Status};
use crate::schedule::NotificationPreference;
use crate::tone::{ToneOption, TonePreference};

/// Everything the rendering layer needs to draw the reminders screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreferencesState {
    pub preferences: Vec<NotificationPreference>,
    pub is_loading: bool,
    pub status: Status,
    /// Preference the next save replaces, if any.
    pub editing: Option<NotificationPreference>,
}

impl PreferencesState {
    pub fn find(&self, id: &str) -> Option<&NotificationPreference> {
        self.preferences.iter().find(|p| p.id == id)
    }
}

impl HasStatus for PreferencesState {
    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

/// Everything the rendering layer needs to draw the tone picker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToneState {
    pub available: Vec<ToneOption>,
    pub current: Option<TonePreference>,
    pub selected_tone_id: Option<i64>,
    pub is_loading: bool,
    pub status: Status,
}

impl HasStatus for ToneState {
    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

/// Which sub-operation of a controller call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FailedStep {
    Validate,
    ListSchedules,
    Reconcile,
    /// One expanded schedule request; `weekday` tells weekly fragments apart.
    Schedule { weekday: Option<u8> },
    Delete { job_id: String },
    ListTones,
    FetchTone,
    SetTone { tone_id: i64 },
}

/// A failed sub-operation and the message it failed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationFailure {
    pub step: FailedStep,
    pub message: String,
}

impl OperationFailure {
    pub fn new(step: FailedStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Result of [`PreferenceController::load`](super::PreferenceController::load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Backend returned entries; this many preferences after grouping.
    Loaded { count: usize },
    /// Backend reported nothing stored. Not an error.
    Empty,
    Failed(OperationFailure),
}

/// Result of a create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// The committed preference; `None` when anything failed.
    pub committed: Option<NotificationPreference>,
    pub failures: Vec<OperationFailure>,
    /// Jobs created for a preference that was then rejected. They still
    /// exist on the backend.
    pub orphaned_job_ids: Vec<String>,
    /// Old jobs an update could not delete. The update went ahead anyway.
    pub stale_job_failures: Vec<OperationFailure>,
}

impl SaveOutcome {
    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    pub(crate) fn rejected(failure: OperationFailure) -> Self {
        Self {
            failures: vec![failure],
            ..Self::default()
        }
    }
}

/// Result of [`PreferenceController::remove`](super::PreferenceController::remove).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoveOutcome {
    pub removed: bool,
    pub failures: Vec<OperationFailure>,
}

/// Result of [`ToneController::load`](super::ToneController::load).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToneLoadOutcome {
    pub tones_loaded: usize,
    pub current: Option<TonePreference>,
    pub failures: Vec<OperationFailure>,
}

/// Result of [`ToneController::select_tone`](super::ToneController::select_tone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ToneOutcome {
    Updated(TonePreference),
    Failed(OperationFailure),
}
