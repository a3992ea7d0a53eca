//! Preference store and sync controller.
//!
//! Owns the in-memory list of reminders for one push token and keeps it in
//! step with the backend. The list is never persisted; [`load`] rebuilds it
//! wholesale.
//!
//! Mutating operations are serialized through a FIFO gate, so a load and a
//! delete issued back to back cannot interleave their writes.
//!
//! [`load`]: PreferenceController::load

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use super::status::{announce_success, set_status, DEFAULT_CLEAR_AFTER};
use super::types::{
    FailedStep, LoadOutcome, OperationFailure, PreferencesState, RemoveOutcome, SaveOutcome,
};
use crate::gateway::{token_prefix, Gateway};
use crate::schedule::{expand, reconcile, NotificationPreference};

/// Sync controller for one identity's reminders.
pub struct PreferenceController<G> {
    gateway: Arc<G>,
    token: String,
    state: Arc<watch::Sender<PreferencesState>>,
    gate: Mutex<()>,
    clear_after: Option<Duration>,
}

impl<G: Gateway> PreferenceController<G> {
    pub fn new(gateway: Arc<G>, token: impl Into<String>) -> Self {
        Self {
            gateway,
            token: token.into(),
            state: Arc::new(watch::Sender::new(PreferencesState::default())),
            gate: Mutex::new(()),
            clear_after: Some(DEFAULT_CLEAR_AFTER),
        }
    }

    /// Override how long success messages stay up. `None` keeps them.
    pub fn with_status_clear(mut self, clear_after: Option<Duration>) -> Self {
        self.clear_after = clear_after;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<PreferencesState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PreferencesState {
        self.state.borrow().clone()
    }

    /// Make the next [`save`](Self::save) replace `preference`.
    pub fn begin_edit(&self, preference: NotificationPreference) {
        self.state.send_modify(|s| s.editing = Some(preference));
    }

    pub fn cancel_edit(&self) {
        self.state.send_modify(|s| s.editing = None);
    }

    pub fn clear_status(&self) {
        set_status(&self.state, "");
    }

    /// Replace the local list with what the backend holds.
    pub async fn load(&self) -> LoadOutcome {
        let _turn = self.gate.lock().await;
        self.set_loading(true);
        set_status(&self.state, "Loading existing notifications...");

        let outcome = match self.gateway.list_schedules(&self.token).await {
            Ok(entries) => match reconcile(&entries) {
                Ok(preferences) => {
                    let count = preferences.len();
                    self.state.send_modify(|s| s.preferences = preferences);
                    tracing::info!(
                        token = token_prefix(&self.token),
                        entries = entries.len(),
                        count,
                        "loaded notification preferences"
                    );
                    if count > 0 {
                        announce_success(
                            &self.state,
                            format!("✓ Loaded {count} existing notification(s)"),
                            self.clear_after,
                        );
                        LoadOutcome::Loaded { count }
                    } else {
                        set_status(&self.state, "");
                        LoadOutcome::Empty
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "backend entries could not be reconciled");
                    set_status(&self.state, format!("Error loading notifications: {e}"));
                    LoadOutcome::Failed(OperationFailure::new(FailedStep::Reconcile, e.to_string()))
                }
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(token = token_prefix(&self.token), "no notifications stored");
                self.state.send_modify(|s| s.preferences.clear());
                set_status(&self.state, "");
                LoadOutcome::Empty
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load notifications");
                set_status(&self.state, format!("Error loading notifications: {e}"));
                LoadOutcome::Failed(OperationFailure::new(FailedStep::ListSchedules, e.to_string()))
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Create `preference`, or replace the one being edited.
    pub async fn save(&self, preference: NotificationPreference) -> SaveOutcome {
        let editing = self.state.borrow().editing.clone();
        match editing {
            Some(old) => self.update(old, preference).await,
            None => self.create(preference).await,
        }
    }

    /// Schedule a new preference. All-or-nothing locally.
    pub async fn create(&self, preference: NotificationPreference) -> SaveOutcome {
        let _turn = self.gate.lock().await;
        self.set_loading(true);
        set_status(&self.state, "Scheduling notification...");

        let outcome = self.schedule_and_commit(preference, false).await;

        self.set_loading(false);
        outcome
    }

    /// Replace `old` with `preference`: delete old jobs, then create.
    ///
    /// Not atomic. Old jobs that fail to delete only produce a warning, and
    /// `old` leaves the local list even if the new schedule then fails.
    pub async fn update(&self, old: NotificationPreference, preference: NotificationPreference) -> SaveOutcome {
        let _turn = self.gate.lock().await;
        self.set_loading(true);
        set_status(&self.state, "Updating notification...");

        if let Err(e) = preference.validate() {
            let outcome = self.reject_invalid(e.to_string());
            self.set_loading(false);
            return outcome;
        }

        let stale_job_failures = self.delete_jobs(&old.job_ids).await;
        if !stale_job_failures.is_empty() {
            tracing::warn!(
                failed = stale_job_failures.len(),
                title = %old.title,
                "some old jobs could not be deleted, continuing with update"
            );
            set_status(
                &self.state,
                "Warning: Some old jobs couldn't be deleted. Continuing with update...",
            );
        }
        self.state.send_modify(|s| s.preferences.retain(|p| p.id != old.id));

        let mut outcome = self.schedule_and_commit(preference, true).await;
        outcome.stale_job_failures = stale_job_failures;

        self.set_loading(false);
        outcome
    }

    /// Delete every job of `preference`; drop it locally only if all went.
    pub async fn remove(&self, preference: &NotificationPreference) -> RemoveOutcome {
        let _turn = self.gate.lock().await;
        self.set_loading(true);
        set_status(&self.state, "Removing notification...");

        let outcome = if preference.job_ids.is_empty() {
            // Legacy entries without job ids only exist locally.
            self.state.send_modify(|s| s.preferences.retain(|p| p.id != preference.id));
            announce_success(
                &self.state,
                format!("✓ '{}' removed successfully (no job_ids found)", preference.title),
                self.clear_after,
            );
            RemoveOutcome {
                removed: true,
                failures: Vec::new(),
            }
        } else {
            let failures = self.delete_jobs(&preference.job_ids).await;
            if failures.is_empty() {
                self.state.send_modify(|s| s.preferences.retain(|p| p.id != preference.id));
                tracing::info!(title = %preference.title, jobs = preference.job_ids.len(), "removed preference");
                announce_success(
                    &self.state,
                    format!("✓ '{}' removed successfully", preference.title),
                    self.clear_after,
                );
                RemoveOutcome {
                    removed: true,
                    failures,
                }
            } else {
                let reasons = failures
                    .iter()
                    .map(|f| match &f.step {
                        FailedStep::Delete { job_id } => format!("Job {job_id}: {}", f.message),
                        _ => f.message.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(title = %preference.title, failed = failures.len(), "preference kept, deletions failed");
                set_status(&self.state, format!("Some deletions failed: {reasons}"));
                RemoveOutcome {
                    removed: false,
                    failures,
                }
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Expand, schedule every request, and commit only if all succeeded.
    async fn schedule_and_commit(&self, mut preference: NotificationPreference, is_editing: bool) -> SaveOutcome {
        // committed state must match what a reload rebuilds
        preference.clear_unused_fields();
        if let Err(e) = preference.validate() {
            return self.reject_invalid(e.to_string());
        }

        let requests = expand(&preference, &self.token);
        let mut job_ids = Vec::with_capacity(requests.len());
        let mut failures = Vec::new();
        for request in &requests {
            match self.gateway.schedule(request).await {
                Ok(response) => job_ids.push(response.job_id),
                Err(e) => failures.push(OperationFailure::new(
                    FailedStep::Schedule {
                        weekday: request.weekday,
                    },
                    e.to_string(),
                )),
            }
        }

        if !failures.is_empty() {
            if !job_ids.is_empty() {
                tracing::warn!(
                    title = %preference.title,
                    orphaned = ?job_ids,
                    "preference rejected after partial scheduling, created jobs remain on the backend"
                );
            }
            let reasons = failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            set_status(&self.state, format!("Some notifications failed: {reasons}"));
            return SaveOutcome {
                committed: None,
                failures,
                orphaned_job_ids: job_ids,
                stale_job_failures: Vec::new(),
            };
        }

        let committed = NotificationPreference {
            id: uuid::Uuid::new_v4().to_string(),
            job_ids,
            ..preference
        };
        tracing::info!(
            title = %committed.title,
            frequency = %committed.frequency,
            jobs = committed.job_ids.len(),
            "committed preference"
        );

        let message = if is_editing {
            format!("✓ '{}' updated successfully", committed.title)
        } else {
            format!(
                "✓ '{}' scheduled {} at {}",
                committed.title,
                committed.frequency_text(),
                committed.time
            )
        };
        let added = committed.clone();
        self.state.send_modify(|s| {
            s.preferences.push(added);
            s.editing = None;
        });
        announce_success(&self.state, message, self.clear_after);

        SaveOutcome {
            committed: Some(committed),
            ..SaveOutcome::default()
        }
    }

    /// Delete each job, attempting all of them. Returns the failures.
    async fn delete_jobs(&self, job_ids: &[String]) -> Vec<OperationFailure> {
        let mut failures = Vec::new();
        for job_id in job_ids {
            if let Err(e) = self.gateway.delete_schedule(job_id).await {
                failures.push(OperationFailure::new(
                    FailedStep::Delete {
                        job_id: job_id.clone(),
                    },
                    e.to_string(),
                ));
            }
        }
        failures
    }

    fn reject_invalid(&self, message: String) -> SaveOutcome {
        set_status(&self.state, format!("Error: {message}"));
        SaveOutcome::rejected(OperationFailure::new(FailedStep::Validate, message))
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != is_loading;
            s.is_loading = is_loading;
            changed
        });
    }
}
