//! Tone picker controller.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use super::status::set_status;
use super::types::{FailedStep, OperationFailure, ToneLoadOutcome, ToneOutcome, ToneState};
use crate::gateway::{token_prefix, Gateway};
use crate::tone::TonePreference;

/// Sync controller for the single tone setting of one identity.
pub struct ToneController<G> {
    gateway: Arc<G>,
    token: String,
    state: Arc<watch::Sender<ToneState>>,
    gate: Mutex<()>,
}

impl<G: Gateway> ToneController<G> {
    pub fn new(gateway: Arc<G>, token: impl Into<String>) -> Self {
        Self {
            gateway,
            token: token.into(),
            state: Arc::new(watch::Sender::new(ToneState::default())),
            gate: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ToneState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ToneState {
        self.state.borrow().clone()
    }

    /// Fetch the catalog and the current tone side by side.
    ///
    /// The two fetches are independent; either may fail without affecting
    /// the other. A catalog error takes the status line over a current-tone
    /// error.
    pub async fn load(&self) -> ToneLoadOutcome {
        let _turn = self.gate.lock().await;
        self.set_loading(true);
        set_status(&self.state, "Loading tone options...");

        let has_token = !self.token.is_empty();
        let (tones, current) = tokio::join!(self.gateway.list_tones(), async {
            if has_token {
                Some(self.gateway.tone_for_identity(&self.token).await)
            } else {
                None
            }
        });

        let mut outcome = ToneLoadOutcome::default();
        let mut status = String::new();

        match tones {
            Ok(tones) => {
                tracing::debug!(count = tones.len(), "loaded tone options");
                outcome.tones_loaded = tones.len();
                self.state.send_modify(|s| s.available = tones);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tones");
                status = format!("Error loading tones: {e}");
                outcome
                    .failures
                    .push(OperationFailure::new(FailedStep::ListTones, e.to_string()));
            }
        }

        match current {
            Some(Ok(preference)) => {
                tracing::debug!(
                    token = token_prefix(&self.token),
                    tone = %preference.tone_name,
                    tone_id = preference.tone_id,
                    "current tone"
                );
                outcome.current = Some(preference.clone());
                self.state.send_modify(|s| {
                    s.selected_tone_id = Some(preference.tone_id);
                    s.current = Some(preference);
                });
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "failed to load current tone");
                if status.is_empty() {
                    status = format!("Error loading current tone: {e}");
                }
                outcome
                    .failures
                    .push(OperationFailure::new(FailedStep::FetchTone, e.to_string()));
            }
            None => {
                if status.is_empty() {
                    status = "Waiting for push token...".to_string();
                }
            }
        }

        set_status(&self.state, status);
        self.set_loading(false);
        outcome
    }

    /// Apply `tone_id` to this identity.
    ///
    /// On success the current tone is rebuilt from the local catalog rather
    /// than fetched again.
    pub async fn select_tone(&self, tone_id: i64) -> ToneOutcome {
        if self.token.is_empty() {
            set_status(&self.state, "Push token not available");
            return ToneOutcome::Failed(OperationFailure::new(
                FailedStep::SetTone { tone_id },
                "Push token not available",
            ));
        }

        let _turn = self.gate.lock().await;
        self.set_loading(true);

        let outcome = match self.gateway.set_tone_for_identity(&self.token, tone_id).await {
            Ok(message) => {
                let tone_name = self
                    .state
                    .borrow()
                    .available
                    .iter()
                    .find(|t| t.tone_id == tone_id)
                    .map(|t| t.tone_name.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                let preference = TonePreference {
                    token: self.token.clone(),
                    tone_name,
                    tone_id,
                    is_default: false,
                };
                tracing::info!(tone_id, tone = %preference.tone_name, %message, "tone updated");
                let current = preference.clone();
                self.state.send_modify(|s| {
                    s.selected_tone_id = Some(tone_id);
                    s.current = Some(current);
                });
                // an earlier load error no longer applies
                set_status(&self.state, "");
                ToneOutcome::Updated(preference)
            }
            Err(e) => {
                tracing::warn!(error = %e, tone_id, "failed to update tone");
                set_status(&self.state, format!("Error updating tone: {e}"));
                ToneOutcome::Failed(OperationFailure::new(FailedStep::SetTone { tone_id }, e.to_string()))
            }
        };

        self.set_loading(false);
        outcome
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != is_loading;
            s.is_loading = is_loading;
            changed
        });
    }
}
