//! Transient status messages shown to the user.
//!
//! Every new message bumps a generation counter. A success message schedules
//! its own removal, and the removal only happens if the generation is still
//! the one it was scheduled for, so a newer message is never erased.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

/// Prefix marking a message as a terminal success.
pub const SUCCESS_MARK: &str = "✓";

/// Default delay before a success message clears itself.
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(3);

/// Current status line plus the generation it was set at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    text: String,
    generation: u64,
}

impl Status {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.text.starts_with(SUCCESS_MARK)
    }

    fn replace(&mut self, text: String) -> u64 {
        self.text = text;
        self.generation += 1;
        self.generation
    }
}

/// State containers that carry a [`Status`].
pub(crate) trait HasStatus: Send + Sync + 'static {
    fn status_mut(&mut self) -> &mut Status;
}

/// Replace the status and return its new generation.
pub(crate) fn set_status<S: HasStatus>(state: &watch::Sender<S>, text: impl Into<String>) -> u64 {
    let text = text.into();
    let mut generation = 0;
    state.send_modify(|s| generation = s.status_mut().replace(text));
    generation
}

/// Clear the status if it is still at `generation`. Returns whether it did.
pub(crate) fn clear_if_current<S: HasStatus>(state: &watch::Sender<S>, generation: u64) -> bool {
    state.send_if_modified(|s| {
        let status = s.status_mut();
        if status.generation == generation && !status.text.is_empty() {
            status.text.clear();
            true
        } else {
            false
        }
    })
}

/// Set a success message and schedule its conditional removal.
///
/// `clear_after = None` keeps the message until something replaces it.
/// Must be called from within a tokio runtime.
pub(crate) fn announce_success<S: HasStatus>(
    state: &Arc<watch::Sender<S>>,
    text: impl Into<String>,
    clear_after: Option<Duration>,
) -> u64 {
    let text = text.into();
    let text = if text.starts_with(SUCCESS_MARK) {
        text
    } else {
        format!("{SUCCESS_MARK} {text}")
    };
    let generation = set_status(state, text);

    if let Some(delay) = clear_after {
        let state = Arc::clone(state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            clear_if_current(&state, generation);
        });
    }
    generation
}
