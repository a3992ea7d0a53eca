//! Backend scheduling gateway.
//!
//! The backend owns the schedule jobs. Everything the client knows about a
//! reminder after a restart comes back through [`Gateway::list_schedules`].
//! [`HttpGateway`] talks JSON over HTTP; tests use an in-memory fake.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpGateway;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::schedule::Frequency;
use crate::tone::{ToneOption, TonePreference};

/// One backend schedule job to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub token: String,
    pub title: String,
    pub time: String,
    pub frequency: Frequency,
    #[serde(rename = "day_of_week", default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(rename = "day_of_month", default, skip_serializing_if = "Option::is_none")]
    pub monthday: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Backend acknowledgement of a created job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub message: String,
    pub job_id: String,
    pub frequency: String,
    pub time: String,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub day_of_month: Option<u8>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// One stored schedule job as the backend lists it.
///
/// `frequency` stays a raw string here; reconciliation decides whether it is
/// a kind this client understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEntry {
    pub id: i64,
    pub title: String,
    pub time: String,
    pub frequency: String,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub day_of_month: Option<u8>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Operations the sync controllers need from the scheduling backend.
///
/// Every call is independent: no retries, no batching. A failure is
/// reported once and the caller decides what it means.
pub trait Gateway: Send + Sync {
    /// Create one schedule job.
    fn schedule(
        &self,
        request: &ScheduleRequest,
    ) -> impl Future<Output = Result<ScheduleResponse, GatewayError>> + Send;

    /// All jobs stored for `token`.
    ///
    /// Implementations return [`GatewayError::NotFound`] when the backend
    /// reports that nothing is stored; callers treat that as empty.
    fn list_schedules(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<BackendEntry>, GatewayError>> + Send;

    /// Cancel one job.
    fn delete_schedule(&self, job_id: &str)
        -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Announce a push token to the backend.
    fn register_identity(&self, token: &str)
        -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Tone catalog.
    fn list_tones(&self) -> impl Future<Output = Result<Vec<ToneOption>, GatewayError>> + Send;

    /// Tone currently applied to `token`'s notifications.
    fn tone_for_identity(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<TonePreference, GatewayError>> + Send;

    /// Replace the tone for `token`. Returns the backend's confirmation text.
    fn set_tone_for_identity(
        &self,
        token: &str,
        tone_id: i64,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// First characters of a push token, for log lines.
pub(crate) fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}
