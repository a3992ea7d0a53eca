//! Scripted in-memory gateway for controller tests.

use std::collections::HashSet;
use std::sync::Mutex;

use super::{BackendEntry, Gateway, ScheduleRequest, ScheduleResponse};
use crate::error::GatewayError;
use crate::tone::{ToneOption, TonePreference};

/// Failure a scripted call should produce.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    NotFound,
    Server(u16, &'static str),
}

impl Scripted {
    fn to_error(&self) -> GatewayError {
        match self {
            Scripted::NotFound => GatewayError::NotFound,
            Scripted::Server(status, body) => GatewayError::Server {
                status: *status,
                body: body.to_string(),
            },
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    next_job: Mutex<u32>,
    entries: Mutex<Vec<BackendEntry>>,
    list_failure: Mutex<Option<Scripted>>,
    /// Weekdays whose schedule call fails; `None` matches non-weekly requests.
    failing_weekdays: Mutex<HashSet<Option<u8>>>,
    failing_deletes: Mutex<HashSet<String>>,
    tones: Mutex<Vec<ToneOption>>,
    tones_failure: Mutex<Option<Scripted>>,
    current_tone: Mutex<Option<TonePreference>>,
    current_tone_failure: Mutex<Option<Scripted>>,
    set_tone_failure: Mutex<Option<Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_entries(self, entries: Vec<BackendEntry>) -> Self {
        *self.entries.lock().unwrap() = entries;
        self
    }

    pub(crate) fn fail_list(&self, failure: Scripted) {
        *self.list_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_schedule_for(&self, weekday: Option<u8>) {
        self.failing_weekdays.lock().unwrap().insert(weekday);
    }

    pub(crate) fn fail_delete_of(&self, job_id: &str) {
        self.failing_deletes.lock().unwrap().insert(job_id.to_string());
    }

    pub(crate) fn with_tones(self, tones: Vec<ToneOption>) -> Self {
        *self.tones.lock().unwrap() = tones;
        self
    }

    pub(crate) fn with_current_tone(self, tone: TonePreference) -> Self {
        *self.current_tone.lock().unwrap() = Some(tone);
        self
    }

    pub(crate) fn fail_tones(&self, failure: Scripted) {
        *self.tones_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_current_tone(&self, failure: Scripted) {
        *self.current_tone_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_set_tone(&self, failure: Scripted) {
        *self.set_tone_failure.lock().unwrap() = Some(failure);
    }

    /// Every call made so far, e.g. `"schedule:Gym:Some(3)"`, `"delete:job-1"`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Jobs the fake backend currently holds.
    pub(crate) fn stored(&self) -> Vec<BackendEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Gateway for FakeGateway {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResponse, GatewayError> {
        self.record(format!("schedule:{}:{:?}", request.title, request.weekday));
        if self.failing_weekdays.lock().unwrap().contains(&request.weekday) {
            return Err(GatewayError::Server {
                status: 500,
                body: format!("cannot schedule weekday {:?}", request.weekday),
            });
        }

        let job_id = {
            let mut next = self.next_job.lock().unwrap();
            *next += 1;
            format!("job-{}", *next)
        };
        let mut entries = self.entries.lock().unwrap();
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        entries.push(BackendEntry {
            id,
            title: request.title.clone(),
            time: request.time.clone(),
            frequency: request.frequency.as_str().to_string(),
            day_of_week: request.weekday,
            day_of_month: request.monthday,
            end_date: request.end_date.clone(),
            job_id: Some(job_id.clone()),
            created_at: None,
        });

        Ok(ScheduleResponse {
            message: "Notification scheduled successfully".to_string(),
            job_id,
            frequency: request.frequency.as_str().to_string(),
            time: request.time.clone(),
            day_of_week: request.weekday,
            day_of_month: request.monthday,
            end_date: request.end_date.clone(),
        })
    }

    async fn list_schedules(&self, token: &str) -> Result<Vec<BackendEntry>, GatewayError> {
        self.record(format!("list:{token}"));
        if let Some(failure) = self.list_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn delete_schedule(&self, job_id: &str) -> Result<(), GatewayError> {
        self.record(format!("delete:{job_id}"));
        if self.failing_deletes.lock().unwrap().contains(job_id) {
            return Err(GatewayError::Server {
                status: 404,
                body: format!("Job '{job_id}' not found or could not be cancelled"),
            });
        }
        self.entries
            .lock()
            .unwrap()
            .retain(|e| e.job_id.as_deref() != Some(job_id));
        Ok(())
    }

    async fn register_identity(&self, token: &str) -> Result<(), GatewayError> {
        self.record(format!("register:{token}"));
        Ok(())
    }

    async fn list_tones(&self) -> Result<Vec<ToneOption>, GatewayError> {
        self.record("tones".to_string());
        if let Some(failure) = self.tones_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        Ok(self.tones.lock().unwrap().clone())
    }

    async fn tone_for_identity(&self, token: &str) -> Result<TonePreference, GatewayError> {
        self.record(format!("user-tone:{token}"));
        if let Some(failure) = self.current_tone_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        self.current_tone
            .lock()
            .unwrap()
            .clone()
            .ok_or(GatewayError::Server {
                status: 500,
                body: "Failed to retrieve user tone".to_string(),
            })
    }

    async fn set_tone_for_identity(&self, token: &str, tone_id: i64) -> Result<String, GatewayError> {
        self.record(format!("set-tone:{token}:{tone_id}"));
        if let Some(failure) = self.set_tone_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        Ok("Tone preference updated successfully".to_string())
    }
}
