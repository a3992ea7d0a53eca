//! HttpGateway: JSON-over-HTTP client for the scheduling backend.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{token_prefix, BackendEntry, Gateway, ScheduleRequest, ScheduleResponse};
use crate::error::GatewayError;
use crate::storage::BackendConfig;
use crate::tone::{ToneOption, TonePreference};

#[derive(Debug, Deserialize)]
struct ListSchedulesResponse {
    notifications: Vec<BackendEntry>,
}

#[derive(Debug, Deserialize)]
struct ListTonesResponse {
    tones: Vec<ToneOption>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Client for one backend instance.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http_client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Create a gateway with a default client.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a gateway reusing an existing client.
    pub fn with_client(http_client: Client, base_url: &str) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|_| GatewayError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Build from the `[backend]` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(http_client, &config.base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Read the body, failing on non-2xx.
    async fn body_text(response: Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), "backend responded");
        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let body = Self::body_text(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Gateway for HttpGateway {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResponse, GatewayError> {
        let url = self.endpoint(&["schedule-notification"])?;
        tracing::debug!(
            token = token_prefix(&request.token),
            title = %request.title,
            frequency = %request.frequency,
            weekday = ?request.weekday,
            "scheduling notification"
        );

        let response = self.http_client.post(url).json(request).send().await?;
        Self::parse_json(response).await
    }

    async fn list_schedules(&self, token: &str) -> Result<Vec<BackendEntry>, GatewayError> {
        let url = self.endpoint(&["get-notifications", token])?;
        tracing::debug!(token = token_prefix(token), "fetching notifications");

        let response = self.http_client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        let listed: ListSchedulesResponse = Self::parse_json(response).await?;
        Ok(listed.notifications)
    }

    async fn delete_schedule(&self, job_id: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["scheduled-jobs", job_id])?;
        tracing::debug!(job_id, "deleting scheduled job");

        let response = self.http_client.delete(url).send().await?;
        Self::body_text(response).await.map(|_| ())
    }

    async fn register_identity(&self, token: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["register-token"])?;
        tracing::debug!(token = token_prefix(token), "registering token");

        let response = self
            .http_client
            .post(url)
            .json(&json!({ "token": token }))
            .send()
            .await?;
        Self::body_text(response).await.map(|_| ())
    }

    async fn list_tones(&self) -> Result<Vec<ToneOption>, GatewayError> {
        let url = self.endpoint(&["tones"])?;
        tracing::debug!("fetching tone catalog");

        let response = self.http_client.get(url).send().await?;
        let listed: ListTonesResponse = Self::parse_json(response).await?;
        Ok(listed.tones)
    }

    async fn tone_for_identity(&self, token: &str) -> Result<TonePreference, GatewayError> {
        let url = self.endpoint(&["user-tone", token])?;
        tracing::debug!(token = token_prefix(token), "fetching user tone");

        let response = self.http_client.get(url).send().await?;
        Self::parse_json(response).await
    }

    async fn set_tone_for_identity(&self, token: &str, tone_id: i64) -> Result<String, GatewayError> {
        let url = self.endpoint(&["user-tone"])?;
        tracing::debug!(token = token_prefix(token), tone_id, "setting user tone");

        let response = self
            .http_client
            .post(url)
            .json(&json!({ "token": token, "tone_id": tone_id }))
            .send()
            .await?;
        let confirmation: MessageResponse = Self::parse_json(response).await?;
        Ok(confirmation.message)
    }
}
