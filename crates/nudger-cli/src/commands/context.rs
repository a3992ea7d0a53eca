//! Shared setup for commands that talk to the backend.

use std::sync::Arc;

use nudger_core::storage::{ClientConfig, TOKEN_ENV};
use nudger_core::sync::{PreferenceController, ToneController};
use nudger_core::HttpGateway;
use tokio::runtime::Runtime;

pub struct Context {
    pub config: ClientConfig,
    pub gateway: Arc<HttpGateway>,
    pub runtime: Runtime,
}

impl Context {
    /// Config from disk plus environment overrides, and a gateway for it.
    pub fn load() -> nudger_core::Result<Self> {
        let mut config = ClientConfig::load()?;
        config.apply_env_overrides();
        config.validate()?;

        let gateway = Arc::new(HttpGateway::from_config(&config.backend)?);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        tracing::debug!(base_url = %gateway.base_url(), "backend configured");

        Ok(Self {
            config,
            gateway,
            runtime,
        })
    }

    /// Configured push token, or an error explaining how to set one.
    pub fn require_token(&self) -> Result<&str, Box<dyn std::error::Error>> {
        match self.config.token() {
            "" => Err(format!(
                "no push token configured; run `nudger config set identity.token <token>` or set {TOKEN_ENV}"
            )
            .into()),
            token => Ok(token),
        }
    }

    pub fn preferences(&self) -> Result<PreferenceController<HttpGateway>, Box<dyn std::error::Error>> {
        let token = self.require_token()?;
        Ok(PreferenceController::new(Arc::clone(&self.gateway), token)
            .with_status_clear(self.config.status_clear_delay()))
    }

    /// Tone controller; the token may be empty.
    pub fn tones(&self) -> ToneController<HttpGateway> {
        ToneController::new(Arc::clone(&self.gateway), self.config.token())
    }
}
