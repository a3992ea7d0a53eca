//! TOML-based client configuration.
//!
//! Stores where the backend lives, which push token identifies this device,
//! and how long success messages stay on screen.
//!
//! Configuration is stored at `~/.config/nudger/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::data_dir;
use crate::error::ConfigError;

/// Overrides `backend.base_url` when set.
pub const BASE_URL_ENV: &str = "NUDGER_BASE_URL";
/// Overrides `identity.token` when set.
pub const TOKEN_ENV: &str = "NUDGER_TOKEN";

/// Scheduling backend connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Device identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Push token. Obtained outside this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Status line behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Seconds a success message stays up. 0 keeps it until replaced.
    #[serde(default = "default_clear_after")]
    pub clear_after_secs: u64,
}

/// Client configuration.
///
/// Serialized to/from TOML at `~/.config/nudger/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_clear_after() -> u64 {
    3
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            clear_after_secs: default_clear_after(),
        }
    }
}

impl ClientConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let new_value = match obj.get(part) {
                    Some(serde_json::Value::Number(_)) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    Some(serde_json::Value::Bool(_)) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    Some(serde_json::Value::Object(_)) => return Err(unknown()),
                    Some(_) => serde_json::Value::String(value.into()),
                    None => return Err(unknown()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Unset optional values read as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if key == "identity.token" {
            // Absent from the serialized form while unset.
            if let Some(identity) = json.get_mut("identity").and_then(|v| v.as_object_mut()) {
                identity.insert("token".to_string(), serde_json::Value::Null);
            }
        }
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: ClientConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every readable key with its current value.
    pub fn entries(&self) -> Vec<(String, String)> {
        [
            "backend.base_url",
            "backend.request_timeout_secs",
            "identity.token",
            "status.clear_after_secs",
        ]
        .into_iter()
        .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
        .collect()
    }

    /// Reject values that would make the client unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.backend.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "backend.base_url".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "backend.base_url".to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend.request_timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `NUDGER_BASE_URL` and `NUDGER_TOKEN` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, token: Option<String>) {
        if let Some(base_url) = base_url.filter(|v| !v.is_empty()) {
            self.backend.base_url = base_url;
        }
        if let Some(token) = token.filter(|v| !v.is_empty()) {
            self.identity.token = Some(token);
        }
    }

    /// Push token, or empty if none is configured.
    pub fn token(&self) -> &str {
        self.identity.token.as_deref().unwrap_or("")
    }

    /// Delay before success messages clear; `None` when disabled.
    pub fn status_clear_delay(&self) -> Option<Duration> {
        match self.status.clear_after_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
