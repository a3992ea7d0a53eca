mod config;

pub use config::{BackendConfig, ClientConfig, IdentityConfig, StatusConfig, BASE_URL_ENV, TOKEN_ENV};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/nudger[-dev]/` based on NUDGER_ENV.
///
/// Set NUDGER_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NUDGER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("nudger-dev")
    } else {
        base_dir.join("nudger")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
