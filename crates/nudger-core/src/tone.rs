//! Notification tone types.

use serde::{Deserialize, Serialize};

/// One persona the backend can write notification text in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneOption {
    pub tone_id: i64,
    pub tone_name: String,
    pub display_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The tone applied to one identity. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonePreference {
    pub token: String,
    #[serde(rename = "tone")]
    pub tone_name: String,
    pub tone_id: i64,
    #[serde(default)]
    pub is_default: bool,
}
