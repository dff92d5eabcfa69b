use std::time::Duration;

use kycgate_types::SecretKey;
use serde::{Deserialize, Serialize};

/// What to do when a provider response carries a missing or wrong signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAuthenticity {
    /// Reject the response.
    #[default]
    Enforce,
    /// Log a security warning and use the response anyway.
    Warn,
}

/// Connection settings for the provider API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path under `base_url` that opens a session.
    #[serde(default = "default_session_path")]
    pub session_path: String,

    /// Path under `base_url` that returns a session's status.
    #[serde(default = "default_status_path")]
    pub status_path: String,

    #[serde(default)]
    pub client_id: String,

    /// Used for basic auth and for response signatures.
    #[serde(default, skip_serializing)]
    pub secret_key: SecretKey,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub response_auth: ResponseAuthenticity,

    /// Header carrying the response signature.
    #[serde(default = "default_signature_header")]
    pub signature_header: String,

    /// Where the provider posts webhook notifications.
    #[serde(default)]
    pub callback_url: String,

    /// Where the provider sends the user after the hosted flow.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_path: default_session_path(),
            status_path: default_status_path(),
            client_id: String::new(),
            secret_key: SecretKey::default(),
            timeout_secs: default_timeout_secs(),
            response_auth: ResponseAuthenticity::default(),
            signature_header: default_signature_header(),
            callback_url: String::new(),
            redirect_url: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.shuftipro.com".to_string()
}

fn default_session_path() -> String {
    "session".to_string()
}

fn default_status_path() -> String {
    "status".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

pub(crate) fn default_signature_header() -> String {
    "signature".to_string()
}
