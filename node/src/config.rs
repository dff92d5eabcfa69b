//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use kycgate_provider::ProviderConfig;
use kycgate_types::{KycParams, SecretKey};

use crate::ServiceError;

/// Configuration for a kycgate node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Secrets are never written back
/// out by [`NodeConfig::to_toml_string`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Shared secret for inbound webhook signatures.
    #[serde(default, skip_serializing)]
    pub webhook_secret: SecretKey,

    /// Header carrying the inbound webhook signature.
    #[serde(default = "default_signature_header")]
    pub webhook_signature_header: String,

    /// Server-side key for identity fingerprints. Rotating it orphans every
    /// stored fingerprint.
    #[serde(default, skip_serializing)]
    pub fingerprint_secret: SecretKey,

    /// Directory for per-day provider exchange logs. Disabled when unset.
    #[serde(default)]
    pub diagnostics_dir: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub params: KycParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./kycgate_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_signature_header() -> String {
    "signature".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ServiceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string, secrets omitted.
    pub fn to_toml_string(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Check the settings a running node cannot do without.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.webhook_secret.is_empty() {
            return Err(ServiceError::Config("webhook_secret is not set".into()));
        }
        if self.fingerprint_secret.is_empty() {
            return Err(ServiceError::Config("fingerprint_secret is not set".into()));
        }
        if self.provider.secret_key.is_empty() {
            return Err(ServiceError::Config("provider.secret_key is not set".into()));
        }
        if self.params.face_match_threshold > 100 {
            return Err(ServiceError::Config(format!(
                "params.face_match_threshold {} is above 100",
                self.params.face_match_threshold
            )));
        }
        if self.params.max_rejections == 0 {
            return Err(ServiceError::Config("params.max_rejections must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            webhook_secret: SecretKey::default(),
            webhook_signature_header: default_signature_header(),
            fingerprint_secret: SecretKey::default(),
            diagnostics_dir: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            provider: ProviderConfig::default(),
            params: KycParams::default(),
        }
    }
}
