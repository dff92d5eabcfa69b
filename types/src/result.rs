//! The transient, per-call outcome of a provider status query.

use serde::{Deserialize, Serialize};

use crate::attributes::IdentityAttributes;

/// Coarse verdict reported by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationEvent {
    Accepted,
    Declined,
    Pending,
}

impl VerificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Pending => "pending",
        }
    }
}

/// One parsed verification outcome. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub event: VerificationEvent,
    /// Face-to-document match confidence, clamped to 0..=100.
    pub face_match_confidence: u8,
    pub attributes: IdentityAttributes,
    /// Provider's free-text reason on a declined verdict.
    pub declined_reason: Option<String>,
    /// The provider's own event name, kept for diagnostics.
    pub provider_event: String,
}

impl VerificationResult {
    pub fn pending(provider_event: impl Into<String>) -> Self {
        Self {
            event: VerificationEvent::Pending,
            face_match_confidence: 0,
            attributes: IdentityAttributes::default(),
            declined_reason: None,
            provider_event: provider_event.into(),
        }
    }
}
