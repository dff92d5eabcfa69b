//! Request and response bodies exchanged with the provider.

use kycgate_types::SessionReference;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST {base}/` body.
#[derive(Debug, Serialize)]
pub struct SessionRequest<'a> {
    pub reference: &'a str,
    pub callback_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<&'a str>,
    pub applicant_attributes: ApplicantAttributes<'a>,
    pub capability_flags: CapabilityFlags,
}

/// What the platform already knows about the applicant. Pre-fills the hosted
/// flow; the provider verifies against the document, not these values.
#[derive(Debug, Serialize)]
pub struct ApplicantAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

/// Which checks the provider should run.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CapabilityFlags {
    pub document: bool,
    pub face: bool,
    pub allow_offline: bool,
    pub allow_online: bool,
}

impl Default for CapabilityFlags {
    fn default() -> Self {
        Self {
            document: true,
            face: true,
            allow_offline: false,
            allow_online: true,
        }
    }
}

/// Synchronous reply to a session request.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub verification_url: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// `POST {base}/status` body.
#[derive(Debug, Serialize)]
pub struct StatusRequest<'a> {
    pub reference: &'a str,
}

/// Asynchronous webhook body. Only `reference` and `event` are trusted; the
/// verdict itself is always re-fetched through the status call.
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookNotification {
    pub reference: SessionReference,
    pub event: String,
    #[serde(default)]
    pub verification_result: Option<Value>,
    #[serde(default)]
    pub declined_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_request_omits_absent_fields() {
        let req = SessionRequest {
            reference: "kyc-a-1",
            callback_url: "https://example.test/webhooks/kyc",
            redirect_url: None,
            applicant_attributes: ApplicantAttributes {
                email: Some("a@example.test"),
                country: None,
                full_name: None,
                language: None,
            },
            capability_flags: CapabilityFlags::default(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("redirect_url").is_none());
        assert_eq!(v["applicant_attributes"]["email"], "a@example.test");
        assert!(v["applicant_attributes"].get("country").is_none());
        assert_eq!(v["capability_flags"]["face"], true);
    }

    #[test]
    fn webhook_requires_wellformed_reference() {
        let ok: WebhookNotification = serde_json::from_str(
            r#"{"reference":"kyc-user-1-1700000000000","event":"verification.accepted"}"#,
        )
        .unwrap();
        assert_eq!(ok.reference.owner().as_str(), "user-1");
        assert!(serde_json::from_str::<WebhookNotification>(
            r#"{"reference":"garbage","event":"verification.accepted"}"#
        )
        .is_err());
    }
}
