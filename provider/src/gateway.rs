use async_trait::async_trait;
use kycgate_types::{AccountId, SessionReference, VerificationResult};

use crate::ProviderError;

/// What the platform tells the provider about the applicant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicantContext {
    pub account_id: AccountId,
    pub email: Option<String>,
    pub country: Option<String>,
    pub full_name: Option<String>,
    pub language: Option<String>,
}

impl ApplicantContext {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            email: None,
            country: None,
            full_name: None,
            language: None,
        }
    }
}

/// A freshly opened provider session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedSession {
    pub reference: SessionReference,
    /// Hosted flow the user is sent to.
    pub verification_url: String,
}

/// Outbound calls to the verification provider.
///
/// Both the poll path and the webhook path use [`ProviderGateway::fetch_status`];
/// webhook payloads are never trusted for identity data.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn create_session(
        &self,
        applicant: &ApplicantContext,
    ) -> Result<CreatedSession, ProviderError>;

    async fn fetch_status(
        &self,
        reference: &SessionReference,
    ) -> Result<VerificationResult, ProviderError>;
}
