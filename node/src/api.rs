//! Bridges [`KycService`] into the RPC layer's [`KycApi`].

use async_trait::async_trait;
use kycgate_rpc::{
    CreateVerificationResponse, KycApi, RpcError, VerificationStatusResponse, WebhookResponse,
};
use kycgate_store::StoreError;
use kycgate_types::AccountId;
use kycgate_verification::{OutcomeCode, ReconcileOutcome, VerificationError, SUSPENDED_MESSAGE};

use crate::service::KycService;
use crate::ServiceError;

impl From<ServiceError> for RpcError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::AccountNotFound(_)
            | ServiceError::UnknownReference(_)
            | ServiceError::Store(StoreError::NotFound(_))
            | ServiceError::Verification(VerificationError::AccountNotFound(_)) => {
                RpcError::NotFound(e.to_string())
            }
            ServiceError::AccountSuspended(_) => RpcError::Forbidden {
                code: Some(OutcomeCode::AccountSuspended.as_str().into()),
                message: SUSPENDED_MESSAGE.into(),
            },
            ServiceError::DuplicateIdentity {
                remaining_attempts, ..
            } => RpcError::Conflict {
                code: Some(OutcomeCode::DuplicateIdentity.as_str().into()),
                message: OutcomeCode::DuplicateIdentity.remediation_hint().into(),
                remaining_attempts: Some(remaining_attempts),
            },
            ServiceError::AlreadyVerified(_) => RpcError::conflict(e.to_string()),
            ServiceError::Unauthorized => RpcError::Unauthorized,
            ServiceError::MalformedWebhook(_) => RpcError::InvalidRequest(e.to_string()),
            ServiceError::Provider(_) => RpcError::Upstream(e.to_string()),
            other => RpcError::Server(other.to_string()),
        }
    }
}

fn status_response(outcome: &ReconcileOutcome) -> VerificationStatusResponse {
    VerificationStatusResponse {
        kyc_state: outcome.next_state,
        code: outcome.code.map(|c| c.as_str().to_string()),
        message: outcome.message().map(str::to_string),
        remaining_attempts: outcome.remaining_attempts,
    }
}

#[async_trait]
impl KycApi for KycService {
    async fn create_verification(
        &self,
        account_id: &AccountId,
    ) -> Result<CreateVerificationResponse, RpcError> {
        let created = KycService::create_verification(self, account_id).await?;
        Ok(CreateVerificationResponse {
            verification_url: created.verification_url,
            reference: created.reference.to_string(),
        })
    }

    async fn check_status(
        &self,
        account_id: &AccountId,
    ) -> Result<VerificationStatusResponse, RpcError> {
        let outcome = KycService::check_status(self, account_id).await?;
        Ok(status_response(&outcome))
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookResponse, RpcError> {
        let report = KycService::handle_webhook(self, body, signature).await?;
        Ok(WebhookResponse {
            reference: report.reference.to_string(),
            kyc_state: report.outcome.next_state,
            code: report.outcome.code.map(|c| c.as_str().to_string()),
        })
    }
}
