//! The KYC service: session creation, status polls and webhook handling.
//!
//! Both verdict channels follow the same shape: load the account, skip the
//! provider entirely unless the latest session still awaits a verdict,
//! otherwise fetch the verdict from the provider and hand it to the shared
//! reconciler. A session is concluded at most once; later polls and webhook
//! deliveries for it are answered from storage.

use std::sync::Arc;

use kycgate_crypto::{check_signature, SignatureCheck};
use kycgate_provider::{
    ApplicantContext, CreatedSession, ProviderError, ProviderGateway, WebhookNotification,
};
use kycgate_store::{AccountRecord, AccountStore, SessionStore, StoreError};
use kycgate_types::{
    AccountId, Clock, KycState, SecretKey, SessionReference, VerificationResult,
    VerificationSession,
};
use kycgate_verification::{
    OutcomeCode, ReconcileOutcome, ReconcileSource, VerificationReconciler,
};

use crate::metrics::KycMetrics;
use crate::ServiceError;

/// Everything a [`KycService`] is built from.
pub struct ServiceParts {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub gateway: Arc<dyn ProviderGateway>,
    pub reconciler: Arc<VerificationReconciler>,
    pub webhook_secret: SecretKey,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<KycMetrics>,
}

/// Result of a webhook that was processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookReport {
    pub reference: SessionReference,
    pub outcome: ReconcileOutcome,
}

pub struct KycService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    gateway: Arc<dyn ProviderGateway>,
    reconciler: Arc<VerificationReconciler>,
    webhook_secret: SecretKey,
    clock: Arc<dyn Clock>,
    metrics: Arc<KycMetrics>,
}

impl KycService {
    pub fn new(parts: ServiceParts) -> Self {
        Self {
            accounts: parts.accounts,
            sessions: parts.sessions,
            gateway: parts.gateway,
            reconciler: parts.reconciler,
            webhook_secret: parts.webhook_secret,
            clock: parts.clock,
            metrics: parts.metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<KycMetrics> {
        &self.metrics
    }

    /// Open a provider session for `account_id` and mark the account pending.
    pub async fn create_verification(
        &self,
        account_id: &AccountId,
    ) -> Result<CreatedSession, ServiceError> {
        let account = self.load(account_id)?;
        if !account.kyc_state.allows_new_attempt() {
            return Err(match account.kyc_state {
                KycState::Verified => ServiceError::AlreadyVerified(account_id.clone()),
                _ => ServiceError::AccountSuspended(account_id.clone()),
            });
        }

        let applicant = ApplicantContext {
            account_id: account_id.clone(),
            email: account.email.clone(),
            country: account.country.clone(),
            full_name: Some(account.name.clone()).filter(|n| !n.trim().is_empty()),
            language: None,
        };
        let timer = self.metrics.provider_latency_seconds.start_timer();
        let created = self.gateway.create_session(&applicant).await;
        timer.observe_duration();
        let created = created.map_err(|e| self.provider_failure("create_session", e))?;

        self.sessions.put_session(&VerificationSession {
            reference: created.reference.clone(),
            owner_account_id: account_id.clone(),
            created_at: self.clock.now(),
        })?;
        self.accounts.set_kyc_state(account_id, KycState::Pending)?;
        self.metrics.sessions_created.inc();

        tracing::info!(
            account = %account_id,
            reference = %created.reference,
            "verification session opened"
        );
        Ok(created)
    }

    /// Poll the provider for the latest session and reconcile the verdict.
    ///
    /// Only a pending session reaches the provider. Verified, rejected and
    /// suspended accounts are answered from storage, so repeated polls never
    /// count the same verdict twice.
    pub async fn check_status(
        &self,
        account_id: &AccountId,
    ) -> Result<ReconcileOutcome, ServiceError> {
        let account = self.load(account_id)?;
        if !account.kyc_state.awaits_verdict() {
            return Ok(self.stored_outcome(&account));
        }
        let Some(session) = self.sessions.latest_session(account_id)? else {
            return Ok(self.stored_outcome(&account));
        };

        let result = self.fetch(&session.reference).await?;
        self.reconcile(account_id, &result, ReconcileSource::Poll)
    }

    /// Authenticate, parse and apply a provider webhook.
    ///
    /// The signature covers `body` exactly as received, so it is checked
    /// before anything is parsed. The verdict is always re-fetched from the
    /// provider; the webhook itself only names the session.
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookReport, ServiceError> {
        match check_signature(body, self.webhook_secret.expose(), signature) {
            SignatureCheck::Valid => {}
            check => {
                self.metrics.webhook_auth_failures.inc();
                tracing::warn!(
                    target: "security",
                    ?check,
                    body_len = body.len(),
                    "webhook signature rejected"
                );
                return Err(ServiceError::Unauthorized);
            }
        }

        let notification: WebhookNotification = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedWebhook(e.to_string()))?;
        let reference = notification.reference;
        if reference.prefix() != self.reconciler.params().reference_prefix {
            return Err(ServiceError::UnknownReference(reference));
        }

        let owner = reference.owner().clone();
        let account = self.load(&owner)?;
        if account.kyc_state == KycState::Suspended {
            return Err(ServiceError::AccountSuspended(owner));
        }
        let Some(latest) = self.sessions.latest_session(&owner)? else {
            return Err(ServiceError::UnknownReference(reference));
        };
        if latest.reference != reference || !account.kyc_state.awaits_verdict() {
            tracing::debug!(
                account = %owner,
                %reference,
                latest = %latest.reference,
                state = %account.kyc_state,
                "webhook for concluded session ignored"
            );
            return Ok(WebhookReport {
                reference,
                outcome: self.stored_outcome(&account),
            });
        }

        tracing::debug!(
            account = %owner,
            %reference,
            event = %notification.event,
            "webhook accepted"
        );
        let result = self.fetch(&reference).await?;
        let outcome = self.reconcile(&owner, &result, ReconcileSource::Webhook)?;
        if outcome.code == Some(OutcomeCode::DuplicateIdentity) {
            return Err(ServiceError::DuplicateIdentity {
                reference,
                remaining_attempts: outcome.remaining_attempts.unwrap_or(0),
            });
        }
        Ok(WebhookReport { reference, outcome })
    }

    fn load(&self, account_id: &AccountId) -> Result<AccountRecord, ServiceError> {
        self.accounts.get_account(account_id).map_err(|e| match e {
            StoreError::NotFound(id) => ServiceError::AccountNotFound(id),
            other => other.into(),
        })
    }

    async fn fetch(&self, reference: &SessionReference) -> Result<VerificationResult, ServiceError> {
        let timer = self.metrics.provider_latency_seconds.start_timer();
        let result = self.gateway.fetch_status(reference).await;
        timer.observe_duration();
        result.map_err(|e| self.provider_failure("fetch_status", e))
    }

    fn reconcile(
        &self,
        account_id: &AccountId,
        result: &VerificationResult,
        source: ReconcileSource,
    ) -> Result<ReconcileOutcome, ServiceError> {
        let outcome = self.reconciler.reconcile(account_id, result, source)?;
        self.metrics.record_outcome(source, &outcome);
        Ok(outcome)
    }

    fn provider_failure(&self, operation: &'static str, error: ProviderError) -> ServiceError {
        self.metrics
            .provider_errors
            .with_label_values(&[operation])
            .inc();
        tracing::warn!(
            operation,
            retryable = error.is_retryable(),
            error = %error,
            "provider call failed"
        );
        error.into()
    }

    fn stored_outcome(&self, account: &AccountRecord) -> ReconcileOutcome {
        match account.kyc_state {
            KycState::Verified => ReconcileOutcome::verified(),
            KycState::Suspended => ReconcileOutcome::suspended(),
            KycState::Rejected => ReconcileOutcome {
                next_state: KycState::Rejected,
                code: None,
                remaining_attempts: Some(
                    self.reconciler
                        .params()
                        .remaining_attempts(account.rejection_count),
                ),
            },
            state => ReconcileOutcome {
                next_state: state,
                code: None,
                remaining_attempts: None,
            },
        }
    }
}
