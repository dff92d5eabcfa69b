//! The single decision engine shared by the poll and webhook paths.

use std::sync::Arc;

use kycgate_identity::FingerprintComputer;
use kycgate_store::{AccountRecord, AccountStore, StoreError, VerifiedFields};
use kycgate_types::{AccountId, Clock, KycParams, KycState, VerificationEvent, VerificationResult};

use crate::outcome::{OutcomeCode, ReconcileOutcome, ReconcileSource};
use crate::reward::{ReferralGrant, RewardTrigger};
use crate::VerificationError;

pub struct VerificationReconciler {
    store: Arc<dyn AccountStore>,
    fingerprints: FingerprintComputer,
    rewards: Arc<dyn RewardTrigger>,
    params: KycParams,
    clock: Arc<dyn Clock>,
}

impl VerificationReconciler {
    pub fn new(
        store: Arc<dyn AccountStore>,
        fingerprints: FingerprintComputer,
        rewards: Arc<dyn RewardTrigger>,
        params: KycParams,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            fingerprints,
            rewards,
            params,
            clock,
        }
    }

    pub fn params(&self) -> &KycParams {
        &self.params
    }

    /// Decide and commit the next state for `account_id`.
    ///
    /// Not idempotent: callers skip accounts that are already verified or
    /// suspended. Holds no lock; concurrent calls for accounts sharing an
    /// identity are arbitrated by the store's uniqueness constraint.
    pub fn reconcile(
        &self,
        account_id: &AccountId,
        result: &VerificationResult,
        source: ReconcileSource,
    ) -> Result<ReconcileOutcome, VerificationError> {
        let account = self
            .store
            .get_account(account_id)
            .map_err(VerificationError::from_store)?;

        let outcome = match result.event {
            VerificationEvent::Declined => self.declined(&account)?,
            VerificationEvent::Pending => {
                self.store
                    .set_kyc_state(account_id, KycState::Pending)
                    .map_err(VerificationError::from_store)?;
                ReconcileOutcome::pending()
            }
            VerificationEvent::Accepted => self.accepted(&account, result)?,
        };

        tracing::info!(
            account = %account_id,
            %source,
            provider_event = %result.provider_event,
            state = %outcome.next_state,
            code = outcome.code.map(|c| c.as_str()).unwrap_or("none"),
            "verification reconciled"
        );
        Ok(outcome)
    }

    /// A provider decline is not a rule-driven rejection and does not count
    /// toward suspension.
    fn declined(&self, account: &AccountRecord) -> Result<ReconcileOutcome, VerificationError> {
        self.store
            .set_kyc_state(&account.id, KycState::Rejected)
            .map_err(VerificationError::from_store)?;
        Ok(ReconcileOutcome::rejected(
            OutcomeCode::ProviderDeclined,
            self.params.remaining_attempts(account.rejection_count),
        ))
    }

    fn accepted(
        &self,
        account: &AccountRecord,
        result: &VerificationResult,
    ) -> Result<ReconcileOutcome, VerificationError> {
        let id = &account.id;

        if result.face_match_confidence < self.params.face_match_threshold {
            return self.reject(id, OutcomeCode::FaceMatchLowConfidence);
        }

        let Some(computed) = self.fingerprints.compute(&result.attributes) else {
            return self.reject(id, OutcomeCode::DocumentationMismatch);
        };
        let fingerprint = &computed.fingerprint;

        if let Some(holder) = self
            .store
            .find_by_fingerprint(fingerprint, id)
            .map_err(VerificationError::from_store)?
        {
            tracing::warn!(
                target: "security",
                account = %id,
                holder = %holder.id,
                fingerprint = fingerprint.short(),
                "identity already verified on another account"
            );
            return self.reject(id, OutcomeCode::DuplicateIdentity);
        }

        let fields = VerifiedFields {
            name: computed.identity.display_name.clone(),
            date_of_birth: computed.identity.date_of_birth.clone(),
            country: Some(computed.identity.country.clone()),
        };
        match self
            .store
            .commit_verification(id, fingerprint, &fields, self.clock.now())
        {
            Ok(()) => {}
            Err(StoreError::FingerprintConflict { holder, .. }) => {
                tracing::warn!(
                    target: "security",
                    account = %id,
                    %holder,
                    fingerprint = fingerprint.short(),
                    "lost concurrent claim on identity"
                );
                return self.reject(id, OutcomeCode::DuplicateIdentity);
            }
            Err(e) => return Err(VerificationError::from_store(e)),
        }

        if let Some(referrer) = &account.referred_by {
            self.rewards.trigger(ReferralGrant {
                referrer: referrer.clone(),
                referred: id.clone(),
                points: self.params.referral_bonus_points,
            });
        }

        Ok(ReconcileOutcome::verified())
    }

    fn reject(&self, id: &AccountId, code: OutcomeCode) -> Result<ReconcileOutcome, VerificationError> {
        let commit = self
            .store
            .increment_rejection(id, self.params.max_rejections)
            .map_err(VerificationError::from_store)?;

        if commit.state == KycState::Suspended {
            tracing::warn!(
                account = %id,
                rejections = commit.rejection_count,
                trigger = code.as_str(),
                "account suspended"
            );
            return Ok(ReconcileOutcome::suspended());
        }
        Ok(ReconcileOutcome::rejected(
            code,
            self.params.remaining_attempts(commit.rejection_count),
        ))
    }
}
