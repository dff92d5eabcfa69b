//! Reconciler behaviour against the in-memory store.

use std::sync::{Arc, Barrier, Mutex};

use kycgate_identity::FingerprintComputer;
use kycgate_nullables::{NullClock, NullStore};
use kycgate_store::{
    AccountRecord, AccountStore, RejectionCommit, StoreError, VerifiedFields,
};
use kycgate_types::{
    AccountId, IdentityAttributes, IdentityFingerprint, KycParams, KycState, RawDate, SecretKey,
    Timestamp, VerificationEvent, VerificationResult,
};
use kycgate_verification::{
    OutcomeCode, ReconcileOutcome, ReconcileSource, ReferralGrant, RewardTrigger,
    VerificationError, VerificationReconciler,
};

#[derive(Default)]
struct RecordingRewards(Mutex<Vec<ReferralGrant>>);

impl RewardTrigger for RecordingRewards {
    fn trigger(&self, grant: ReferralGrant) {
        self.0.lock().unwrap().push(grant);
    }
}

fn id(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn attributes(given: &str) -> IdentityAttributes {
    IdentityAttributes {
        country: Some("NG".into()),
        date_of_birth: Some(RawDate::Text("1990-05-17".into())),
        given_name: Some(given.into()),
        family_name: Some("Obi".into()),
        full_name: None,
        document_number: Some("A123".into()),
    }
}

fn accepted(confidence: u8, attrs: IdentityAttributes) -> VerificationResult {
    VerificationResult {
        event: VerificationEvent::Accepted,
        face_match_confidence: confidence,
        attributes: attrs,
        declined_reason: None,
        provider_event: "verification.accepted".into(),
    }
}

fn declined() -> VerificationResult {
    VerificationResult {
        event: VerificationEvent::Declined,
        face_match_confidence: 0,
        attributes: IdentityAttributes::default(),
        declined_reason: Some("Document expired".into()),
        provider_event: "verification.declined".into(),
    }
}

struct Harness {
    store: Arc<NullStore>,
    rewards: Arc<RecordingRewards>,
    reconciler: VerificationReconciler,
}

fn harness_with(store: Arc<dyn AccountStore>, null: Arc<NullStore>) -> Harness {
    let rewards = Arc::new(RecordingRewards::default());
    let reconciler = VerificationReconciler::new(
        store,
        FingerprintComputer::new(SecretKey::from("reconciler-test-key")),
        rewards.clone(),
        KycParams::default(),
        Arc::new(NullClock::default()),
    );
    Harness {
        store: null,
        rewards,
        reconciler,
    }
}

fn harness() -> Harness {
    let store = Arc::new(NullStore::new());
    harness_with(store.clone(), store)
}

#[test]
fn accepted_verifies_and_writes_profile() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "placeholder"));

    let out = h
        .reconciler
        .reconcile(&id("a"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();

    assert_eq!(out, ReconcileOutcome::verified());
    let rec = h.store.get_account(&id("a")).unwrap();
    assert_eq!(rec.kyc_state, KycState::Verified);
    assert_eq!(rec.name, "Ada Obi");
    assert_eq!(rec.date_of_birth.as_deref(), Some("1990-05-17"));
    assert!(rec.fingerprint.is_some());
    assert!(rec.verified_at.is_some());
    assert!(h.rewards.0.lock().unwrap().is_empty());
}

#[test]
fn scenario_a_fifth_rejection_suspends() {
    let h = harness();
    let mut rec = AccountRecord::new(id("a"), "a");
    rec.rejection_count = 4;
    h.store.insert(rec);

    let out = h
        .reconciler
        .reconcile(&id("a"), &accepted(60, attributes("Ada")), ReconcileSource::Webhook)
        .unwrap();

    assert_eq!(out.next_state, KycState::Suspended);
    assert_eq!(out.code, Some(OutcomeCode::AccountSuspended));
    let rec = h.store.get_account(&id("a")).unwrap();
    assert_eq!(rec.rejection_count, 5);
    assert_eq!(rec.kyc_state, KycState::Suspended);
}

#[test]
fn low_confidence_reports_remaining_attempts() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));

    let out = h
        .reconciler
        .reconcile(&id("a"), &accepted(79, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();
    assert_eq!(out, ReconcileOutcome::rejected(OutcomeCode::FaceMatchLowConfidence, 4));
}

#[test]
fn confidence_at_threshold_verifies() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));

    let out = h
        .reconciler
        .reconcile(&id("a"), &accepted(80, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();
    assert_eq!(out, ReconcileOutcome::verified());
    let rec = h.store.get_account(&id("a")).unwrap();
    assert_eq!(rec.kyc_state, KycState::Verified);
    assert_eq!(rec.rejection_count, 0);
}

#[test]
fn scenario_b_duplicate_identity_rejects_second_account() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));
    h.store.insert(AccountRecord::new(id("b"), "b"));
    h.reconciler
        .reconcile(&id("a"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();
    let a_before = h.store.get_account(&id("a")).unwrap();

    // Same identity, different shape.
    let mut shape = attributes("  ADA ");
    shape.country = Some("Nigeria".into());
    shape.document_number = Some("a-123".into());
    let out = h
        .reconciler
        .reconcile(&id("b"), &accepted(95, shape), ReconcileSource::Webhook)
        .unwrap();

    assert_eq!(out, ReconcileOutcome::rejected(OutcomeCode::DuplicateIdentity, 4));
    let b = h.store.get_account(&id("b")).unwrap();
    assert_eq!(b.kyc_state, KycState::Rejected);
    assert_eq!(b.rejection_count, 1);
    assert!(b.fingerprint.is_none());
    assert_eq!(h.store.get_account(&id("a")).unwrap(), a_before);
}

#[test]
fn scenario_c_concurrent_race_has_one_winner() {
    for _ in 0..20 {
        let h = Arc::new(harness());
        h.store.insert(AccountRecord::new(id("a"), "a"));
        h.store.insert(AccountRecord::new(id("b"), "b"));

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|who| {
                let h = Arc::clone(&h);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    h.reconciler
                        .reconcile(&id(who), &accepted(95, attributes("Ada")), ReconcileSource::Webhook)
                        .unwrap()
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();

        let verified = outcomes.iter().filter(|o| o.next_state == KycState::Verified).count();
        assert_eq!(verified, 1);
        let loser = outcomes.iter().find(|o| o.next_state != KycState::Verified).unwrap();
        assert_eq!(loser.next_state, KycState::Rejected);
        assert_eq!(loser.code, Some(OutcomeCode::DuplicateIdentity));
    }
}

/// Pre-check that never sees the other account, as when it loses a race.
struct StalePrecheck(Arc<NullStore>);

impl AccountStore for StalePrecheck {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        self.0.get_account(id)
    }
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.0.put_account(record)
    }
    fn find_by_fingerprint(
        &self,
        _fingerprint: &IdentityFingerprint,
        _exclude: &AccountId,
    ) -> Result<Option<AccountRecord>, StoreError> {
        Ok(None)
    }
    fn commit_verification(
        &self,
        id: &AccountId,
        fingerprint: &IdentityFingerprint,
        fields: &VerifiedFields,
        verified_at: Timestamp,
    ) -> Result<(), StoreError> {
        self.0.commit_verification(id, fingerprint, fields, verified_at)
    }
    fn increment_rejection(
        &self,
        id: &AccountId,
        suspend_threshold: u32,
    ) -> Result<RejectionCommit, StoreError> {
        self.0.increment_rejection(id, suspend_threshold)
    }
    fn set_kyc_state(&self, id: &AccountId, state: KycState) -> Result<(), StoreError> {
        self.0.set_kyc_state(id, state)
    }
    fn add_points(&self, id: &AccountId, points: u64) -> Result<u64, StoreError> {
        self.0.add_points(id, points)
    }
}

#[test]
fn commit_conflict_is_authoritative() {
    let null = Arc::new(NullStore::new());
    let h = harness_with(Arc::new(StalePrecheck(null.clone())), null);
    h.store.insert(AccountRecord::new(id("a"), "a"));
    h.store.insert(AccountRecord::new(id("b"), "b"));

    h.reconciler
        .reconcile(&id("a"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();
    let out = h
        .reconciler
        .reconcile(&id("b"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();

    assert_eq!(out, ReconcileOutcome::rejected(OutcomeCode::DuplicateIdentity, 4));
    assert_eq!(h.store.get_account(&id("b")).unwrap().rejection_count, 1);
}

#[test]
fn missing_attributes_is_documentation_mismatch() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));
    let mut attrs = attributes("Ada");
    attrs.date_of_birth = None;

    let out = h
        .reconciler
        .reconcile(&id("a"), &accepted(95, attrs), ReconcileSource::Poll)
        .unwrap();
    assert_eq!(out, ReconcileOutcome::rejected(OutcomeCode::DocumentationMismatch, 4));
}

#[test]
fn declined_does_not_count_toward_suspension() {
    let h = harness();
    let mut rec = AccountRecord::new(id("a"), "a");
    rec.rejection_count = 4;
    h.store.insert(rec);

    let out = h
        .reconciler
        .reconcile(&id("a"), &declined(), ReconcileSource::Webhook)
        .unwrap();
    assert_eq!(out, ReconcileOutcome::rejected(OutcomeCode::ProviderDeclined, 1));
    let rec = h.store.get_account(&id("a")).unwrap();
    assert_eq!(rec.rejection_count, 4);
    assert_eq!(rec.kyc_state, KycState::Rejected);
}

#[test]
fn pending_marks_account_pending() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));
    let out = h
        .reconciler
        .reconcile(&id("a"), &VerificationResult::pending("request.pending"), ReconcileSource::Poll)
        .unwrap();
    assert_eq!(out, ReconcileOutcome::pending());
    assert_eq!(h.store.get_account(&id("a")).unwrap().kyc_state, KycState::Pending);
}

#[test]
fn scenario_d_unknown_account_writes_nothing() {
    let h = harness();
    let err = h
        .reconciler
        .reconcile(&id("ghost"), &accepted(95, attributes("Ada")), ReconcileSource::Webhook)
        .unwrap_err();
    assert!(matches!(err, VerificationError::AccountNotFound(_)));
    assert_eq!(h.store.write_count(), 0);
}

#[test]
fn storage_failure_is_retryable_and_writes_nothing() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("a"), "a"));
    h.store.fail_writes(true);

    let err = h
        .reconciler
        .reconcile(&id("a"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap_err();
    assert!(matches!(err, VerificationError::Persistence(_)));
    h.store.fail_writes(false);
    let rec = h.store.get_account(&id("a")).unwrap();
    assert_eq!(rec.kyc_state, KycState::NotStarted);
    assert_eq!(rec.rejection_count, 0);
}

#[test]
fn referral_grant_fires_once_on_verification() {
    let h = harness();
    h.store.insert(AccountRecord::new(id("referrer"), "r"));
    h.store
        .insert(AccountRecord::new(id("a"), "a").with_referrer(id("referrer")));

    h.reconciler
        .reconcile(&id("a"), &accepted(95, attributes("Ada")), ReconcileSource::Poll)
        .unwrap();

    let grants = h.rewards.0.lock().unwrap().clone();
    assert_eq!(
        grants,
        vec![ReferralGrant {
            referrer: id("referrer"),
            referred: id("a"),
            points: 50,
        }]
    );
}
