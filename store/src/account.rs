//! Account KYC state storage trait.

use crate::StoreError;
use kycgate_types::{AccountId, IdentityFingerprint, KycState, Timestamp};
use serde::{Deserialize, Serialize};

/// The slice of a platform account this service reads and writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub kyc_state: KycState,
    /// Never decreases.
    pub rejection_count: u32,
    /// Set only while `kyc_state` is verified.
    pub fingerprint: Option<IdentityFingerprint>,
    /// Account that referred this one, if any.
    pub referred_by: Option<AccountId>,
    /// Display name; overwritten with the verified name on success.
    pub name: String,
    /// Verified date of birth, `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub points: u64,
    pub verified_at: Option<Timestamp>,
}

impl AccountRecord {
    /// A fresh account that has not started verification.
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            kyc_state: KycState::NotStarted,
            rejection_count: 0,
            fingerprint: None,
            referred_by: None,
            name: name.into(),
            date_of_birth: None,
            email: None,
            country: None,
            points: 0,
            verified_at: None,
        }
    }

    pub fn with_referrer(mut self, referrer: AccountId) -> Self {
        self.referred_by = Some(referrer);
        self
    }

    pub fn is_verified(&self) -> bool {
        self.kyc_state == KycState::Verified
    }

    /// Apply a successful verification to the record in place.
    pub fn apply_verification(
        &mut self,
        fingerprint: IdentityFingerprint,
        fields: &VerifiedFields,
        verified_at: Timestamp,
    ) {
        self.kyc_state = KycState::Verified;
        self.fingerprint = Some(fingerprint);
        self.name = fields.name.clone();
        self.date_of_birth = Some(fields.date_of_birth.clone());
        if let Some(country) = &fields.country {
            self.country = Some(country.clone());
        }
        self.verified_at = Some(verified_at);
    }

    /// Apply one rejection in place and return the resulting commit.
    pub fn apply_rejection(&mut self, suspend_threshold: u32) -> RejectionCommit {
        self.rejection_count = self.rejection_count.saturating_add(1);
        self.fingerprint = None;
        self.kyc_state = if self.rejection_count >= suspend_threshold {
            KycState::Suspended
        } else {
            KycState::Rejected
        };
        RejectionCommit {
            rejection_count: self.rejection_count,
            state: self.kyc_state,
        }
    }
}

/// Profile fields written alongside a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedFields {
    pub name: String,
    pub date_of_birth: String,
    pub country: Option<String>,
}

/// Result of an atomic rejection increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RejectionCommit {
    pub rejection_count: u32,
    pub state: KycState,
}

/// Trait for account KYC state storage.
///
/// `commit_verification` and `increment_rejection` must each be atomic with
/// respect to concurrent callers; no in-process lock is held above the store.
pub trait AccountStore: Send + Sync {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError>;
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError>;

    fn exists(&self, id: &AccountId) -> Result<bool, StoreError> {
        match self.get_account(id) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// The verified account holding `fingerprint`, other than `exclude`.
    fn find_by_fingerprint(
        &self,
        fingerprint: &IdentityFingerprint,
        exclude: &AccountId,
    ) -> Result<Option<AccountRecord>, StoreError>;

    /// Mark `id` verified under `fingerprint`.
    ///
    /// Fails with [`StoreError::FingerprintConflict`] when another account already
    /// holds the fingerprint, and [`StoreError::NotFound`] for an unknown account.
    /// Nothing is written on failure.
    fn commit_verification(
        &self,
        id: &AccountId,
        fingerprint: &IdentityFingerprint,
        fields: &VerifiedFields,
        verified_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Increment the rejection count, clear the fingerprint, and move to
    /// suspended once the new count reaches `suspend_threshold`.
    fn increment_rejection(
        &self,
        id: &AccountId,
        suspend_threshold: u32,
    ) -> Result<RejectionCommit, StoreError>;

    fn set_kyc_state(&self, id: &AccountId, state: KycState) -> Result<(), StoreError>;

    /// Credit points and return the new balance.
    fn add_points(&self, id: &AccountId, points: u64) -> Result<u64, StoreError>;
}
