//! Nullable store — thread-safe in-memory storage for testing.
//!
//! One mutex guards accounts, the fingerprint index and sessions, so every
//! trait operation is atomic in the same way the LMDB backend's write
//! transactions are.

use kycgate_store::{
    AccountRecord, AccountStore, RejectionCommit, SessionStore, StoreError, VerifiedFields,
};
use kycgate_types::{AccountId, IdentityFingerprint, KycState, Timestamp, VerificationSession};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, AccountRecord>,
    fingerprints: HashMap<IdentityFingerprint, AccountId>,
    sessions: HashMap<AccountId, VerificationSession>,
}

/// An in-memory account + session store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, indexing its fingerprint if it is verified.
    pub fn insert(&self, record: AccountRecord) {
        let mut tables = self.tables.lock().unwrap();
        if let (true, Some(fp)) = (record.is_verified(), &record.fingerprint) {
            tables.fingerprints.insert(fp.clone(), record.id.clone());
        }
        tables.accounts.insert(record.id.clone(), record);
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current holder of `fingerprint` in the index.
    pub fn fingerprint_holder(&self, fingerprint: &IdentityFingerprint) -> Option<AccountId> {
        self.tables.lock().unwrap().fingerprints.get(fingerprint).cloned()
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        let out = f(&mut self.tables.lock().unwrap())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }
}

fn account_mut<'a>(
    tables: &'a mut Tables,
    id: &AccountId,
) -> Result<&'a mut AccountRecord, StoreError> {
    tables
        .accounts
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

fn release(tables: &mut Tables, fingerprint: &IdentityFingerprint, holder: &AccountId) {
    if tables.fingerprints.get(fingerprint) == Some(holder) {
        tables.fingerprints.remove(fingerprint);
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.write(|t| {
            t.accounts.insert(record.id.clone(), record.clone());
            Ok(())
        })
    }

    fn find_by_fingerprint(
        &self,
        fingerprint: &IdentityFingerprint,
        exclude: &AccountId,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .fingerprints
            .get(fingerprint)
            .filter(|holder| *holder != exclude)
            .and_then(|holder| tables.accounts.get(holder))
            .filter(|r| r.is_verified())
            .cloned())
    }

    fn commit_verification(
        &self,
        id: &AccountId,
        fingerprint: &IdentityFingerprint,
        fields: &VerifiedFields,
        verified_at: Timestamp,
    ) -> Result<(), StoreError> {
        self.write(|t| {
            if !t.accounts.contains_key(id) {
                return Err(StoreError::NotFound(id.clone()));
            }
            if let Some(holder) = t.fingerprints.get(fingerprint).filter(|h| *h != id) {
                return Err(StoreError::FingerprintConflict {
                    fingerprint: fingerprint.clone(),
                    holder: holder.clone(),
                });
            }
            let previous = t.accounts.get(id).and_then(|r| r.fingerprint.clone());
            if let Some(previous) = previous.filter(|p| p != fingerprint) {
                release(t, &previous, id);
            }
            account_mut(t, id)?.apply_verification(fingerprint.clone(), fields, verified_at);
            t.fingerprints.insert(fingerprint.clone(), id.clone());
            Ok(())
        })
    }

    fn increment_rejection(
        &self,
        id: &AccountId,
        suspend_threshold: u32,
    ) -> Result<RejectionCommit, StoreError> {
        self.write(|t| {
            let previous = account_mut(t, id)?.fingerprint.clone();
            if let Some(previous) = previous {
                release(t, &previous, id);
            }
            Ok(account_mut(t, id)?.apply_rejection(suspend_threshold))
        })
    }

    fn set_kyc_state(&self, id: &AccountId, state: KycState) -> Result<(), StoreError> {
        if state == KycState::Verified {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                state,
            });
        }
        self.write(|t| {
            account_mut(t, id)?.kyc_state = state;
            Ok(())
        })
    }

    fn add_points(&self, id: &AccountId, points: u64) -> Result<u64, StoreError> {
        self.write(|t| {
            let record = account_mut(t, id)?;
            record.points = record.points.saturating_add(points);
            Ok(record.points)
        })
    }
}

impl SessionStore for NullStore {
    fn put_session(&self, session: &VerificationSession) -> Result<(), StoreError> {
        self.write(|t| {
            t.sessions
                .insert(session.owner_account_id.clone(), session.clone());
            Ok(())
        })
    }

    fn latest_session(&self, owner: &AccountId) -> Result<Option<VerificationSession>, StoreError> {
        Ok(self.tables.lock().unwrap().sessions.get(owner).cloned())
    }
}
