//! LMDB implementation of AccountStore.
//!
//! Two databases back this store: `accounts` (account id → record) and
//! `fingerprints` (fingerprint → holder). Every mutation that touches a
//! fingerprint updates both inside one write transaction; LMDB admits a single
//! writer at a time, so check-and-claim in `commit_verification` is atomic.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use kycgate_store::{AccountRecord, AccountStore, RejectionCommit, StoreError, VerifiedFields};
use kycgate_types::{AccountId, IdentityFingerprint, KycState, Timestamp};

use crate::codec::{decode_account_id, encode, read_account};
use crate::LmdbError;

pub struct LmdbAccountStore {
    pub(crate) env: Arc<Env>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) fingerprints_db: Database<Bytes, Bytes>,
}

impl LmdbAccountStore {
    fn write_account(&self, wtxn: &mut RwTxn, record: &AccountRecord) -> Result<(), StoreError> {
        let bytes = encode(record)?;
        self.accounts_db
            .put(wtxn, record.id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Remove `fingerprint` from the index if `holder` owns it.
    fn release_fingerprint(
        &self,
        wtxn: &mut RwTxn,
        fingerprint: &IdentityFingerprint,
        holder: &AccountId,
    ) -> Result<(), StoreError> {
        let key = fingerprint.as_str().as_bytes();
        let owned = match self.fingerprints_db.get(wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => decode_account_id(bytes)? == *holder,
            None => false,
        };
        if owned {
            self.fingerprints_db
                .delete(wtxn, key)
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    /// Read-modify-write one account in its own transaction.
    fn update<T>(
        &self,
        id: &AccountId,
        f: impl FnOnce(&mut AccountRecord) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut record = read_account(&self.accounts_db, &wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let out = f(&mut record)?;
        self.write_account(&mut wtxn, &record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(out)
    }
}

impl AccountStore for LmdbAccountStore {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        read_account(&self.accounts_db, &rtxn, id)?.ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.write_account(&mut wtxn, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn find_by_fingerprint(
        &self,
        fingerprint: &IdentityFingerprint,
        exclude: &AccountId,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let holder = match self
            .fingerprints_db
            .get(&rtxn, fingerprint.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_account_id(bytes)?,
            None => return Ok(None),
        };
        if holder == *exclude {
            return Ok(None);
        }
        let record = read_account(&self.accounts_db, &rtxn, &holder)?;
        Ok(record.filter(|r| r.is_verified() && r.fingerprint.as_ref() == Some(fingerprint)))
    }

    fn commit_verification(
        &self,
        id: &AccountId,
        fingerprint: &IdentityFingerprint,
        fields: &VerifiedFields,
        verified_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let mut record = read_account(&self.accounts_db, &wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let key = fingerprint.as_str().as_bytes();
        let holder = match self.fingerprints_db.get(&wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => Some(decode_account_id(bytes)?),
            None => None,
        };
        if let Some(holder) = holder.filter(|h| h != id) {
            // Dropping the transaction aborts it.
            return Err(StoreError::FingerprintConflict {
                fingerprint: fingerprint.clone(),
                holder,
            });
        }

        if let Some(previous) = record.fingerprint.clone().filter(|p| p != fingerprint) {
            self.release_fingerprint(&mut wtxn, &previous, id)?;
        }

        record.apply_verification(fingerprint.clone(), fields, verified_at);
        self.write_account(&mut wtxn, &record)?;
        self.fingerprints_db
            .put(&mut wtxn, key, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(account = %id, fingerprint = fingerprint.short(), "verification committed");
        Ok(())
    }

    fn increment_rejection(
        &self,
        id: &AccountId,
        suspend_threshold: u32,
    ) -> Result<RejectionCommit, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut record = read_account(&self.accounts_db, &wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if let Some(previous) = record.fingerprint.clone() {
            self.release_fingerprint(&mut wtxn, &previous, id)?;
        }
        let commit = record.apply_rejection(suspend_threshold);
        self.write_account(&mut wtxn, &record)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(commit)
    }

    fn set_kyc_state(&self, id: &AccountId, state: KycState) -> Result<(), StoreError> {
        if state == KycState::Verified {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                state,
            });
        }
        self.update(id, |record| {
            record.kyc_state = state;
            Ok(())
        })
    }

    fn add_points(&self, id: &AccountId, points: u64) -> Result<u64, StoreError> {
        self.update(id, |record| {
            record.points = record.points.saturating_add(points);
            Ok(record.points)
        })
    }
}
