//! LMDB implementation of SessionStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use kycgate_store::{SessionStore, StoreError};
use kycgate_types::{AccountId, VerificationSession};

use crate::codec::{decode, encode};
use crate::LmdbError;

pub struct LmdbSessionStore {
    pub(crate) env: Arc<Env>,
    pub(crate) sessions_db: Database<Bytes, Bytes>,
}

impl SessionStore for LmdbSessionStore {
    fn put_session(&self, session: &VerificationSession) -> Result<(), StoreError> {
        let bytes = encode(session)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.sessions_db
            .put(&mut wtxn, session.owner_account_id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn latest_session(&self, owner: &AccountId) -> Result<Option<VerificationSession>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .sessions_db
            .get(&rtxn, owner.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use kycgate_types::{SessionReference, Timestamp};

    #[test]
    fn latest_session_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let store = env.session_store();
        let owner = AccountId::new("user-7").unwrap();

        assert!(store.latest_session(&owner).unwrap().is_none());

        for millis in [1_000u64, 2_000] {
            let reference = SessionReference::generate("kyc", &owner, millis).unwrap();
            store
                .put_session(&VerificationSession {
                    reference,
                    owner_account_id: owner.clone(),
                    created_at: Timestamp::from_millis(millis),
                })
                .unwrap();
        }

        let latest = store.latest_session(&owner).unwrap().unwrap();
        assert_eq!(latest.reference.issued_at_millis(), 2_000);
        assert_eq!(latest.reference.owner(), &owner);
    }
}
