//! Key and value encoding shared by the LMDB stores.

use heed::types::Bytes;
use heed::{Database, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use kycgate_store::{AccountRecord, StoreError};
use kycgate_types::AccountId;

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Account ids are stored as their raw UTF-8 text in index values.
pub(crate) fn decode_account_id(bytes: &[u8]) -> Result<AccountId, StoreError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| AccountId::new(s).ok())
        .ok_or_else(|| StoreError::Corruption("invalid account id in fingerprint index".into()))
}

pub(crate) fn read_account(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    id: &AccountId,
) -> Result<Option<AccountRecord>, StoreError> {
    match db.get(txn, id.as_str().as_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(decode(bytes)?)),
        None => Ok(None),
    }
}
