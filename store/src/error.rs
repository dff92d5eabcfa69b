use kycgate_types::{AccountId, IdentityFingerprint, KycState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    NotFound(AccountId),

    #[error("fingerprint {} already held by {holder}", fingerprint.short())]
    FingerprintConflict {
        fingerprint: IdentityFingerprint,
        holder: AccountId,
    },

    /// Verified is only reachable through `commit_verification`.
    #[error("account {id} cannot be set to {state} directly")]
    InvalidTransition { id: AccountId, state: KycState },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Backend(_))
    }
}
