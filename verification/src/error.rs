use kycgate_store::StoreError;
use kycgate_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("account {0} does not exist")]
    AccountNotFound(AccountId),

    /// Storage failed; nothing was committed and the caller may retry.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl VerificationError {
    /// Route store errors, keeping unknown accounts distinct from backend failures.
    pub(crate) fn from_store(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => VerificationError::AccountNotFound(id),
            other => VerificationError::Persistence(other),
        }
    }
}
