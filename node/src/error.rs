use kycgate_types::{AccountId, SessionReference};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("unknown session reference: {0}")]
    UnknownReference(SessionReference),

    #[error("account {0} is suspended")]
    AccountSuspended(AccountId),

    #[error("account {0} is already verified")]
    AlreadyVerified(AccountId),

    #[error("webhook signature rejected")]
    Unauthorized,

    #[error("malformed webhook: {0}")]
    MalformedWebhook(String),

    #[error("identity behind {reference} is already verified on another account")]
    DuplicateIdentity {
        reference: SessionReference,
        remaining_attempts: u32,
    },

    #[error("provider error: {0}")]
    Provider(#[from] kycgate_provider::ProviderError),

    #[error("verification error: {0}")]
    Verification(#[from] kycgate_verification::VerificationError),

    #[error("store error: {0}")]
    Store(#[from] kycgate_store::StoreError),

    #[error("storage backend error: {0}")]
    Lmdb(#[from] kycgate_store_lmdb::LmdbError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC server error: {0}")]
    Rpc(String),

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
